//! Folding file scores into a project profile and a strategy recommendation.

use crate::config::Config;
use crate::types::{
  CheckCategory, Distribution, FileRiskScore, ProjectRiskProfile, Recommendation, RiskLevel, Strategy,
};

/// Fold scores into a profile. An empty slice yields a zeroed FAST profile.
pub fn aggregate(scores: &[FileRiskScore], config: &Config) -> ProjectRiskProfile {
  let mut distribution = Distribution::default();
  for s in scores {
    distribution.record(s.risk_level);
  }

  let average_score = if scores.is_empty() {
    0.0
  } else {
    let sum: u32 = scores.iter().map(|s| u32::from(s.total_score)).sum();
    round2(f64::from(sum) / scores.len() as f64)
  };

  let strategy = select_strategy(&distribution, average_score);

  ProjectRiskProfile {
    total_files: scores.len(),
    average_score,
    distribution,
    recommendation: recommend(strategy),
    hotspots: compute_hotspots(scores, config.hotspot_count),
  }
}

/// Any CRITICAL → STRICT; >2 HIGH or mean > 6 → ENHANCED; mean > 3 → STANDARD.
pub fn select_strategy(distribution: &Distribution, average_score: f64) -> Strategy {
  if distribution.count(RiskLevel::Critical) > 0 {
    Strategy::Strict
  } else if distribution.count(RiskLevel::High) > 2 || average_score > 6.0 {
    Strategy::Enhanced
  } else if average_score > 3.0 {
    Strategy::Standard
  } else {
    Strategy::Fast
  }
}

/// Timeout and skip list recommended for a strategy.
pub fn recommend(strategy: Strategy) -> Recommendation {
  let (timeout_seconds, skip_categories) = match strategy {
    Strategy::Fast => (60, vec![CheckCategory::Test]),
    Strategy::Standard => (120, Vec::new()),
    Strategy::Enhanced => (180, Vec::new()),
    Strategy::Strict => (300, Vec::new()),
  };
  Recommendation {
    strategy,
    timeout_seconds,
    skip_categories,
  }
}

/// Top N files by score; ties keep input order.
pub fn compute_hotspots(scores: &[FileRiskScore], n: usize) -> Vec<String> {
  let mut ranked: Vec<&FileRiskScore> = scores.iter().filter(|s| s.total_score > 0).collect();
  ranked.sort_by(|a, b| b.total_score.cmp(&a.total_score));
  ranked.into_iter().take(n).map(|s| s.file_path.clone()).collect()
}

fn round2(v: f64) -> f64 {
  (v * 100.0).round() / 100.0
}

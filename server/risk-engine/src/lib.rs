//! Validation Gate Risk Engine: rule-based per-file risk scoring.
//!
//! Each changed file is scored on four independent factors (file type,
//! directory, on-disk size, diff volume) summing to 0–12. Scores fold into a
//! project profile that recommends a validation strategy. Scoring never
//! fails; unknown inputs degrade to neutral weights.

mod config;
mod profile;
mod score;
mod types;
mod weights;

use std::collections::HashMap;
use std::path::PathBuf;

pub use config::Config;
pub use profile::{recommend, select_strategy};
pub use types::{
  CheckCategory, Distribution, FileRiskScore, Input, Output, ProjectRiskProfile, Recommendation,
  RiskLevel, ScoreBreakdown, Strategy,
};

/// Scores files relative to a repository root.
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
  config: Config,
}

impl RiskScorer {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn score_file(&self, path: &str, diff_text: Option<&str>) -> FileRiskScore {
    score::score_file(path, diff_text, &self.config)
  }

  pub fn score_batch(&self, paths: &[String], diff_by_path: &HashMap<String, String>) -> Vec<FileRiskScore> {
    score::score_batch(paths, diff_by_path, &self.config)
  }

  pub fn aggregate(&self, scores: &[FileRiskScore]) -> ProjectRiskProfile {
    profile::aggregate(scores, &self.config)
  }
}

/// Run the engine on parsed input and return the output (no I/O besides stat).
pub fn run(input: &Input) -> Output {
  let config = match &input.root {
    Some(root) => Config::with_root(PathBuf::from(root)),
    None => Config::default(),
  };
  let scorer = RiskScorer::new(config);
  let scores = scorer.score_batch(&input.files_changed, &input.diffs);
  let profile = scorer.aggregate(&scores);
  Output { scores, profile }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn run_returns_valid_output_shape() {
    let mut diffs = HashMap::new();
    diffs.insert("src/auth/jwt.ts".to_string(), "+a\n+b\n-c\n".to_string());
    let input = Input {
      root: Some("/nonexistent".to_string()),
      files_changed: vec!["src/auth/jwt.ts".to_string(), "package-lock.json".to_string()],
      diffs,
    };
    let out = run(&input);
    assert_eq!(out.scores.len(), 2);
    assert_eq!(out.profile.total_files, 2);
    assert!(out.scores.iter().all(|s| s.total_score <= 12));
    assert!(out.profile.hotspots.len() <= 5);
  }

  #[test]
  fn risk_level_is_monotonic_in_score() {
    let mut prev = RiskLevel::from_score(0);
    for total in 0..=12u8 {
      let level = RiskLevel::from_score(total);
      assert!(level >= prev, "level dropped at {}", total);
      prev = level;
    }
    assert_eq!(RiskLevel::from_score(1), RiskLevel::Minimal);
    assert_eq!(RiskLevel::from_score(2), RiskLevel::Low);
    assert_eq!(RiskLevel::from_score(4), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_score(7), RiskLevel::High);
    assert_eq!(RiskLevel::from_score(10), RiskLevel::Critical);
  }
}

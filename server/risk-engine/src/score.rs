//! Per-file risk scores and their human-readable reasons.

use std::collections::HashMap;

use crate::config::Config;
use crate::types::{FileRiskScore, RiskLevel, ScoreBreakdown};
use crate::weights;

/// Score one file. Never fails: unreadable metadata or a missing diff
/// degrade to a zero contribution for that factor.
pub fn score_file(path: &str, diff_text: Option<&str>, config: &Config) -> FileRiskScore {
  let changed_lines = diff_text.map(weights::count_changed_lines).unwrap_or(0);
  let breakdown = ScoreBreakdown {
    file_type: weights::file_type_weight(path),
    directory: weights::directory_weight(path),
    file_size: weights::file_size_weight(path, config),
    change_volume: weights::change_volume_weight(changed_lines, config),
  };
  let total_score = breakdown.total();

  FileRiskScore {
    file_path: path.to_string(),
    total_score,
    breakdown,
    risk_level: RiskLevel::from_score(total_score),
    reasons: compute_reasons(&breakdown, changed_lines),
  }
}

/// Score every path, in input order.
pub fn score_batch(
  paths: &[String],
  diff_by_path: &HashMap<String, String>,
  config: &Config,
) -> Vec<FileRiskScore> {
  paths
    .iter()
    .map(|p| score_file(p, diff_by_path.get(p).map(String::as_str), config))
    .collect()
}

/// Short reasons for every factor that scored above zero.
pub fn compute_reasons(breakdown: &ScoreBreakdown, changed_lines: usize) -> Vec<String> {
  let mut out = Vec::new();
  match breakdown.file_type {
    3 => out.push("High-impact file type (source, manifest or config)".to_string()),
    2 => out.push("Script or configuration file type".to_string()),
    _ => {}
  }
  match breakdown.directory {
    3 => out.push("Core application directory".to_string()),
    2 => out.push("Shared source directory".to_string()),
    _ => {}
  }
  if breakdown.file_size > 0 {
    out.push("Large file".to_string());
  }
  if breakdown.change_volume > 0 {
    out.push(format!("{} lines changed", changed_lines));
  }
  out
}

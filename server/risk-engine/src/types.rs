//! Scoring types (JSON contract with the validation gate and the binary).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Binary contract
// ---------------------------------------------------------------------------

/// Input: one JSON object on stdin.
#[derive(Debug, Deserialize)]
pub struct Input {
  /// Repository root used for size lookups. Defaults to the current directory.
  #[serde(default)]
  pub root: Option<String>,
  pub files_changed: Vec<String>,
  /// Unified diff text keyed by file path.
  #[serde(default)]
  pub diffs: HashMap<String, String>,
}

/// Output: one JSON object on stdout.
#[derive(Debug, Serialize)]
pub struct Output {
  pub scores: Vec<FileRiskScore>,
  pub profile: ProjectRiskProfile,
}

// ---------------------------------------------------------------------------
// Per-file score
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
  Minimal,
  Low,
  Medium,
  High,
  Critical,
}

impl RiskLevel {
  /// Step function over the 0–12 total score.
  pub fn from_score(total: u8) -> Self {
    match total {
      10.. => Self::Critical,
      7..=9 => Self::High,
      4..=6 => Self::Medium,
      2..=3 => Self::Low,
      _ => Self::Minimal,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Minimal => "MINIMAL",
      Self::Low => "LOW",
      Self::Medium => "MEDIUM",
      Self::High => "HIGH",
      Self::Critical => "CRITICAL",
    }
  }
}

impl fmt::Display for RiskLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The four independently bounded sub-scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
  /// 0–3
  pub file_type: u8,
  /// 0–3
  pub directory: u8,
  /// 0–2
  pub file_size: u8,
  /// 0–4
  pub change_volume: u8,
}

impl ScoreBreakdown {
  pub fn total(&self) -> u8 {
    self.file_type + self.directory + self.file_size + self.change_volume
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRiskScore {
  pub file_path: String,
  pub total_score: u8,
  pub breakdown: ScoreBreakdown,
  pub risk_level: RiskLevel,
  /// Why each non-zero factor scored what it did.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub reasons: Vec<String>,
}

// ---------------------------------------------------------------------------
// Strategy vocabulary (shared with the gate)
// ---------------------------------------------------------------------------

/// Validation strategies, ordered from least to most thorough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Strategy {
  Fast,
  Standard,
  Enhanced,
  Strict,
}

impl Strategy {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Fast => "FAST",
      Self::Standard => "STANDARD",
      Self::Enhanced => "ENHANCED",
      Self::Strict => "STRICT",
    }
  }
}

impl fmt::Display for Strategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Check categories a strategy may skip. Declared lightest to heaviest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckCategory {
  Format,
  SecretScan,
  Lint,
  TypeCheck,
  Test,
}

impl CheckCategory {
  pub const ALL: [CheckCategory; 5] = [
    Self::Format,
    Self::SecretScan,
    Self::Lint,
    Self::TypeCheck,
    Self::Test,
  ];

  /// The most expensive category to run.
  pub fn heaviest() -> Self {
    Self::Test
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Format => "format",
      Self::SecretScan => "secret_scan",
      Self::Lint => "lint",
      Self::TypeCheck => "type_check",
      Self::Test => "test",
    }
  }
}

impl fmt::Display for CheckCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ---------------------------------------------------------------------------
// Project profile
// ---------------------------------------------------------------------------

/// File count per risk level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Distribution {
  pub minimal: usize,
  pub low: usize,
  pub medium: usize,
  pub high: usize,
  pub critical: usize,
}

impl Distribution {
  pub fn record(&mut self, level: RiskLevel) {
    *self.slot(level) += 1;
  }

  pub fn count(&self, level: RiskLevel) -> usize {
    match level {
      RiskLevel::Minimal => self.minimal,
      RiskLevel::Low => self.low,
      RiskLevel::Medium => self.medium,
      RiskLevel::High => self.high,
      RiskLevel::Critical => self.critical,
    }
  }

  fn slot(&mut self, level: RiskLevel) -> &mut usize {
    match level {
      RiskLevel::Minimal => &mut self.minimal,
      RiskLevel::Low => &mut self.low,
      RiskLevel::Medium => &mut self.medium,
      RiskLevel::High => &mut self.high,
      RiskLevel::Critical => &mut self.critical,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
  pub strategy: Strategy,
  pub timeout_seconds: u64,
  pub skip_categories: Vec<CheckCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRiskProfile {
  pub total_files: usize,
  /// Mean total score, rounded to two decimals.
  pub average_score: f64,
  pub distribution: Distribution,
  pub recommendation: Recommendation,
  /// Highest-scoring files, most risky first.
  pub hotspots: Vec<String>,
}

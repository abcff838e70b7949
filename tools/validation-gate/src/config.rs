//! Gate configuration with sane defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use risk_engine::CheckCategory;

/// How one check category becomes a task.
#[derive(Debug, Clone)]
pub struct CheckSettings {
  /// Shell command; `{files}` is replaced by the quoted file slice.
  pub command: String,
  /// Share of the merged global timeout given to this task.
  pub timeout_fraction: f64,
  pub critical: bool,
  /// Maximum files passed to one invocation. Ignored by commands without `{files}`.
  pub file_limit: usize,
}

impl CheckSettings {
  fn new(command: &str, timeout_fraction: f64, critical: bool, file_limit: usize) -> Self {
    Self {
      command: command.to_string(),
      timeout_fraction,
      critical,
      file_limit,
    }
  }
}

#[derive(Debug, Clone)]
pub struct GateConfig {
  /// Repository root; commands run here and file paths are relative to it.
  pub root: PathBuf,
  pub format: CheckSettings,
  pub secret_scan: CheckSettings,
  pub lint: CheckSettings,
  pub type_check: CheckSettings,
  pub test: CheckSettings,
  /// Used when impact analysis asks for the whole suite.
  pub full_test_command: String,
  /// Report directory, relative to `root`.
  pub reports_dir: PathBuf,
  /// Critical-file count above which checks are serialized.
  pub serialize_threshold: usize,
  /// Critical-file count above which the heaviest category is dropped.
  pub overload_threshold: usize,
  /// Hard cap on the global timeout once overloaded.
  pub overload_timeout_cap: Duration,
  /// Floor for a single task's carved timeout.
  pub min_task_timeout: Duration,
  /// Hard-coded sequence run when the pipeline itself breaks.
  pub fallback_commands: Vec<(String, String)>,
  /// Per-command timeout in the fallback sequence.
  pub fallback_timeout: Duration,
}

impl Default for GateConfig {
  fn default() -> Self {
    Self {
      root: PathBuf::from("."),
      format: CheckSettings::new("npx prettier --check {files}", 0.25, false, 50),
      secret_scan: CheckSettings::new("npx secretlint {files}", 0.25, true, 50),
      lint: CheckSettings::new("npx eslint --max-warnings=0 {files}", 0.5, true, 20),
      type_check: CheckSettings::new("npx tsc --noEmit", 0.75, true, 0),
      test: CheckSettings::new("npx vitest run {files}", 0.9, true, 10),
      full_test_command: "npm test".to_string(),
      reports_dir: PathBuf::from("reports/validation"),
      serialize_threshold: 3,
      overload_threshold: 4,
      overload_timeout_cap: Duration::from_secs(180),
      min_task_timeout: Duration::from_secs(5),
      fallback_commands: vec![
        ("lint".to_string(), "npm run lint".to_string()),
        ("type_check".to_string(), "npx tsc --noEmit".to_string()),
      ],
      fallback_timeout: Duration::from_secs(120),
    }
  }
}

impl GateConfig {
  pub fn with_root(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      ..Self::default()
    }
  }

  pub fn check(&self, category: CheckCategory) -> &CheckSettings {
    match category {
      CheckCategory::Format => &self.format,
      CheckCategory::SecretScan => &self.secret_scan,
      CheckCategory::Lint => &self.lint,
      CheckCategory::TypeCheck => &self.type_check,
      CheckCategory::Test => &self.test,
    }
  }

  pub fn reports_path(&self) -> PathBuf {
    self.root.join(&self.reports_dir)
  }

  pub fn resolve(&self, rel: impl AsRef<Path>) -> PathBuf {
    self.root.join(rel)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_format_is_non_critical() {
    let config = GateConfig::default();
    for category in CheckCategory::ALL {
      let expected = category != CheckCategory::Format;
      assert_eq!(config.check(category).critical, expected, "{}", category);
    }
  }

  #[test]
  fn timeout_fractions_fit_inside_global_budget() {
    let config = GateConfig::default();
    for category in CheckCategory::ALL {
      let f = config.check(category).timeout_fraction;
      assert!(f > 0.0 && f <= 1.0, "{} fraction {}", category, f);
    }
  }
}

//! Analyzer configuration with sane defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Tunables for resolution, traversal, caching and recommendations.
#[derive(Debug, Clone)]
pub struct Config {
  /// Repository root; all file paths are relative to it.
  pub root: PathBuf,
  /// Maximum traversal depth below a changed file.
  pub max_depth: usize,
  /// How long a file's direct edges stay valid in the cache.
  pub cache_ttl: Duration,
  /// Import prefix rewrites, applied in order (e.g. `@/` → `src/`).
  pub aliases: Vec<(String, String)>,
  /// Extensions probed, in order, when a specifier has none.
  pub extensions: Vec<String>,
  /// Index file stem probed inside a directory specifier.
  pub index_name: String,
  /// Affected-file count above which a full test run is recommended.
  pub full_tests_threshold: usize,
  /// Affected-file count above which related tests are recommended.
  pub related_tests_threshold: usize,
  /// External package count above which an enhanced type check is recommended.
  pub external_packages_threshold: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      root: PathBuf::from("."),
      max_depth: 10,
      cache_ttl: Duration::from_secs(5 * 60),
      aliases: vec![
        ("@/".to_string(), "src/".to_string()),
        ("~/".to_string(), "src/".to_string()),
      ],
      extensions: [".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs", ".json"]
        .iter()
        .map(|s| s.to_string())
        .collect(),
      index_name: "index".to_string(),
      full_tests_threshold: 50,
      related_tests_threshold: 20,
      external_packages_threshold: 10,
    }
  }
}

impl Config {
  pub fn with_root(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      ..Self::default()
    }
  }
}

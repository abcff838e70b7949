//! Scorer configuration with sane defaults.

use std::path::PathBuf;

/// Tunable bands for the size and change-volume factors.
#[derive(Debug, Clone)]
pub struct Config {
  /// Repository root; changed paths are resolved against it for size lookups.
  pub root: PathBuf,
  /// Files at or above this many bytes score 1 for size.
  pub size_medium_bytes: u64,
  /// Files at or above this many bytes score 2 for size.
  pub size_large_bytes: u64,
  /// Upper bounds (inclusive) of changed-line bands scoring 1, 2 and 3.
  /// Anything above the last bound scores 4; zero changed lines score 0.
  pub volume_bands: [usize; 3],
  /// How many files the profile lists as hotspots.
  pub hotspot_count: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      root: PathBuf::from("."),
      size_medium_bytes: 10 * 1024,
      size_large_bytes: 50 * 1024,
      volume_bands: [10, 50, 200],
      hotspot_count: 5,
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

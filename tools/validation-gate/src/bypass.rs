//! Persisted "always skip" marker.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::GateError;

const MARKER_FILE: &str = "always-skip.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BypassMarker {
  pub enabled_at: DateTime<Utc>,
  pub branch: String,
}

/// Marker file living next to the run reports.
#[derive(Debug, Clone)]
pub struct BypassStore {
  path: PathBuf,
}

impl BypassStore {
  pub fn new(reports_dir: impl AsRef<Path>) -> Self {
    Self {
      path: reports_dir.as_ref().join(MARKER_FILE),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// The active marker, if any. An unreadable marker still counts as set.
  pub fn active(&self) -> Option<BypassMarker> {
    let raw = fs::read_to_string(&self.path).ok()?;
    Some(serde_json::from_str(&raw).unwrap_or(BypassMarker {
      enabled_at: DateTime::<Utc>::default(),
      branch: String::new(),
    }))
  }

  pub fn enable(&self, branch: &str) -> Result<BypassMarker, GateError> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent)?;
    }
    let marker = BypassMarker {
      enabled_at: Utc::now(),
      branch: branch.to_string(),
    };
    fs::write(&self.path, serde_json::to_vec_pretty(&marker)?)?;
    info!(path = %self.path.display(), "validation permanently skipped");
    Ok(marker)
  }

  /// Remove the marker. Returns whether one existed.
  pub fn disable(&self) -> Result<bool, GateError> {
    match fs::remove_file(&self.path) {
      Ok(()) => Ok(true),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
      Err(e) => Err(e.into()),
    }
  }
}

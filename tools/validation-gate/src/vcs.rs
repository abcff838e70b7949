//! Change sets and the git collaborator that supplies them.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

use crate::error::GateError;

/// Everything the gate needs to know about a pending change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
  #[serde(default)]
  pub branch: String,
  pub changed_files: Vec<String>,
  /// Unified diff text keyed by file path.
  #[serde(default)]
  pub diffs: HashMap<String, String>,
  #[serde(default)]
  pub has_uncommitted_changes: bool,
}

/// Reads the staged change set from a git working tree.
#[derive(Debug, Clone)]
pub struct GitCollector {
  root: PathBuf,
}

impl GitCollector {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub async fn collect(&self) -> Result<ChangeSet, GateError> {
    let branch = self.git(&["rev-parse", "--abbrev-ref", "HEAD"]).await?.trim().to_string();
    let changed_files: Vec<String> = self
      .git(&["diff", "--cached", "--name-only", "--diff-filter=ACMR"])
      .await?
      .lines()
      .map(str::trim)
      .filter(|l| !l.is_empty())
      .map(str::to_string)
      .collect();

    let mut diffs = HashMap::with_capacity(changed_files.len());
    for file in &changed_files {
      let diff = self.git(&["diff", "--cached", "--", file]).await?;
      diffs.insert(file.clone(), diff);
    }
    let status = self.git(&["status", "--porcelain"]).await?;

    debug!(branch = %branch, files = changed_files.len(), "collected staged changes");
    Ok(ChangeSet {
      branch,
      changed_files,
      diffs,
      has_uncommitted_changes: !status.trim().is_empty(),
    })
  }

  async fn git(&self, args: &[&str]) -> Result<String, GateError> {
    let command = args.join(" ");
    let output = Command::new("git")
      .args(args)
      .current_dir(&self.root)
      .output()
      .await
      .map_err(|e| GateError::vcs(&command, e.to_string()))?;
    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(GateError::vcs(&command, stderr.trim()));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
  }
}

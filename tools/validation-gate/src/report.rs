//! JSON run reports under the reports directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use risk_engine::Strategy;
use serde::Serialize;
use task_engine::RunSummary;
use tracing::debug;
use uuid::Uuid;

use crate::decision::{Decision, FailureCategory, Outcome, RunStats};
use crate::error::GateError;

pub const LATEST_FILE: &str = "latest.json";

#[derive(Debug, Serialize)]
pub struct TaskLine<'a> {
  pub name: &'a str,
  pub success: bool,
  pub critical: bool,
  pub timed_out: bool,
  pub duration_ms: u64,
  pub chunk_index: usize,
}

#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
  pub run_id: Uuid,
  pub generated_at: DateTime<Utc>,
  pub branch: &'a str,
  pub outcome: Outcome,
  pub success: bool,
  pub strategy: Option<Strategy>,
  pub failure_category: Option<FailureCategory>,
  pub tasks: Vec<TaskLine<'a>>,
  pub summary: Option<&'a RunSummary>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub global_error: Option<&'a str>,
  pub stats: &'a RunStats,
  pub remediation: &'a [String],
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<&'a str>,
}

impl<'a> RunReport<'a> {
  pub fn new(branch: &'a str, decision: &'a Decision) -> Self {
    let run = decision.validation_result.as_ref();
    let tasks: Vec<TaskLine<'a>> = run
      .map(|r| {
        r.results
          .iter()
          .map(|t| TaskLine {
            name: &t.task_name,
            success: t.success,
            critical: t.critical,
            timed_out: t.timed_out,
            duration_ms: t.duration_ms,
            chunk_index: t.chunk_index,
          })
          .collect()
      })
      .unwrap_or_default();

    Self {
      run_id: Uuid::new_v4(),
      generated_at: Utc::now(),
      branch,
      outcome: decision.outcome,
      success: decision.success,
      strategy: decision.strategy.as_ref().map(|s| s.strategy),
      failure_category: decision.failure_category,
      tasks,
      summary: run.map(|r| &r.summary),
      global_error: run.and_then(|r| r.global_error.as_deref()),
      stats: &decision.stats,
      remediation: &decision.remediation,
      error: decision.error.as_deref(),
    }
  }

  fn file_name(&self) -> String {
    let id = self.run_id.simple().to_string();
    format!(
      "validation-{}-{}.json",
      self.generated_at.format("%Y%m%dT%H%M%SZ"),
      &id[..8]
    )
  }
}

/// Write a timestamped report and refresh `latest.json`. Returns the timestamped path.
pub fn write_report(dir: &Path, report: &RunReport<'_>) -> Result<PathBuf, GateError> {
  fs::create_dir_all(dir)?;
  let json = serde_json::to_vec_pretty(report)?;
  let path = dir.join(report.file_name());
  fs::write(&path, &json)?;
  fs::write(dir.join(LATEST_FILE), &json)?;
  debug!(path = %path.display(), "run report written");
  Ok(path)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn report_for_skipped_run() {
    let dir = tempfile::tempdir().unwrap();
    let decision = Decision::skipped();
    let report = RunReport::new("main", &decision);
    let path = write_report(dir.path(), &report).unwrap();

    assert!(path.file_name().unwrap().to_str().unwrap().starts_with("validation-"));
    let latest: serde_json::Value =
      serde_json::from_slice(&fs::read(dir.path().join(LATEST_FILE)).unwrap()).unwrap();
    assert_eq!(latest["outcome"], "skipped");
    assert_eq!(latest["branch"], "main");
    assert_eq!(latest["run_id"], report.run_id.to_string());
    assert!(latest["tasks"].as_array().unwrap().is_empty());
  }
}

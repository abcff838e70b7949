//! Task, result and summary types.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// In-process work. `Ok` carries output text, `Err` a failure message.
pub type InlineFn = Arc<dyn Fn() -> BoxFuture<'static, Result<String, String>> + Send + Sync>;

#[derive(Clone)]
pub enum TaskAction {
  /// Opaque command string handed to the executor.
  Command(String),
  Inline(InlineFn),
}

impl fmt::Debug for TaskAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Command(cmd) => f.debug_tuple("Command").field(cmd).finish(),
      Self::Inline(_) => f.write_str("Inline(..)"),
    }
  }
}

#[derive(Debug, Clone)]
pub struct ValidationTask {
  pub name: String,
  pub action: TaskAction,
  pub timeout: Duration,
  /// Critical failures block the run; others only warn.
  pub critical: bool,
}

impl ValidationTask {
  pub fn command(name: impl Into<String>, command: impl Into<String>, timeout: Duration) -> Self {
    Self {
      name: name.into(),
      action: TaskAction::Command(command.into()),
      timeout,
      critical: true,
    }
  }

  pub fn inline<F, Fut>(name: impl Into<String>, timeout: Duration, f: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String, String>> + Send + 'static,
  {
    let f: InlineFn = Arc::new(move || f().boxed());
    Self {
      name: name.into(),
      action: TaskAction::Inline(f),
      timeout,
      critical: true,
    }
  }

  pub fn with_critical(mut self, critical: bool) -> Self {
    self.critical = critical;
    self
  }

  pub fn command_text(&self) -> Option<&str> {
    match &self.action {
      TaskAction::Command(cmd) => Some(cmd),
      TaskAction::Inline(_) => None,
    }
  }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RunOptions {
  /// Chunk size: how many tasks run at once.
  pub max_concurrency: usize,
  /// Deadline for the whole run, measured from its start.
  pub global_timeout: Duration,
  /// Stop after the first chunk containing a critical failure.
  pub fail_fast: bool,
  /// Log a per-task marker at info level as each chunk completes.
  pub verbose: bool,
  /// Working directory for command tasks.
  pub working_dir: PathBuf,
}

impl Default for RunOptions {
  fn default() -> Self {
    Self {
      max_concurrency: 3,
      global_timeout: Duration::from_secs(120),
      fail_fast: false,
      verbose: false,
      working_dir: PathBuf::from("."),
    }
  }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskResult {
  pub task_name: String,
  pub success: bool,
  pub critical: bool,
  pub duration_ms: u64,
  /// Offset from the start of the run.
  pub started_at_ms: u64,
  pub chunk_index: usize,
  #[serde(skip_serializing_if = "String::is_empty")]
  pub stdout: String,
  #[serde(skip_serializing_if = "String::is_empty")]
  pub stderr: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error_message: Option<String>,
  pub timed_out: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub exit_code: Option<i32>,
}

impl TaskResult {
  pub fn finished_at_ms(&self) -> u64 {
    self.started_at_ms + self.duration_ms
  }

  /// One-line failure description.
  pub fn failure_line(&self) -> String {
    let reason = self.error_message.as_deref().unwrap_or("failed");
    format!("{}: {}", self.task_name, reason)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskTiming {
  pub task_name: String,
  pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
  pub total_tasks: usize,
  pub success_count: usize,
  pub failure_count: usize,
  /// No critical task failed.
  pub can_proceed: bool,
  /// Non-critical failures.
  pub warnings: Vec<String>,
  /// Critical failures.
  pub errors: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fastest: Option<TaskTiming>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub slowest: Option<TaskTiming>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutcome {
  /// Run completed and no critical task failed.
  pub success: bool,
  /// Settled results, in input order.
  pub results: Vec<TaskResult>,
  pub summary: RunSummary,
  /// Set when the global deadline or fail-fast stopped the run early.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub global_error: Option<String>,
  pub tasks_submitted: usize,
  pub chunks_run: usize,
  pub duration_ms: u64,
}

impl RunOutcome {
  /// Stopped before every task settled.
  pub fn is_incomplete(&self) -> bool {
    self.global_error.is_some()
  }

  pub fn critical_failures(&self) -> impl Iterator<Item = &TaskResult> {
    self.results.iter().filter(|r| r.critical && !r.success)
  }
}

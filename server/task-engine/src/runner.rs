//! Chunked execution with per-task and global deadlines.

use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ExecError;
use crate::executor::{CommandExecutor, CommandOutput, ShellExecutor};
use crate::summary;
use crate::types::*;

/// Runs validation tasks through a command executor.
#[derive(Clone)]
pub struct TaskRunner {
  executor: Arc<dyn CommandExecutor>,
}

impl TaskRunner {
  pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
    Self { executor }
  }

  pub fn shell() -> Self {
    Self::new(Arc::new(ShellExecutor))
  }

  /// Run `tasks` in input-order chunks of `max_concurrency`.
  ///
  /// Chunk N+1 starts only after every task of chunk N has settled. A task
  /// failing or timing out never aborts the run; the global deadline and
  /// fail-fast do, keeping whatever had already settled. Fail-fast only
  /// counts as an abort when chunks were left unrun.
  pub async fn run(&self, tasks: &[ValidationTask], options: &RunOptions) -> RunOutcome {
    let run_started = Instant::now();
    let deadline = run_started + options.global_timeout;
    let chunk_size = options.max_concurrency.max(1);
    let total_chunks = tasks.len().div_ceil(chunk_size);

    let mut results: Vec<TaskResult> = Vec::with_capacity(tasks.len());
    let mut global_error = None;
    let mut chunks_run = 0;

    for (chunk_index, chunk) in tasks.chunks(chunk_size).enumerate() {
      chunks_run += 1;
      debug!(chunk = chunk_index, size = chunk.len(), "starting chunk");

      let mut settled: Vec<Option<TaskResult>> = (0..chunk.len()).map(|_| None).collect();
      let mut pending: FuturesUnordered<_> = chunk
        .iter()
        .enumerate()
        .map(|(i, task)| {
          let fut = self.run_task(task, chunk_index, run_started, &options.working_dir);
          async move { (i, fut.await) }
        })
        .collect();

      loop {
        match tokio::time::timeout_at(deadline, pending.next()).await {
          Ok(Some((i, result))) => settled[i] = Some(result),
          Ok(None) => break,
          Err(_) => {
            global_error = Some(format!(
              "global timeout of {}ms exceeded during chunk {}",
              options.global_timeout.as_millis(),
              chunk_index
            ));
            break;
          }
        }
      }
      // Abandoned tasks are dropped here, which kills their subprocesses.
      drop(pending);

      let chunk_results: Vec<TaskResult> = settled.into_iter().flatten().collect();
      for r in &chunk_results {
        report(r, options.verbose);
      }
      let first_critical_failure = chunk_results
        .iter()
        .find(|r| r.critical && !r.success)
        .map(|r| r.task_name.clone());
      results.extend(chunk_results);

      if global_error.is_some() {
        break;
      }
      let more_chunks = chunk_index + 1 < total_chunks;
      if options.fail_fast && more_chunks {
        if let Some(name) = first_critical_failure {
          global_error = Some(format!("fail-fast: critical task `{}` failed", name));
          break;
        }
      }
    }

    if let Some(e) = &global_error {
      warn!(error = %e, settled = results.len(), submitted = tasks.len(), "run stopped early");
    }

    let summary = summary::summarize(&results);
    RunOutcome {
      success: global_error.is_none() && summary.can_proceed,
      results,
      summary,
      global_error,
      tasks_submitted: tasks.len(),
      chunks_run,
      duration_ms: millis(run_started.elapsed()),
    }
  }

  async fn run_task(
    &self,
    task: &ValidationTask,
    chunk_index: usize,
    run_started: Instant,
    cwd: &Path,
  ) -> TaskResult {
    let start = Instant::now();
    let guarded = AssertUnwindSafe(async { self.execute(task, cwd).await }).catch_unwind();
    let outcome = tokio::time::timeout(task.timeout, guarded)
      .await
      .map(|settled| settled.unwrap_or_else(|_| Err(ExecError::failed("task panicked"))));

    let mut result = TaskResult {
      task_name: task.name.clone(),
      success: false,
      critical: task.critical,
      duration_ms: millis(start.elapsed()),
      started_at_ms: millis(start.duration_since(run_started)),
      chunk_index,
      stdout: String::new(),
      stderr: String::new(),
      error_message: None,
      timed_out: false,
      exit_code: None,
    };

    match outcome {
      Ok(Ok(out)) => {
        result.success = out.exit_code == 0;
        result.exit_code = Some(out.exit_code);
        if !result.success {
          result.error_message = Some(format!("exited with code {}", out.exit_code));
        }
        result.stdout = out.stdout;
        result.stderr = out.stderr;
      }
      Ok(Err(ExecError::Failed {
        message,
        stdout,
        stderr,
        exit_code,
      })) => {
        result.error_message = Some(message);
        result.stdout = stdout;
        result.stderr = stderr;
        result.exit_code = exit_code;
      }
      Ok(Err(e)) => result.error_message = Some(e.to_string()),
      Err(_) => {
        result.timed_out = true;
        result.error_message = Some(format!("timed out after {}ms", task.timeout.as_millis()));
      }
    }
    result
  }

  async fn execute(&self, task: &ValidationTask, cwd: &Path) -> Result<CommandOutput, ExecError> {
    match &task.action {
      TaskAction::Command(cmd) => self.executor.execute(cmd, cwd).await,
      TaskAction::Inline(f) => match f().await {
        Ok(stdout) => Ok(CommandOutput {
          stdout,
          ..CommandOutput::default()
        }),
        Err(message) => Err(ExecError::failed(message)),
      },
    }
  }
}

fn report(result: &TaskResult, verbose: bool) {
  if verbose {
    info!("{}", status_line(result));
  } else {
    debug!(
      task = %result.task_name,
      success = result.success,
      timed_out = result.timed_out,
      duration_ms = result.duration_ms,
      "task settled"
    );
  }
}

/// `✓ lint (120ms)`, with `✗` for failures.
pub(crate) fn status_line(result: &TaskResult) -> String {
  let marker = if result.success { "✓" } else { "✗" };
  format!("{} {} ({}ms)", marker, result.task_name, result.duration_ms)
}

fn millis(d: std::time::Duration) -> u64 {
  u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn result(name: &str, success: bool) -> TaskResult {
    TaskResult {
      task_name: name.to_string(),
      success,
      critical: true,
      duration_ms: 42,
      started_at_ms: 0,
      chunk_index: 0,
      stdout: String::new(),
      stderr: String::new(),
      error_message: None,
      timed_out: false,
      exit_code: None,
    }
  }

  #[test]
  fn status_lines_mark_pass_and_fail() {
    assert_eq!(status_line(&result("lint", true)), "✓ lint (42ms)");
    assert_eq!(status_line(&result("types", false)), "✗ types (42ms)");
  }
}

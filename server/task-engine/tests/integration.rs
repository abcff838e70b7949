//! Integration tests for the task engine.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use task_engine::{
  CommandExecutor, CommandOutput, ExecError, RunOptions, TaskRunner, ValidationTask,
};

fn sleeper(name: &str, ms: u64, timeout_ms: u64) -> ValidationTask {
  ValidationTask::inline(name, Duration::from_millis(timeout_ms), move || async move {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Ok(format!("slept {}ms", ms))
  })
}

fn failing(name: &str) -> ValidationTask {
  ValidationTask::inline(name, Duration::from_secs(5), || async { Err("boom".to_string()) })
}

fn options(max_concurrency: usize, global_ms: u64, fail_fast: bool) -> RunOptions {
  RunOptions {
    max_concurrency,
    global_timeout: Duration::from_millis(global_ms),
    fail_fast,
    ..RunOptions::default()
  }
}

/// Answers by exit code per command, after an optional delay.
struct ScriptedExecutor {
  delay: Duration,
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
  async fn execute(&self, command: &str, _cwd: &Path) -> Result<CommandOutput, ExecError> {
    tokio::time::sleep(self.delay).await;
    match command {
      "ok" => Ok(CommandOutput {
        stdout: "fine\n".to_string(),
        ..CommandOutput::default()
      }),
      "missing" => Err(ExecError::spawn(
        command,
        std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
      )),
      _ => Ok(CommandOutput {
        stderr: "lint error\n".to_string(),
        exit_code: 2,
        ..CommandOutput::default()
      }),
    }
  }
}

#[tokio::test(start_paused = true)]
async fn five_tasks_with_concurrency_two_run_in_three_sequential_chunks() {
  let tasks: Vec<_> = (0..5).map(|i| sleeper(&format!("t{}", i), 100, 1_000)).collect();
  let outcome = TaskRunner::shell().run(&tasks, &options(2, 60_000, false)).await;

  assert!(outcome.success);
  assert_eq!(outcome.chunks_run, 3);
  let chunks: Vec<usize> = outcome.results.iter().map(|r| r.chunk_index).collect();
  assert_eq!(chunks, vec![0, 0, 1, 1, 2]);

  for i in 1..3 {
    let prev_end = outcome
      .results
      .iter()
      .filter(|r| r.chunk_index == i - 1)
      .map(|r| r.finished_at_ms())
      .max()
      .unwrap();
    for r in outcome.results.iter().filter(|r| r.chunk_index == i) {
      assert!(r.started_at_ms >= prev_end, "chunk {} started before chunk {} settled", i, i - 1);
    }
  }
}

#[tokio::test(start_paused = true)]
async fn results_keep_input_order() {
  let tasks = vec![sleeper("slow", 300, 1_000), sleeper("fast", 100, 1_000), sleeper("mid", 200, 1_000)];
  let outcome = TaskRunner::shell().run(&tasks, &options(3, 60_000, false)).await;
  let names: Vec<&str> = outcome.results.iter().map(|r| r.task_name.as_str()).collect();
  assert_eq!(names, vec!["slow", "fast", "mid"]);
  assert_eq!(outcome.summary.fastest.unwrap().task_name, "fast");
  assert_eq!(outcome.summary.slowest.unwrap().task_name, "slow");
}

#[tokio::test(start_paused = true)]
async fn task_timeout_does_not_affect_siblings() {
  let tasks = vec![sleeper("hangs", 10_000, 1_000), sleeper("quick", 50, 1_000)];
  let outcome = TaskRunner::shell().run(&tasks, &options(2, 60_000, false)).await;

  assert_eq!(outcome.results.len(), 2);
  let hung = &outcome.results[0];
  assert!(hung.timed_out);
  assert!(!hung.success);
  assert!(hung.error_message.as_deref().unwrap().contains("timed out"));
  let quick = &outcome.results[1];
  assert!(quick.success);
  assert!(!quick.timed_out);
  assert!(!outcome.summary.can_proceed);
}

#[tokio::test(start_paused = true)]
async fn non_critical_failure_only_warns() {
  let tasks = vec![
    sleeper("lint", 10, 1_000),
    sleeper("types", 10, 1_000),
    failing("format").with_critical(false),
    sleeper("test", 10, 1_000),
  ];
  let outcome = TaskRunner::shell().run(&tasks, &options(2, 60_000, false)).await;

  assert!(outcome.success);
  assert!(outcome.summary.can_proceed);
  assert_eq!(outcome.summary.warnings.len(), 1);
  assert_eq!(outcome.summary.errors.len(), 0);
  assert_eq!(outcome.summary.warnings[0], "format: boom");
}

#[tokio::test(start_paused = true)]
async fn critical_failure_blocks() {
  let tasks = vec![sleeper("lint", 10, 1_000), failing("types")];
  let outcome = TaskRunner::shell().run(&tasks, &options(2, 60_000, false)).await;
  assert!(!outcome.success);
  assert!(!outcome.summary.can_proceed);
  assert_eq!(outcome.summary.errors, vec!["types: boom"]);
  assert!(outcome.global_error.is_none());
}

#[tokio::test(start_paused = true)]
async fn global_timeout_keeps_settled_results() {
  let tasks = vec![sleeper("a", 1_000, 10_000), sleeper("b", 1_000, 10_000), sleeper("c", 1_000, 10_000)];
  let outcome = TaskRunner::shell().run(&tasks, &options(1, 2_500, false)).await;

  assert!(!outcome.success);
  assert!(outcome.is_incomplete());
  assert!(outcome.global_error.as_deref().unwrap().contains("global timeout"));
  let names: Vec<&str> = outcome.results.iter().map(|r| r.task_name.as_str()).collect();
  assert_eq!(names, vec!["a", "b"]);
  assert_eq!(outcome.tasks_submitted, 3);
  // Everything that settled passed.
  assert!(outcome.summary.can_proceed);
}

#[tokio::test(start_paused = true)]
async fn global_timeout_inside_a_chunk_keeps_finished_siblings() {
  let tasks = vec![sleeper("short", 500, 10_000), sleeper("long", 5_000, 10_000)];
  let outcome = TaskRunner::shell().run(&tasks, &options(2, 2_000, false)).await;
  assert_eq!(outcome.results.len(), 1);
  assert_eq!(outcome.results[0].task_name, "short");
  assert!(outcome.is_incomplete());
}

#[tokio::test(start_paused = true)]
async fn fail_fast_stops_after_critical_failure_chunk() {
  let tasks = vec![failing("first"), sleeper("second", 10, 1_000), sleeper("third", 10, 1_000)];
  let outcome = TaskRunner::shell().run(&tasks, &options(1, 60_000, true)).await;
  assert_eq!(outcome.results.len(), 1);
  assert_eq!(outcome.chunks_run, 1);
  assert!(outcome.global_error.as_deref().unwrap().starts_with("fail-fast"));
}

#[tokio::test(start_paused = true)]
async fn fail_fast_ignores_non_critical_failures() {
  let tasks = vec![failing("format").with_critical(false), sleeper("lint", 10, 1_000)];
  let outcome = TaskRunner::shell().run(&tasks, &options(1, 60_000, true)).await;
  assert_eq!(outcome.results.len(), 2);
  assert!(outcome.global_error.is_none());
  assert!(outcome.success);
}

#[tokio::test(start_paused = true)]
async fn fail_fast_in_last_chunk_is_not_an_abort() {
  let tasks = vec![sleeper("lint", 10, 1_000), failing("types")];
  let outcome = TaskRunner::shell().run(&tasks, &options(2, 60_000, true)).await;
  assert_eq!(outcome.results.len(), 2);
  assert!(!outcome.is_incomplete());
  assert!(!outcome.success);
}

#[tokio::test(start_paused = true)]
async fn panicking_task_becomes_failure() {
  let tasks = vec![ValidationTask::inline("explodes", Duration::from_secs(1), || async {
    if true {
      panic!("bad task");
    }
    Ok(String::new())
  })];
  let outcome = TaskRunner::shell().run(&tasks, &options(1, 60_000, false)).await;
  assert_eq!(outcome.results.len(), 1);
  assert!(!outcome.results[0].success);
  assert_eq!(outcome.results[0].error_message.as_deref(), Some("task panicked"));
}

#[tokio::test(start_paused = true)]
async fn closure_panicking_before_its_future_is_contained() {
  let tasks = vec![
    ValidationTask::inline("eager", Duration::from_secs(1), || {
      if true {
        panic!("panicked while building the future");
      }
      async { Ok(String::new()) }
    }),
    sleeper("after", 10, 1_000),
  ];
  let outcome = TaskRunner::shell().run(&tasks, &options(2, 60_000, false)).await;
  assert_eq!(outcome.results.len(), 2);
  assert_eq!(outcome.results[0].error_message.as_deref(), Some("task panicked"));
  assert!(outcome.results[1].success);
}

/// Panics on the given command, answers `ok` to everything else.
struct PanicOn(&'static str);

#[async_trait]
impl CommandExecutor for PanicOn {
  async fn execute(&self, command: &str, _cwd: &Path) -> Result<CommandOutput, ExecError> {
    tokio::time::sleep(Duration::from_millis(10)).await;
    if command == self.0 {
      panic!("executor blew up on {}", command);
    }
    Ok(CommandOutput::default())
  }
}

#[tokio::test(start_paused = true)]
async fn command_task_panic_keeps_sibling_results() {
  let runner = TaskRunner::new(Arc::new(PanicOn("boom")));
  let timeout = Duration::from_secs(1);
  let tasks = vec![
    ValidationTask::command("ok1", "true", timeout),
    ValidationTask::command("bad", "boom", timeout).with_critical(false),
    ValidationTask::command("ok2", "true", timeout),
  ];
  let outcome = runner.run(&tasks, &options(3, 60_000, false)).await;

  assert_eq!(outcome.results.len(), 3);
  assert!(outcome.results[0].success);
  assert!(outcome.results[2].success);
  let bad = &outcome.results[1];
  assert!(!bad.success);
  assert!(!bad.timed_out);
  assert_eq!(bad.error_message.as_deref(), Some("task panicked"));
  assert!(outcome.success);
  assert_eq!(outcome.summary.warnings, vec!["bad: task panicked"]);
}

#[tokio::test(start_paused = true)]
async fn command_exit_codes_and_spawn_errors_are_failures() {
  let runner = TaskRunner::new(Arc::new(ScriptedExecutor {
    delay: Duration::from_millis(20),
  }));
  let timeout = Duration::from_secs(1);
  let tasks = vec![
    ValidationTask::command("ok", "ok", timeout),
    ValidationTask::command("lint", "eslint", timeout),
    ValidationTask::command("missing", "missing", timeout).with_critical(false),
  ];
  let outcome = runner.run(&tasks, &options(3, 60_000, false)).await;

  let ok = &outcome.results[0];
  assert!(ok.success);
  assert_eq!(ok.exit_code, Some(0));
  assert_eq!(ok.stdout, "fine\n");

  let lint = &outcome.results[1];
  assert!(!lint.success);
  assert!(!lint.timed_out);
  assert_eq!(lint.exit_code, Some(2));
  assert_eq!(lint.stderr, "lint error\n");

  let missing = &outcome.results[2];
  assert!(!missing.success);
  assert!(missing.error_message.as_deref().unwrap().contains("spawn"));

  assert_eq!(outcome.summary.errors.len(), 1);
  assert_eq!(outcome.summary.warnings.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn empty_task_list_succeeds() {
  let outcome = TaskRunner::shell().run(&[], &RunOptions::default()).await;
  assert!(outcome.success);
  assert_eq!(outcome.chunks_run, 0);
  assert_eq!(outcome.summary.total_tasks, 0);
}

#[cfg(unix)]
#[tokio::test]
async fn shell_command_timeout_is_flagged() {
  let tasks = vec![
    ValidationTask::command("sleepy", "sleep 5", Duration::from_millis(100)),
    ValidationTask::command("echo", "echo done", Duration::from_secs(5)),
  ];
  let opts = RunOptions {
    working_dir: std::env::temp_dir(),
    ..options(2, 10_000, false)
  };
  let outcome = TaskRunner::shell().run(&tasks, &opts).await;
  assert!(outcome.results[0].timed_out);
  assert!(outcome.results[1].success);
  assert_eq!(outcome.results[1].stdout, "done\n");
}

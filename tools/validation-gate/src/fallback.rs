//! Hard-coded check sequence used when the pipeline cannot decide.

use task_engine::{RunOptions, RunOutcome, TaskRunner, ValidationTask};
use tracing::{info, warn};

use crate::config::GateConfig;

pub fn fallback_tasks(config: &GateConfig) -> Vec<ValidationTask> {
  config
    .fallback_commands
    .iter()
    .map(|(name, cmd)| ValidationTask::command(name.as_str(), cmd.as_str(), config.fallback_timeout))
    .collect()
}

/// One task at a time, stopping at the first failure.
pub async fn run_fallback(runner: &TaskRunner, config: &GateConfig) -> RunOutcome {
  let tasks = fallback_tasks(config);
  let options = RunOptions {
    max_concurrency: 1,
    global_timeout: config.fallback_timeout * tasks.len().max(1) as u32,
    fail_fast: true,
    verbose: true,
    working_dir: config.root.clone(),
  };
  info!(tasks = tasks.len(), "running fallback checks");
  let outcome = runner.run(&tasks, &options).await;
  if !outcome.success {
    warn!(errors = ?outcome.summary.errors, "fallback checks failed");
  }
  outcome
}

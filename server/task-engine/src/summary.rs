//! Folding task results into a run summary.

use crate::types::{RunSummary, TaskResult, TaskTiming};

/// Summarize settled results. `can_proceed` depends only on the critical flags
/// and success of the results.
pub fn summarize(results: &[TaskResult]) -> RunSummary {
  let mut summary = RunSummary {
    total_tasks: results.len(),
    can_proceed: true,
    ..RunSummary::default()
  };

  for r in results {
    if r.success {
      summary.success_count += 1;
      continue;
    }
    summary.failure_count += 1;
    if r.critical {
      summary.can_proceed = false;
      summary.errors.push(r.failure_line());
    } else {
      summary.warnings.push(r.failure_line());
    }
  }

  let timing = |r: &TaskResult| TaskTiming {
    task_name: r.task_name.clone(),
    duration_ms: r.duration_ms,
  };
  summary.fastest = results.iter().min_by_key(|r| r.duration_ms).map(timing);
  summary.slowest = results.iter().max_by_key(|r| r.duration_ms).map(timing);
  summary
}

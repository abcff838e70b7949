//! Turning a merged strategy into concrete validation tasks.

use std::path::{Path, PathBuf};
use std::time::Duration;

use impact_engine::{ImpactScope, RecommendedAction};
use risk_engine::CheckCategory;
use serde::Serialize;
use task_engine::ValidationTask;
use tracing::debug;

use crate::config::GateConfig;
use crate::strategy::MergedStrategy;

const LINT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];
const FORMAT_EXTENSIONS: &[&str] = &[
  "ts", "tsx", "js", "jsx", "mjs", "cjs", "json", "css", "scss", "md", "yml", "yaml", "html",
];
const TYPED_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];

/// A category that produced no task, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCheck {
  pub category: CheckCategory,
  pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct TaskPlan {
  pub tasks: Vec<ValidationTask>,
  pub skipped: Vec<SkippedCheck>,
}

impl TaskPlan {
  fn skip(&mut self, category: CheckCategory, reason: &str) {
    debug!(category = %category, reason, "check skipped");
    self.skipped.push(SkippedCheck {
      category,
      reason: reason.to_string(),
    });
  }
}

/// Build one task per category the strategy keeps, lightest first.
pub fn build_tasks(
  changed: &[String],
  candidate_tests: &[PathBuf],
  impact: &ImpactScope,
  merged: &MergedStrategy,
  config: &GateConfig,
) -> TaskPlan {
  let mut plan = TaskPlan::default();
  let global = merged.preset.global_timeout;

  for category in CheckCategory::ALL {
    if merged.preset.skips(category) {
      plan.skip(category, "skipped by strategy");
      continue;
    }
    let settings = config.check(category);
    let timeout = carve_timeout(global, settings.timeout_fraction, config.min_task_timeout);

    let command = match category {
      CheckCategory::Format => {
        let files = existing(changed, FORMAT_EXTENSIONS, config);
        with_files(&settings.command, &files, settings.file_limit)
      }
      CheckCategory::Lint => {
        let files = existing(changed, LINT_EXTENSIONS, config);
        with_files(&settings.command, &files, settings.file_limit)
      }
      CheckCategory::SecretScan => {
        let files = existing(changed, &[], config);
        with_files(&settings.command, &files, settings.file_limit)
      }
      CheckCategory::TypeCheck => changed
        .iter()
        .any(|f| has_extension(f, TYPED_EXTENSIONS))
        .then(|| settings.command.clone()),
      CheckCategory::Test => {
        let tests: Vec<String> = candidate_tests.iter().map(|p| p.display().to_string()).collect();
        match with_files(&settings.command, &tests, settings.file_limit) {
          Some(cmd) => Some(cmd),
          None if impact.recommends(RecommendedAction::RunFullTests) => Some(config.full_test_command.clone()),
          None => None,
        }
      }
    };

    match command {
      Some(cmd) => plan.tasks.push(
        ValidationTask::command(category.as_str(), cmd, timeout).with_critical(settings.critical),
      ),
      None => plan.skip(category, "no matching files"),
    }
  }
  plan
}

/// `fraction` of the global budget, floored at `min` and never above the budget.
pub fn carve_timeout(global: Duration, fraction: f64, min: Duration) -> Duration {
  global.mul_f64(fraction.clamp(0.0, 1.0)).max(min).min(global)
}

/// Changed files that still exist, optionally filtered by extension.
fn existing(changed: &[String], extensions: &[&str], config: &GateConfig) -> Vec<String> {
  changed
    .iter()
    .filter(|f| extensions.is_empty() || has_extension(f, extensions))
    .filter(|f| config.resolve(f.as_str()).is_file())
    .cloned()
    .collect()
}

fn has_extension(path: &str, extensions: &[&str]) -> bool {
  Path::new(path)
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|e| extensions.contains(&e))
}

/// Substitute the first `limit` files into `template`. None when there is
/// nothing to check or the check takes no files.
fn with_files(template: &str, files: &[String], limit: usize) -> Option<String> {
  if files.is_empty() || limit == 0 {
    return None;
  }
  if files.len() > limit {
    debug!(total = files.len(), limit, "file list truncated");
  }
  let args: Vec<String> = files.iter().take(limit).map(|f| shell_quote(f)).collect();
  Some(template.replace("{files}", &args.join(" ")))
}

fn shell_quote(arg: &str) -> String {
  let safe = arg
    .chars()
    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '@' | '+' | ':' | '='));
  if safe && !arg.is_empty() {
    arg.to_string()
  } else {
    format!("'{}'", arg.replace('\'', r"'\''"))
  }
}

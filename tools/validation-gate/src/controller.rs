//! The gate pipeline.
//!
//! COLLECT_INPUT → SELECT_BASE_STRATEGY → SCORE_RISK → ANALYZE_IMPACT →
//! MERGE_STRATEGY → BUILD_TASKS → EXECUTE → INTERPRET. An empty change set
//! short-circuits to a skip. Errors and panics anywhere in the pipeline end
//! in a fallback-required decision instead of escaping.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use futures::FutureExt;
use impact_engine::{ImpactAnalyzer, RecommendedAction};
use risk_engine::RiskScorer;
use task_engine::{RunOptions, RunOutcome, TaskRunner};
use tracing::{error, info, warn};

use crate::config::GateConfig;
use crate::decision::{self, Decision, FailureCategory, Interpretation, Outcome, RiskAnalysis, RunStats, UserChoice};
use crate::error::GateError;
use crate::plan;
use crate::prompt::{DecisionPrompt, FixedChoice, PromptContext};
use crate::strategy::{self, BranchClass};
use crate::vcs::ChangeSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunFlags {
  /// Ask the prompt instead of aborting when the policy cannot decide.
  pub interactive: bool,
  /// Per-task markers at info level.
  pub verbose: bool,
  /// Full error chains in fallback decisions.
  pub debug: bool,
}

pub struct Gate {
  config: GateConfig,
  scorer: RiskScorer,
  analyzer: ImpactAnalyzer,
  runner: TaskRunner,
  prompt: Box<dyn DecisionPrompt>,
}

impl Gate {
  /// Shell-backed gate that aborts when it would have to ask.
  pub fn new(config: GateConfig) -> Self {
    let scorer = RiskScorer::new(risk_engine::Config::with_root(config.root.clone()));
    let analyzer = ImpactAnalyzer::new(impact_engine::Config::with_root(config.root.clone()));
    Self {
      config,
      scorer,
      analyzer,
      runner: TaskRunner::shell(),
      prompt: Box::new(FixedChoice(UserChoice::Abort)),
    }
  }

  pub fn with_runner(mut self, runner: TaskRunner) -> Self {
    self.runner = runner;
    self
  }

  pub fn with_prompt(mut self, prompt: impl DecisionPrompt + 'static) -> Self {
    self.prompt = Box::new(prompt);
    self
  }

  pub fn with_analyzer(mut self, analyzer: ImpactAnalyzer) -> Self {
    self.analyzer = analyzer;
    self
  }

  pub fn config(&self) -> &GateConfig {
    &self.config
  }

  pub fn runner(&self) -> &TaskRunner {
    &self.runner
  }

  /// Decide whether `changes` may proceed. Never fails.
  pub async fn run(&mut self, changes: &ChangeSet, flags: RunFlags) -> Decision {
    let started = Instant::now();
    let result = AssertUnwindSafe(self.pipeline(changes, flags)).catch_unwind().await;
    let elapsed = millis(started.elapsed());

    match result {
      Ok(Ok(mut decision)) => {
        decision.stats.duration_ms = elapsed;
        decision
      }
      Ok(Err(e)) => {
        error!(error = %e, "validation pipeline failed");
        let detail = if flags.debug { format!("{:?}", e) } else { e.to_string() };
        Decision::fallback(detail, elapsed)
      }
      Err(panic) => {
        let msg = panic_message(&*panic);
        error!(panic = %msg, "validation pipeline panicked");
        Decision::fallback(format!("panic: {}", msg), elapsed)
      }
    }
  }

  async fn pipeline(&mut self, changes: &ChangeSet, flags: RunFlags) -> Result<Decision, GateError> {
    if changes.changed_files.is_empty() {
      info!("no changed files; skipping validation");
      return Ok(Decision::skipped());
    }
    if changes.changed_files.iter().any(|f| f.trim().is_empty()) {
      return Err(GateError::input("empty path in changed files"));
    }
    if changes.has_uncommitted_changes {
      warn!("working tree has unstaged changes; checks see the working copy");
    }

    let branch = BranchClass::classify(&changes.branch);

    let scores = self.scorer.score_batch(&changes.changed_files, &changes.diffs);
    let profile = self.scorer.aggregate(&scores);

    let impact = self.analyzer.impact(&changes.changed_files);
    // Wide changes look for tests around everything they reach.
    let candidate_tests = if impact.recommends(RecommendedAction::RunRelatedTests) {
      let affected: Vec<&PathBuf> = impact.affected_files.iter().collect();
      self.analyzer.candidate_tests(&affected)
    } else {
      self.analyzer.candidate_tests(&changes.changed_files)
    };

    let merged = strategy::merge(branch, &profile, &self.config);
    info!(
      branch = %changes.branch,
      base = %merged.base,
      recommended = %merged.recommended,
      strategy = %merged.strategy,
      rules = merged.applied_rules.len(),
      "strategy selected"
    );

    let plan = plan::build_tasks(&changes.changed_files, &candidate_tests, &impact, &merged, &self.config);
    let commands: Vec<(String, String)> = plan
      .tasks
      .iter()
      .filter_map(|t| t.command_text().map(|c| (t.name.clone(), c.to_string())))
      .collect();

    let options = RunOptions {
      max_concurrency: merged.preset.max_concurrency,
      global_timeout: merged.preset.global_timeout,
      fail_fast: merged.preset.fail_fast,
      verbose: flags.verbose,
      working_dir: self.config.root.clone(),
    };
    let run = self.runner.run(&plan.tasks, &options).await;

    let category = decision::classify(&run);
    let remediation = match category {
      Some(_) => decision::remediation(&run, &commands),
      None => Vec::new(),
    };
    let outcome = match decision::interpret(merged.strategy, &run) {
      Interpretation::Final(outcome) => outcome,
      Interpretation::AskUser if flags.interactive => {
        let ctx = PromptContext {
          strategy: merged.strategy,
          category: category.unwrap_or(FailureCategory::Critical),
          failures: failure_lines(&run),
          remediation: remediation.clone(),
        };
        self.prompt.choose(&ctx).await?.outcome()
      }
      Interpretation::AskUser => Outcome::Abort,
    };
    info!(outcome = %outcome, category = ?category, "validation decided");

    let stats = RunStats {
      files_changed: changes.changed_files.len(),
      tasks_planned: plan.tasks.len(),
      candidate_tests: candidate_tests.len(),
      skipped_checks: plan.skipped,
      duration_ms: 0,
    };
    Ok(Decision {
      success: outcome.exit_code() == 0,
      outcome,
      message: outcome_message(outcome, &run),
      strategy: Some(merged),
      risk_analysis: Some(RiskAnalysis { scores, profile }),
      impact_analysis: Some(impact),
      validation_result: Some(run),
      stats,
      failure_category: category,
      remediation,
      fallback_required: false,
      error: None,
    })
  }
}

fn failure_lines(run: &RunOutcome) -> Vec<String> {
  let mut lines: Vec<String> = run
    .results
    .iter()
    .filter(|r| !r.success)
    .map(|r| r.failure_line())
    .collect();
  if let Some(e) = &run.global_error {
    lines.push(e.clone());
  }
  lines
}

fn outcome_message(outcome: Outcome, run: &RunOutcome) -> String {
  let s = &run.summary;
  match outcome {
    Outcome::Proceed => format!("all {} checks passed", s.total_tasks),
    Outcome::ProceedWithWarning => format!(
      "proceeding with {} warning(s) and {} critical failure(s)",
      s.warnings.len(),
      s.errors.len()
    ),
    Outcome::SkipOnce => "validation skipped for this change".to_string(),
    Outcome::AlwaysSkip => "validation skipped from now on".to_string(),
    Outcome::Abort => match &run.global_error {
      Some(e) => format!("aborted: {}", e),
      None => format!("aborted: {} critical failure(s)", s.errors.len()),
    },
    Outcome::Skipped | Outcome::Bypassed | Outcome::FallbackRequired => outcome.to_string(),
  }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
  if let Some(s) = panic.downcast_ref::<&str>() {
    s.to_string()
  } else if let Some(s) = panic.downcast_ref::<String>() {
    s.clone()
  } else {
    "unknown panic".to_string()
  }
}

fn millis(d: Duration) -> u64 {
  u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

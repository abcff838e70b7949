//! Interpreting a run into a final decision.

use std::fmt;

use impact_engine::ImpactScope;
use risk_engine::{FileRiskScore, ProjectRiskProfile, Strategy};
use serde::Serialize;
use task_engine::RunOutcome;

use crate::plan::SkippedCheck;
use crate::strategy::MergedStrategy;

// ---------------------------------------------------------------------------
// Outcomes and choices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
  /// Bypass flag or persisted always-skip marker.
  Bypassed,
  /// Nothing changed.
  Skipped,
  Proceed,
  ProceedWithWarning,
  SkipOnce,
  AlwaysSkip,
  Abort,
  FallbackRequired,
}

impl Outcome {
  pub fn exit_code(self) -> i32 {
    match self {
      Self::Abort | Self::FallbackRequired => 1,
      Self::Bypassed
      | Self::Skipped
      | Self::Proceed
      | Self::ProceedWithWarning
      | Self::SkipOnce
      | Self::AlwaysSkip => 0,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Bypassed => "bypassed",
      Self::Skipped => "skipped",
      Self::Proceed => "proceed",
      Self::ProceedWithWarning => "proceed_with_warning",
      Self::SkipOnce => "skip_once",
      Self::AlwaysSkip => "always_skip",
      Self::Abort => "abort",
      Self::FallbackRequired => "fallback_required",
    }
  }
}

impl fmt::Display for Outcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The four answers offered when a failed run needs a human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserChoice {
  Abort,
  ProceedWithWarning,
  SkipOnce,
  AlwaysSkip,
}

impl UserChoice {
  pub const ALL: [UserChoice; 4] = [
    Self::Abort,
    Self::ProceedWithWarning,
    Self::SkipOnce,
    Self::AlwaysSkip,
  ];

  pub fn outcome(self) -> Outcome {
    match self {
      Self::Abort => Outcome::Abort,
      Self::ProceedWithWarning => Outcome::ProceedWithWarning,
      Self::SkipOnce => Outcome::SkipOnce,
      Self::AlwaysSkip => Outcome::AlwaysSkip,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Abort => "Abort (fix the failures first)",
      Self::ProceedWithWarning => "Proceed with warning",
      Self::SkipOnce => "Skip validation this time",
      Self::AlwaysSkip => "Always skip validation",
    }
  }

  /// Parse a menu answer: its number (1-based) or a name.
  pub fn parse(input: &str) -> Option<Self> {
    match input.trim().to_ascii_lowercase().as_str() {
      "1" | "a" | "abort" => Some(Self::Abort),
      "2" | "p" | "proceed" => Some(Self::ProceedWithWarning),
      "3" | "s" | "skip" | "skip once" => Some(Self::SkipOnce),
      "4" | "always" | "always skip" => Some(Self::AlwaysSkip),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
  /// A critical check failed.
  Critical,
  /// Only non-critical checks failed.
  NonCritical,
  /// Every critical failure was a timeout.
  Timeout,
  /// The run stopped early; not every check settled.
  Incomplete,
}

impl FailureCategory {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Critical => "critical",
      Self::NonCritical => "non_critical",
      Self::Timeout => "timeout",
      Self::Incomplete => "incomplete",
    }
  }
}

impl fmt::Display for FailureCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ---------------------------------------------------------------------------
// Interpretation
// ---------------------------------------------------------------------------

/// None when every submitted task settled and passed.
pub fn classify(run: &RunOutcome) -> Option<FailureCategory> {
  if run.is_incomplete() {
    return Some(FailureCategory::Incomplete);
  }
  let critical: Vec<_> = run.critical_failures().collect();
  if !critical.is_empty() {
    return Some(if critical.iter().all(|r| r.timed_out) {
      FailureCategory::Timeout
    } else {
      FailureCategory::Critical
    });
  }
  if run.results.iter().any(|r| !r.success) {
    return Some(FailureCategory::NonCritical);
  }
  None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpretation {
  Final(Outcome),
  /// Interactive runs ask; others abort.
  AskUser,
}

pub fn interpret(strategy: Strategy, run: &RunOutcome) -> Interpretation {
  match classify(run) {
    None => Interpretation::Final(Outcome::Proceed),
    Some(FailureCategory::NonCritical) => Interpretation::Final(Outcome::ProceedWithWarning),
    Some(_) if strategy == Strategy::Strict => Interpretation::Final(Outcome::Abort),
    Some(category)
      if strategy == Strategy::Fast
        && category != FailureCategory::Incomplete
        && run.critical_failures().count() == 1 =>
    {
      Interpretation::Final(Outcome::ProceedWithWarning)
    }
    Some(_) => Interpretation::AskUser,
  }
}

/// Concrete next steps for a failed run.
pub fn remediation(run: &RunOutcome, commands: &[(String, String)]) -> Vec<String> {
  let mut out = Vec::new();
  for result in run.results.iter().filter(|r| !r.success) {
    match commands.iter().find(|(name, _)| *name == result.task_name) {
      Some((_, cmd)) => out.push(format!("Re-run {}: {}", result.task_name, cmd)),
      None => out.push(format!("Re-run {}", result.task_name)),
    }
  }
  if run.is_incomplete() {
    out.push("Re-run validation; not every check finished".to_string());
  }
  out.push("Bypass once: SKIP_VALIDATION=1 git commit ...".to_string());
  out.push("Bypass permanently: answer 'always skip' in interactive mode".to_string());
  out
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAnalysis {
  pub scores: Vec<FileRiskScore>,
  pub profile: ProjectRiskProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
  pub files_changed: usize,
  pub tasks_planned: usize,
  pub candidate_tests: usize,
  pub skipped_checks: Vec<SkippedCheck>,
  pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
  /// The change may go ahead.
  pub success: bool,
  pub outcome: Outcome,
  pub strategy: Option<MergedStrategy>,
  pub risk_analysis: Option<RiskAnalysis>,
  pub impact_analysis: Option<ImpactScope>,
  pub validation_result: Option<RunOutcome>,
  pub stats: RunStats,
  pub failure_category: Option<FailureCategory>,
  pub message: String,
  pub remediation: Vec<String>,
  pub fallback_required: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl Decision {
  fn bare(outcome: Outcome, message: impl Into<String>) -> Self {
    Self {
      success: outcome.exit_code() == 0,
      outcome,
      strategy: None,
      risk_analysis: None,
      impact_analysis: None,
      validation_result: None,
      stats: RunStats::default(),
      failure_category: None,
      message: message.into(),
      remediation: Vec::new(),
      fallback_required: false,
      error: None,
    }
  }

  pub fn skipped() -> Self {
    Self::bare(Outcome::Skipped, "no changed files")
  }

  pub fn bypassed(reason: impl Into<String>) -> Self {
    Self::bare(Outcome::Bypassed, reason)
  }

  /// The pipeline itself broke; the caller should run the fallback sequence.
  pub fn fallback(error: impl Into<String>, duration_ms: u64) -> Self {
    let error = error.into();
    let mut d = Self::bare(
      Outcome::FallbackRequired,
      "validation pipeline failed; falling back to basic checks",
    );
    d.fallback_required = true;
    d.stats.duration_ms = duration_ms;
    d.remediation = vec![
      "Run the basic checks: lint and type check".to_string(),
      "Re-run with VALIDATION_DEBUG=1 for details".to_string(),
    ];
    d.error = Some(error);
    d
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use task_engine::{RunSummary, TaskResult};

  fn result(name: &str, success: bool, critical: bool, timed_out: bool) -> TaskResult {
    TaskResult {
      task_name: name.to_string(),
      success,
      critical,
      duration_ms: 10,
      started_at_ms: 0,
      chunk_index: 0,
      stdout: String::new(),
      stderr: String::new(),
      error_message: (!success).then(|| "failed".to_string()),
      timed_out,
      exit_code: None,
    }
  }

  fn outcome(results: Vec<TaskResult>, global_error: Option<&str>) -> RunOutcome {
    RunOutcome {
      success: false,
      tasks_submitted: results.len(),
      results,
      summary: RunSummary::default(),
      global_error: global_error.map(str::to_string),
      chunks_run: 1,
      duration_ms: 10,
    }
  }

  #[test]
  fn exit_codes() {
    assert_eq!(Outcome::Proceed.exit_code(), 0);
    assert_eq!(Outcome::ProceedWithWarning.exit_code(), 0);
    assert_eq!(Outcome::SkipOnce.exit_code(), 0);
    assert_eq!(Outcome::AlwaysSkip.exit_code(), 0);
    assert_eq!(Outcome::Abort.exit_code(), 1);
    assert_eq!(Outcome::FallbackRequired.exit_code(), 1);
  }

  #[test]
  fn classification() {
    assert_eq!(classify(&outcome(vec![result("lint", true, true, false)], None)), None);
    assert_eq!(
      classify(&outcome(vec![result("format", false, false, false)], None)),
      Some(FailureCategory::NonCritical)
    );
    assert_eq!(
      classify(&outcome(vec![result("test", false, true, true)], None)),
      Some(FailureCategory::Timeout)
    );
    assert_eq!(
      classify(&outcome(
        vec![result("test", false, true, true), result("lint", false, true, false)],
        None
      )),
      Some(FailureCategory::Critical)
    );
    assert_eq!(
      classify(&outcome(vec![result("lint", true, true, false)], Some("global timeout"))),
      Some(FailureCategory::Incomplete)
    );
  }

  #[test]
  fn strict_aborts_and_fast_forgives_one() {
    let one = outcome(vec![result("lint", false, true, false), result("test", true, true, false)], None);
    assert_eq!(interpret(Strategy::Strict, &one), Interpretation::Final(Outcome::Abort));
    assert_eq!(interpret(Strategy::Fast, &one), Interpretation::Final(Outcome::ProceedWithWarning));
    assert_eq!(interpret(Strategy::Standard, &one), Interpretation::AskUser);

    let two = outcome(vec![result("lint", false, true, false), result("test", false, true, false)], None);
    assert_eq!(interpret(Strategy::Fast, &two), Interpretation::AskUser);
  }

  #[test]
  fn incomplete_run_is_never_forgiven() {
    let run = outcome(vec![result("lint", false, true, false)], Some("fail-fast: critical task `lint` failed"));
    assert_eq!(interpret(Strategy::Fast, &run), Interpretation::AskUser);
    let partial = outcome(vec![result("lint", true, true, false)], Some("global timeout"));
    assert_eq!(interpret(Strategy::Enhanced, &partial), Interpretation::AskUser);
  }

  #[test]
  fn choices_parse_by_number_and_name() {
    assert_eq!(UserChoice::parse("1"), Some(UserChoice::Abort));
    assert_eq!(UserChoice::parse(" Proceed\n"), Some(UserChoice::ProceedWithWarning));
    assert_eq!(UserChoice::parse("3"), Some(UserChoice::SkipOnce));
    assert_eq!(UserChoice::parse("always"), Some(UserChoice::AlwaysSkip));
    assert_eq!(UserChoice::parse("maybe"), None);
  }

  #[test]
  fn remediation_names_rerun_and_bypasses() {
    let run = outcome(vec![result("lint", false, true, false)], None);
    let steps = remediation(&run, &[("lint".to_string(), "npx eslint a.ts".to_string())]);
    assert_eq!(steps[0], "Re-run lint: npx eslint a.ts");
    assert!(steps.iter().any(|s| s.starts_with("Bypass once")));
    assert!(steps.iter().any(|s| s.starts_with("Bypass permanently")));
  }
}

//! Branch policy and the strategy merge.
//!
//! The branch picks a base preset. Computed risk then escalates it through an
//! ordered list of [`EscalationRule`]s, each a pure function from one
//! [`MergedStrategy`] to the next.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use risk_engine::{CheckCategory, ProjectRiskProfile, RiskLevel, Strategy};
use serde::Serialize;
use tracing::debug;

use crate::config::GateConfig;

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyPreset {
  pub max_concurrency: usize,
  #[serde(rename = "global_timeout_ms", serialize_with = "as_millis")]
  pub global_timeout: Duration,
  pub fail_fast: bool,
  pub skip_categories: BTreeSet<CheckCategory>,
}

impl StrategyPreset {
  pub fn for_strategy(strategy: Strategy) -> Self {
    let (max_concurrency, secs, fail_fast, skip) = match strategy {
      Strategy::Fast => (4, 60, true, vec![CheckCategory::Test]),
      Strategy::Standard => (3, 120, false, Vec::new()),
      Strategy::Enhanced => (2, 180, false, Vec::new()),
      Strategy::Strict => (2, 300, true, Vec::new()),
    };
    Self {
      max_concurrency,
      global_timeout: Duration::from_secs(secs),
      fail_fast,
      skip_categories: skip.into_iter().collect(),
    }
  }

  pub fn skips(&self, category: CheckCategory) -> bool {
    self.skip_categories.contains(&category)
  }
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
  s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

// ---------------------------------------------------------------------------
// Branch classes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchClass {
  Main,
  Develop,
  Feature,
  Hotfix,
  Other,
}

impl BranchClass {
  pub fn classify(branch: &str) -> Self {
    let name = branch.trim();
    let name = name.strip_prefix("refs/heads/").unwrap_or(name);
    match name {
      "main" | "master" => Self::Main,
      "develop" | "dev" => Self::Develop,
      _ if name.starts_with("feature/") => Self::Feature,
      _ if name.starts_with("hotfix/") || name.starts_with("fix/") => Self::Hotfix,
      _ => Self::Other,
    }
  }

  pub fn default_strategy(self) -> Strategy {
    match self {
      Self::Main => Strategy::Strict,
      Self::Develop => Strategy::Enhanced,
      Self::Feature | Self::Other => Strategy::Standard,
      Self::Hotfix => Strategy::Fast,
    }
  }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Final plan after escalation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedStrategy {
  /// The more severe of `base` and `recommended`.
  pub strategy: Strategy,
  pub branch: BranchClass,
  pub base: Strategy,
  pub recommended: Strategy,
  pub preset: StrategyPreset,
  /// Rules that changed something, in application order.
  pub applied_rules: Vec<EscalationRule>,
}

/// Inputs the rules read. Never mutated.
pub struct MergeContext<'a> {
  pub profile: &'a ProjectRiskProfile,
  pub config: &'a GateConfig,
}

impl MergeContext<'_> {
  fn critical_files(&self) -> usize {
    self.profile.distribution.count(RiskLevel::Critical)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationRule {
  /// Adopt the risk strategy when it is more severe than the branch's.
  AdoptRiskStrategy,
  UnionSkipCategories,
  /// Global timeout becomes min(base, recommended).
  MinTimeout,
  /// Too many critical files: one task at a time, formatting skipped.
  SerializeOnCriticalMass,
  /// Even more critical files: drop the heaviest category and cap the timeout.
  DropHeaviestOnOverload,
}

impl EscalationRule {
  pub const ORDER: [EscalationRule; 5] = [
    Self::AdoptRiskStrategy,
    Self::UnionSkipCategories,
    Self::MinTimeout,
    Self::SerializeOnCriticalMass,
    Self::DropHeaviestOnOverload,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::AdoptRiskStrategy => "adopt_risk_strategy",
      Self::UnionSkipCategories => "union_skip_categories",
      Self::MinTimeout => "min_timeout",
      Self::SerializeOnCriticalMass => "serialize_on_critical_mass",
      Self::DropHeaviestOnOverload => "drop_heaviest_on_overload",
    }
  }

  /// Apply this rule, recording it when the plan changed.
  pub fn apply(self, plan: MergedStrategy, ctx: &MergeContext<'_>) -> MergedStrategy {
    let mut next = self.transform(plan.clone(), ctx);
    if next != plan {
      debug!(rule = self.as_str(), "escalation rule applied");
      next.applied_rules.push(self);
    }
    next
  }

  fn transform(self, mut plan: MergedStrategy, ctx: &MergeContext<'_>) -> MergedStrategy {
    let recommendation = &ctx.profile.recommendation;
    match self {
      Self::AdoptRiskStrategy => {
        if plan.recommended > plan.strategy {
          let escalated = StrategyPreset::for_strategy(plan.recommended);
          plan.strategy = plan.recommended;
          plan.preset.max_concurrency = plan.preset.max_concurrency.min(escalated.max_concurrency);
          plan.preset.fail_fast |= escalated.fail_fast;
        }
      }
      Self::UnionSkipCategories => {
        plan
          .preset
          .skip_categories
          .extend(recommendation.skip_categories.iter().copied());
      }
      Self::MinTimeout => {
        let recommended = Duration::from_secs(recommendation.timeout_seconds);
        plan.preset.global_timeout = plan.preset.global_timeout.min(recommended);
      }
      Self::SerializeOnCriticalMass => {
        if ctx.critical_files() > ctx.config.serialize_threshold {
          plan.preset.max_concurrency = 1;
          plan.preset.skip_categories.insert(CheckCategory::Format);
        }
      }
      Self::DropHeaviestOnOverload => {
        if ctx.critical_files() > ctx.config.overload_threshold {
          plan.preset.skip_categories.insert(CheckCategory::heaviest());
          plan.preset.global_timeout = plan.preset.global_timeout.min(ctx.config.overload_timeout_cap);
        }
      }
    }
    plan
  }
}

impl fmt::Display for EscalationRule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Fold every escalation rule, in order, over the branch's base preset.
pub fn merge(branch: BranchClass, profile: &ProjectRiskProfile, config: &GateConfig) -> MergedStrategy {
  let base = branch.default_strategy();
  let initial = MergedStrategy {
    strategy: base,
    branch,
    base,
    recommended: profile.recommendation.strategy,
    preset: StrategyPreset::for_strategy(base),
    applied_rules: Vec::new(),
  };
  let ctx = MergeContext { profile, config };
  EscalationRule::ORDER
    .iter()
    .fold(initial, |plan, rule| rule.apply(plan, &ctx))
}

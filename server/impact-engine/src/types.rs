//! Core types for the impact analyzer (JSON contracts + internal models).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Binary contract
// ---------------------------------------------------------------------------

/// Input: one JSON object on stdin.
#[derive(Debug, Deserialize)]
pub struct Input {
  #[serde(default)]
  pub root: Option<String>,
  pub changed_files: Vec<String>,
}

/// Output: one JSON object on stdout.
#[derive(Debug, Serialize)]
pub struct Output {
  pub impact: ImpactScope,
  pub candidate_tests: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// Edges and traversal
// ---------------------------------------------------------------------------

/// Direct module references of one file, classified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdges {
  /// Repository-relative files this file imports.
  pub internal: Vec<PathBuf>,
  /// Package roots (`react`, `@scope/pkg`, `node:fs`).
  pub external: Vec<String>,
  /// Specifiers that looked local but matched no file, or files that could not be read.
  pub unresolved: Vec<String>,
}

/// Result of a depth-capped traversal from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeAnalysis {
  pub dependencies: BTreeSet<PathBuf>,
  pub has_cycle: bool,
  /// Files that reappeared in their own ancestor chain.
  pub cycle_nodes: BTreeSet<PathBuf>,
  /// Whether some branch was cut by the depth cap.
  pub depth_limited: bool,
}

// ---------------------------------------------------------------------------
// Impact scope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Info,
  Low,
  Medium,
  High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
  RunFullTests,
  RunRelatedTests,
  CheckCircularDependencies,
  EnhancedTypeCheck,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactRecommendation {
  pub severity: Severity,
  pub action: RecommendedAction,
  pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImpactScope {
  pub total_files: usize,
  /// Changed files plus everything they transitively import.
  pub affected_files: BTreeSet<PathBuf>,
  pub external_packages: BTreeSet<String>,
  /// Changed files whose traversal hit a cycle.
  pub circular_dependencies: BTreeSet<PathBuf>,
  pub recommendations: Vec<ImpactRecommendation>,
}

impl ImpactScope {
  pub fn recommends(&self, action: RecommendedAction) -> bool {
    self.recommendations.iter().any(|r| r.action == action)
  }
}

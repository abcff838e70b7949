//! Validation Gate Impact Analyzer: import-graph impact of a change set.
//!
//! Extracts module references from JS/TS sources, resolves them through an
//! alias table and extension/index probing, and walks the resulting graph
//! depth-first with per-branch cycle detection. Per-file edges are cached
//! with a TTL on an injected clock.
//!
//! Analysis never fails: unreadable files and unresolvable references are
//! recorded as unresolved entries.

pub mod analyzer;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod extract;
pub mod resolve;
pub mod types;

use std::path::PathBuf;

pub use analyzer::ImpactAnalyzer;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::ImpactError;
pub use types::{
  DependencyEdges, ImpactRecommendation, ImpactScope, Input, Output, RecommendedAction, Severity,
  TreeAnalysis,
};

/// Run the analyzer on parsed input and return the output.
pub fn run(input: &Input) -> Output {
  let config = match &input.root {
    Some(root) => Config::with_root(PathBuf::from(root)),
    None => Config::default(),
  };
  let mut analyzer = ImpactAnalyzer::new(config);
  let impact = analyzer.impact(&input.changed_files);
  let candidate_tests = analyzer.candidate_tests(&input.changed_files);
  Output {
    impact,
    candidate_tests,
  }
}

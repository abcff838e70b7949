//! Validation Gate: decides whether a change may be committed.
//!
//! Branch policy sets a base strategy; the risk engine can only make it
//! stricter. The impact engine contributes candidate tests and test-scope
//! hints. The task engine runs the resulting checks, and the outcome is
//! interpreted into a [`Decision`] whose [`Outcome`] maps to an exit code.

pub mod bypass;
pub mod config;
pub mod controller;
pub mod decision;
pub mod error;
pub mod fallback;
pub mod plan;
pub mod prompt;
pub mod report;
pub mod strategy;
pub mod vcs;

pub use bypass::BypassStore;
pub use config::{CheckSettings, GateConfig};
pub use controller::{Gate, RunFlags};
pub use decision::{Decision, FailureCategory, Outcome, UserChoice};
pub use error::GateError;
pub use prompt::{DecisionPrompt, FixedChoice, PromptContext, TerminalPrompt};
pub use strategy::{BranchClass, EscalationRule, MergedStrategy, StrategyPreset};
pub use vcs::{ChangeSet, GitCollector};

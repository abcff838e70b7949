//! Validation Gate Task Engine: bounded-concurrency task execution.
//!
//! Tasks are split, in input order, into chunks of `max_concurrency`. All
//! tasks of a chunk run concurrently on the calling task; chunks run one
//! after another. Per-task timeouts produce `timed_out` failures, the global
//! deadline stops the run while keeping settled results, and fail-fast stops
//! after the first chunk with a critical failure.

pub mod error;
pub mod executor;
pub mod runner;
pub mod summary;
pub mod types;

pub use error::ExecError;
pub use executor::{CommandExecutor, CommandOutput, ShellExecutor};
pub use runner::TaskRunner;
pub use summary::summarize;
pub use types::{
  InlineFn, RunOptions, RunOutcome, RunSummary, TaskAction, TaskResult, TaskTiming, ValidationTask,
};

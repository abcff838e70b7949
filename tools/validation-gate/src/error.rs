//! Structured error types for the gate pipeline.

use thiserror::Error;

/// Errors inside the gate pipeline. The public `Gate::run` never returns
/// these; it turns them into a fallback-required decision.
#[derive(Error, Debug)]
pub enum GateError {
  #[error("git {command}: {message}")]
  Vcs { command: String, message: String },

  #[error("decision prompt failed: {0}")]
  Prompt(String),

  #[error("invalid change set: {0}")]
  Input(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl GateError {
  pub fn vcs(command: &str, message: impl Into<String>) -> Self {
    Self::Vcs {
      command: command.to_string(),
      message: message.into(),
    }
  }

  pub fn prompt(message: impl Into<String>) -> Self {
    Self::Prompt(message.into())
  }

  pub fn input(message: impl Into<String>) -> Self {
    Self::Input(message.into())
  }
}

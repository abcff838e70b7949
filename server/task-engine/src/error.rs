//! Structured error types for task execution.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
  #[error("spawn `{command}`: {source}")]
  Spawn {
    command: String,
    #[source]
    source: std::io::Error,
  },

  /// The work ran and failed. Carries whatever output it produced.
  #[error("{message}")]
  Failed {
    message: String,
    stdout: String,
    stderr: String,
    exit_code: Option<i32>,
  },
}

impl ExecError {
  pub fn spawn(command: &str, source: std::io::Error) -> Self {
    Self::Spawn {
      command: command.to_string(),
      source,
    }
  }

  pub fn failed(message: impl Into<String>) -> Self {
    Self::Failed {
      message: message.into(),
      stdout: String::new(),
      stderr: String::new(),
      exit_code: None,
    }
  }
}

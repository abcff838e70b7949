//! Command execution collaborator.

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ExecError;

/// Maximum bytes kept per output stream.
const MAX_OUTPUT_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
  pub stdout: String,
  pub stderr: String,
  pub exit_code: i32,
}

/// Runs an opaque command string in a working directory.
///
/// A process that ran to completion is `Ok` whatever its exit code; callers
/// decide what a non-zero code means. Dropping the returned future must stop
/// the underlying process.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
  async fn execute(&self, command: &str, cwd: &Path) -> Result<CommandOutput, ExecError>;
}

/// `sh -c <command>` via tokio, killed when abandoned.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellExecutor;

#[async_trait]
impl CommandExecutor for ShellExecutor {
  async fn execute(&self, command: &str, cwd: &Path) -> Result<CommandOutput, ExecError> {
    let output = tokio::process::Command::new("sh")
      .arg("-c")
      .arg(command)
      .current_dir(cwd)
      .kill_on_drop(true)
      .output()
      .await
      .map_err(|e| ExecError::spawn(command, e))?;

    Ok(CommandOutput {
      stdout: truncate(String::from_utf8_lossy(&output.stdout).into_owned()),
      stderr: truncate(String::from_utf8_lossy(&output.stderr).into_owned()),
      // Terminated by a signal.
      exit_code: output.status.code().unwrap_or(-1),
    })
  }
}

/// Keep the tail of oversized output; tool failures are usually reported last.
fn truncate(s: String) -> String {
  if s.len() <= MAX_OUTPUT_SIZE {
    return s;
  }
  let mut cut = s.len() - MAX_OUTPUT_SIZE;
  while !s.is_char_boundary(cut) {
    cut += 1;
  }
  format!("... [{} bytes omitted] ...\n{}", cut, &s[cut..])
}

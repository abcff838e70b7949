//! Human-in-the-loop choice after a failed run.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use async_trait::async_trait;
use risk_engine::Strategy;
use tracing::warn;

use crate::decision::{FailureCategory, UserChoice};
use crate::error::GateError;

/// What the person deciding gets to see.
#[derive(Debug, Clone)]
pub struct PromptContext {
  pub strategy: Strategy,
  pub category: FailureCategory,
  pub failures: Vec<String>,
  pub remediation: Vec<String>,
}

#[async_trait]
pub trait DecisionPrompt: Send + Sync {
  async fn choose(&self, ctx: &PromptContext) -> Result<UserChoice, GateError>;
}

/// Always answers the same. Non-interactive callers and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedChoice(pub UserChoice);

#[async_trait]
impl DecisionPrompt for FixedChoice {
  async fn choose(&self, _ctx: &PromptContext) -> Result<UserChoice, GateError> {
    Ok(self.0)
  }
}

/// Menu on stderr, answer from stdin. Waits forever unless `timeout` is set,
/// in which case silence means abort.
#[derive(Debug, Clone, Default)]
pub struct TerminalPrompt {
  pub timeout: Option<Duration>,
}

#[async_trait]
impl DecisionPrompt for TerminalPrompt {
  async fn choose(&self, ctx: &PromptContext) -> Result<UserChoice, GateError> {
    let menu = render_menu(ctx);
    let ask = tokio::task::spawn_blocking(move || read_choice(&menu));
    let joined = match self.timeout {
      Some(limit) => match tokio::time::timeout(limit, ask).await {
        Ok(joined) => joined,
        Err(_) => {
          let timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
          warn!(timeout_ms, "no answer; aborting");
          return Ok(UserChoice::Abort);
        }
      },
      None => ask.await,
    };
    joined.map_err(|e| GateError::prompt(e.to_string()))?
  }
}

fn render_menu(ctx: &PromptContext) -> String {
  let mut out = format!("\nValidation failed ({}, strategy {}):\n", ctx.category, ctx.strategy);
  for failure in &ctx.failures {
    out.push_str(&format!("  ✗ {}\n", failure));
  }
  if !ctx.remediation.is_empty() {
    out.push_str("\nOptions:\n");
    for line in &ctx.remediation {
      out.push_str(&format!("  - {}\n", line));
    }
  }
  out.push_str("\nWhat now?\n");
  for (i, choice) in UserChoice::ALL.iter().enumerate() {
    out.push_str(&format!("  {}) {}\n", i + 1, choice.label()));
  }
  out
}

fn read_choice(menu: &str) -> Result<UserChoice, GateError> {
  let stdin = io::stdin();
  let mut stderr = io::stderr();
  stderr.write_all(menu.as_bytes())?;
  loop {
    write!(stderr, "Choice [1-4]: ")?;
    stderr.flush()?;
    let mut line = String::new();
    if stdin.lock().read_line(&mut line)? == 0 {
      return Err(GateError::prompt("stdin closed before a choice was made"));
    }
    if let Some(choice) = UserChoice::parse(&line) {
      return Ok(choice);
    }
    writeln!(stderr, "Please answer 1, 2, 3 or 4.")?;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn menu_lists_failures_and_every_choice() {
    let ctx = PromptContext {
      strategy: Strategy::Standard,
      category: FailureCategory::Critical,
      failures: vec!["lint: exited with code 1".to_string()],
      remediation: vec!["Re-run lint: npx eslint src/a.ts".to_string()],
    };
    let menu = render_menu(&ctx);
    assert!(menu.contains("critical, strategy STANDARD"));
    assert!(menu.contains("  - Re-run lint: npx eslint src/a.ts"));
    assert!(menu.find("Re-run lint").unwrap() < menu.find("What now?").unwrap());
    assert!(menu.contains("✗ lint: exited with code 1"));
    assert!(menu.contains("4) Always skip validation"));
  }

  #[tokio::test]
  async fn fixed_choice_answers() {
    let ctx = PromptContext {
      strategy: Strategy::Enhanced,
      category: FailureCategory::Timeout,
      failures: Vec::new(),
      remediation: Vec::new(),
    };
    let choice = FixedChoice(UserChoice::SkipOnce).choose(&ctx).await.unwrap();
    assert_eq!(choice, UserChoice::SkipOnce);
  }
}

//! risk-engine: one JSON object on stdin, one on stdout.
//!
//! Usage:
//!   risk-engine < input.json            # compact output
//!   risk-engine --pretty < input.json   # indented output
//!
//! Logs go to stderr; set RUST_LOG=debug for per-file detail.

use std::env;
use std::io::{self, Read, Write};

use risk_engine::{run, Input};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .init();

  let pretty = env::args().skip(1).any(|a| a == "--pretty" || a == "-p");
  if let Err(e) = run_binary(pretty) {
    let _ = writeln!(io::stderr(), "risk-engine error: {}", e);
    std::process::exit(1);
  }
}

fn run_binary(pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
  let mut raw = String::new();
  io::stdin().lock().read_to_string(&mut raw)?;
  let input: Input = serde_json::from_str(&raw)?;
  debug!(files = input.files_changed.len(), "input parsed");

  let out = run(&input);
  let mut json = if pretty {
    serde_json::to_vec_pretty(&out)?
  } else {
    serde_json::to_vec(&out)?
  };
  json.push(b'\n');
  io::stdout().lock().write_all(&json)?;
  Ok(())
}

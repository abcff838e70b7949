//! validation-gate: pre-commit entry point.
//!
//! Usage:
//!   validation-gate                       # staged changes from git
//!   validation-gate --input change.json   # change set from a file ("-" for stdin)
//!   validation-gate --interactive -v      # ask before aborting, show per-task markers
//!
//! SKIP_VALIDATION=1 bypasses every check; VALIDATION_DEBUG=1 enables debug
//! logs and full error chains. Exit code 0 lets the commit through.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use task_engine::TaskRunner;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use validation_gate::decision::Decision;
use validation_gate::report::{self, RunReport};
use validation_gate::{
  fallback, BypassStore, ChangeSet, Gate, GateConfig, GitCollector, Outcome, RunFlags, TerminalPrompt,
};

#[derive(Parser, Debug)]
#[command(name = "validation-gate", version, about = "Adaptive pre-commit validation")]
struct Cli {
  /// Repository root.
  #[arg(long, default_value = ".")]
  root: PathBuf,

  /// Branch name; defaults to the current git branch.
  #[arg(long)]
  branch: Option<String>,

  /// Change-set JSON instead of asking git ("-" reads stdin).
  #[arg(long)]
  input: Option<PathBuf>,

  /// Offer a choice instead of aborting when checks fail.
  #[arg(long)]
  interactive: bool,

  /// Print a marker per task as checks complete.
  #[arg(short, long)]
  verbose: bool,

  /// Do not write a JSON run report.
  #[arg(long)]
  no_report: bool,

  /// Skip validation entirely.
  #[arg(long, env = "SKIP_VALIDATION")]
  skip_validation: bool,

  /// Debug logs and full error chains.
  #[arg(long, env = "VALIDATION_DEBUG")]
  debug: bool,
}

#[tokio::main]
async fn main() {
  let cli = Cli::parse();
  let default_level = if cli.debug { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .init();

  let code = match run_binary(cli).await {
    Ok(code) => code,
    Err(e) => {
      let _ = writeln!(io::stderr(), "validation-gate error: {}", e);
      1
    }
  };
  std::process::exit(code);
}

async fn run_binary(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
  let config = GateConfig::with_root(&cli.root);
  let bypass = BypassStore::new(config.reports_path());

  if cli.skip_validation {
    print_decision(&Decision::bypassed("SKIP_VALIDATION is set"));
    return Ok(Outcome::Bypassed.exit_code());
  }
  if let Some(marker) = bypass.active() {
    let reason = format!(
      "always-skip enabled {} ({})",
      marker.enabled_at.to_rfc3339(),
      bypass.path().display()
    );
    print_decision(&Decision::bypassed(reason));
    return Ok(Outcome::Bypassed.exit_code());
  }

  let mut changes = match &cli.input {
    Some(path) => read_change_set(path)?,
    None => GitCollector::new(&cli.root).collect().await?,
  };
  if let Some(branch) = cli.branch {
    changes.branch = branch;
  }

  let flags = RunFlags {
    interactive: cli.interactive,
    verbose: cli.verbose,
    debug: cli.debug,
  };
  let mut gate = Gate::new(config.clone()).with_prompt(TerminalPrompt::default());
  let decision = gate.run(&changes, flags).await;
  print_decision(&decision);

  if decision.outcome == Outcome::AlwaysSkip {
    if let Err(e) = bypass.enable(&changes.branch) {
      warn!(error = %e, "could not persist always-skip");
    }
  }
  if !cli.no_report {
    match report::write_report(&config.reports_path(), &RunReport::new(&changes.branch, &decision)) {
      Ok(path) => info!(path = %path.display(), "report written"),
      Err(e) => warn!(error = %e, "could not write run report"),
    }
  }

  if decision.fallback_required {
    let outcome = fallback::run_fallback(&TaskRunner::shell(), &config).await;
    return Ok(if outcome.success { 0 } else { 1 });
  }
  Ok(decision.outcome.exit_code())
}

fn read_change_set(path: &Path) -> Result<ChangeSet, Box<dyn std::error::Error>> {
  let raw = if path.as_os_str() == "-" {
    let mut raw = String::new();
    io::stdin().lock().read_to_string(&mut raw)?;
    raw
  } else {
    std::fs::read_to_string(path)?
  };
  Ok(serde_json::from_str(&raw)?)
}

fn print_decision(decision: &Decision) {
  let mut out = io::stdout().lock();
  let _ = writeln!(out, "validation: {} ({})", decision.outcome, decision.message);
  if let Some(merged) = &decision.strategy {
    let _ = writeln!(
      out,
      "  strategy {} (branch {}, risk {})",
      merged.strategy, merged.base, merged.recommended
    );
  }
  if let Some(risk) = &decision.risk_analysis {
    let _ = writeln!(
      out,
      "  risk: {} files, average {:.2}",
      risk.profile.total_files, risk.profile.average_score
    );
    for hotspot in &risk.profile.hotspots {
      let _ = writeln!(out, "    hotspot {}", hotspot);
    }
  }
  if let Some(run) = &decision.validation_result {
    for r in &run.results {
      let marker = if r.success { "✓" } else { "✗" };
      let _ = writeln!(out, "  {} {} ({}ms)", marker, r.task_name, r.duration_ms);
    }
  }
  if let Some(category) = decision.failure_category {
    let _ = writeln!(out, "  failure: {}", category);
  }
  for step in &decision.remediation {
    let _ = writeln!(out, "  → {}", step);
  }
  if let Some(e) = &decision.error {
    let _ = writeln!(out, "  error: {}", e);
  }
}

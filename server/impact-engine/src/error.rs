//! Structured error types for the impact analyzer.
//!
//! None of these escape the public analysis operations: they are logged and
//! recorded as unresolved entries instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImpactError {
  #[error("read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("resolve: {specifier} from {}", from.display())]
  Unresolved { specifier: String, from: PathBuf },
}

impl ImpactError {
  pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Read {
      path: path.into(),
      source,
    }
  }

  pub fn unresolved(specifier: &str, from: impl Into<PathBuf>) -> Self {
    Self::Unresolved {
      specifier: specifier.to_string(),
      from: from.into(),
    }
  }
}

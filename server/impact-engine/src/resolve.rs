//! Specifier resolution: aliases, relative paths, extension and index probing.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::config::Config;

/// Where a module specifier points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  /// A repository-relative source file.
  Internal(PathBuf),
  /// A package root name.
  External(String),
  /// Looked local but matched no file.
  Unresolved(String),
}

/// Resolve `specifier` as written in `from` (repository-relative).
pub fn resolve(specifier: &str, from: &Path, config: &Config) -> Resolution {
  let candidate = match local_candidate(specifier, from, config) {
    Some(c) => c,
    None if is_local_specifier(specifier, config) => {
      return Resolution::Unresolved(specifier.to_string());
    }
    None => return Resolution::External(package_root(specifier)),
  };

  match probe(&candidate, config) {
    Some(found) => Resolution::Internal(found),
    None => Resolution::Unresolved(specifier.to_string()),
  }
}

fn is_local_specifier(specifier: &str, config: &Config) -> bool {
  specifier.starts_with('.')
    || specifier.starts_with('/')
    || config.aliases.iter().any(|(prefix, _)| specifier.starts_with(prefix.as_str()))
}

/// Repository-relative path a local specifier names, before probing.
/// `None` for bare package specifiers and for paths escaping the root.
fn local_candidate(specifier: &str, from: &Path, config: &Config) -> Option<PathBuf> {
  for (prefix, target) in &config.aliases {
    if let Some(rest) = specifier.strip_prefix(prefix.as_str()) {
      return normalize(&Path::new(target).join(rest));
    }
  }
  if specifier.starts_with("./") || specifier.starts_with("../") || specifier == "." || specifier == ".." {
    let base = from.parent().unwrap_or_else(|| Path::new(""));
    return normalize(&base.join(specifier));
  }
  if let Some(rest) = specifier.strip_prefix('/') {
    return normalize(Path::new(rest));
  }
  None
}

/// Exact file, then `candidate + ext`, then `candidate/index + ext`.
fn probe(candidate: &Path, config: &Config) -> Option<PathBuf> {
  let exists = |p: &Path| config.root.join(p).is_file();

  if !candidate.as_os_str().is_empty() && exists(candidate) {
    return Some(candidate.to_path_buf());
  }
  for ext in &config.extensions {
    let mut with_ext = OsString::from(candidate.as_os_str());
    with_ext.push(ext);
    let p = PathBuf::from(with_ext);
    if exists(&p) {
      return Some(p);
    }
  }
  for ext in &config.extensions {
    let p = candidate.join(format!("{}{}", config.index_name, ext));
    if exists(&p) {
      return Some(p);
    }
  }
  None
}

/// Lexically collapse `.` and `..`. `None` if the path climbs above the root.
pub fn normalize(path: &Path) -> Option<PathBuf> {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::Normal(part) => out.push(part),
      Component::ParentDir => {
        if !out.pop() {
          return None;
        }
      }
      Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
    }
  }
  Some(out)
}

/// `@scope/pkg/sub` → `@scope/pkg`, `lodash/fp` → `lodash`, `node:fs/promises` → `node:fs`.
pub fn package_root(specifier: &str) -> String {
  let mut parts = specifier.split('/');
  let first = parts.next().unwrap_or(specifier);
  if first.starts_with('@') {
    match parts.next() {
      Some(second) => format!("{}/{}", first, second),
      None => first.to_string(),
    }
  } else {
    first.to_string()
  }
}

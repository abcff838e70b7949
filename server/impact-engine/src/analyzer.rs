//! The analyzer: direct edges, depth-capped traversal, impact scope, test discovery.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::DependencyCache;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::ImpactError;
use crate::extract;
use crate::resolve::{self, Resolution};
use crate::types::*;

/// Extensions whose contents are scanned for imports.
const SCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts"];
/// Extensions tried when deriving test file names.
const TEST_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];
/// Directories that mirror `src/` for tests.
const MIRROR_TEST_ROOTS: &[&str] = &["tests", "tests/unit", "tests/integration", "__tests__"];

/// Import-graph analyzer. Owns its edge cache; not shared between instances.
pub struct ImpactAnalyzer {
  config: Config,
  cache: DependencyCache,
}

impl ImpactAnalyzer {
  pub fn new(config: Config) -> Self {
    Self::with_clock(config, Arc::new(SystemClock))
  }

  pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Self {
    let cache = DependencyCache::new(config.cache_ttl, clock);
    Self { config, cache }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn cache(&self) -> &DependencyCache {
    &self.cache
  }

  pub fn cache_mut(&mut self) -> &mut DependencyCache {
    &mut self.cache
  }

  /// Direct edges of one file. Never fails: an unreadable file yields a
  /// single unresolved entry naming it.
  pub fn analyze_direct(&mut self, path: &Path) -> DependencyEdges {
    let Some(path) = resolve::normalize(path) else {
      return DependencyEdges {
        unresolved: vec![path.display().to_string()],
        ..DependencyEdges::default()
      };
    };
    let path = path.as_path();
    if !is_script(path) {
      return DependencyEdges::default();
    }
    if let Some(edges) = self.cache.get(path) {
      debug!(path = %path.display(), "edge cache hit");
      return edges.clone();
    }
    debug!(path = %path.display(), "edge cache miss");

    match self.read_edges(path) {
      Ok(edges) => {
        self.cache.insert(path.to_path_buf(), edges.clone());
        edges
      }
      Err(e) => {
        warn!(error = %e, "dependency extraction failed");
        DependencyEdges {
          unresolved: vec![path.display().to_string()],
          ..DependencyEdges::default()
        }
      }
    }
  }

  fn read_edges(&self, path: &Path) -> Result<DependencyEdges, ImpactError> {
    let full = self.config.root.join(path);
    let source = fs::read_to_string(&full).map_err(|e| ImpactError::read(path, e))?;

    let mut edges = DependencyEdges::default();
    for specifier in extract::extract_specifiers(&source) {
      match resolve::resolve(&specifier, path, &self.config) {
        Resolution::Internal(p) => {
          if !edges.internal.contains(&p) {
            edges.internal.push(p);
          }
        }
        Resolution::External(name) => {
          if !edges.external.contains(&name) {
            edges.external.push(name);
          }
        }
        Resolution::Unresolved(spec) => {
          debug!("{}", ImpactError::unresolved(&spec, path));
          edges.unresolved.push(spec);
        }
      }
    }
    Ok(edges)
  }

  /// Transitive internal dependencies of `path`, at most `max_depth` levels deep.
  ///
  /// Each branch carries its own ancestor set, so a file reachable along two
  /// paths is visited on both, while a file reappearing in its own ancestor
  /// chain marks a cycle and ends that branch.
  pub fn analyze_tree(&mut self, path: &Path, max_depth: usize) -> TreeAnalysis {
    let mut out = TreeAnalysis::default();
    let Some(origin) = resolve::normalize(path) else {
      return out;
    };
    let mut ancestors = HashSet::new();
    ancestors.insert(origin.clone());
    self.visit(&origin, 0, max_depth, &ancestors, &mut out);
    out
  }

  fn visit(
    &mut self,
    node: &Path,
    depth: usize,
    max_depth: usize,
    ancestors: &HashSet<PathBuf>,
    out: &mut TreeAnalysis,
  ) {
    if depth >= max_depth {
      out.depth_limited = true;
      return;
    }
    let edges = self.analyze_direct(node);
    for child in edges.internal {
      out.dependencies.insert(child.clone());
      if ancestors.contains(&child) {
        debug!(from = %node.display(), to = %child.display(), "cycle detected");
        out.has_cycle = true;
        out.cycle_nodes.insert(child);
        continue;
      }
      let mut chain = ancestors.clone();
      chain.insert(child.clone());
      self.visit(&child, depth + 1, max_depth, &chain, out);
    }
  }

  /// Union of the transitive closures of every changed file.
  pub fn impact<P: AsRef<Path>>(&mut self, changed: &[P]) -> ImpactScope {
    let mut scope = ImpactScope::default();
    let max_depth = self.config.max_depth;

    for path in changed {
      let Some(path) = resolve::normalize(path.as_ref()) else {
        continue;
      };
      scope.affected_files.insert(path.clone());
      if !is_script(&path) {
        continue;
      }

      let tree = self.analyze_tree(&path, max_depth);
      if tree.has_cycle {
        scope.circular_dependencies.insert(path.clone());
      }
      for file in std::iter::once(path).chain(tree.dependencies) {
        let edges = self.analyze_direct(&file);
        scope.external_packages.extend(edges.external);
        scope.affected_files.insert(file);
      }
    }

    scope.total_files = scope.affected_files.len();
    scope.recommendations = self.recommend(&scope);
    scope
  }

  fn recommend(&self, scope: &ImpactScope) -> Vec<ImpactRecommendation> {
    let mut out = Vec::new();
    let affected = scope.total_files;

    if affected > self.config.full_tests_threshold {
      out.push(ImpactRecommendation {
        severity: Severity::High,
        action: RecommendedAction::RunFullTests,
        message: format!("{} files affected; run the full test suite", affected),
      });
    } else if affected > self.config.related_tests_threshold {
      out.push(ImpactRecommendation {
        severity: Severity::Medium,
        action: RecommendedAction::RunRelatedTests,
        message: format!("{} files affected; run tests related to the change", affected),
      });
    }
    if !scope.circular_dependencies.is_empty() {
      out.push(ImpactRecommendation {
        severity: Severity::Medium,
        action: RecommendedAction::CheckCircularDependencies,
        message: format!(
          "Circular imports reachable from {} changed file(s); check circular dependencies",
          scope.circular_dependencies.len()
        ),
      });
    }
    if scope.external_packages.len() > self.config.external_packages_threshold {
      out.push(ImpactRecommendation {
        severity: Severity::Low,
        action: RecommendedAction::EnhancedTypeCheck,
        message: format!(
          "{} external packages involved; run an enhanced type check",
          scope.external_packages.len()
        ),
      });
    }
    out
  }

  /// Existing test files matching the changed files by name or mirrored directory.
  pub fn candidate_tests<P: AsRef<Path>>(&self, changed: &[P]) -> Vec<PathBuf> {
    let mut found = BTreeSet::new();
    for path in changed {
      let Some(path) = resolve::normalize(path.as_ref()) else {
        continue;
      };
      if is_test_file(&path) {
        if self.exists(&path) {
          found.insert(path);
        }
        continue;
      }
      if !is_script(&path) {
        continue;
      }
      for candidate in test_candidates(&path) {
        if self.exists(&candidate) {
          found.insert(candidate);
        }
      }
    }
    found.into_iter().collect()
  }

  fn exists(&self, path: &Path) -> bool {
    self.config.root.join(path).is_file()
  }
}

fn extension(path: &Path) -> Option<&str> {
  path.extension().and_then(|e| e.to_str())
}

pub fn is_script(path: &Path) -> bool {
  extension(path).is_some_and(|e| SCRIPT_EXTENSIONS.contains(&e))
}

pub fn is_test_file(path: &Path) -> bool {
  let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
  name.contains(".test.")
    || name.contains(".spec.")
    || path.components().any(|c| c.as_os_str() == "__tests__")
}

/// Conventional test locations for a source file (existence not checked).
fn test_candidates(path: &Path) -> Vec<PathBuf> {
  let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
    return Vec::new();
  };
  let parent = path.parent().unwrap_or_else(|| Path::new(""));
  let mirrored_parent = parent.strip_prefix("src").unwrap_or(parent);

  let mut out = Vec::new();
  for ext in TEST_EXTENSIONS {
    out.push(parent.join(format!("{}.test.{}", stem, ext)));
    out.push(parent.join(format!("{}.spec.{}", stem, ext)));
    out.push(parent.join("__tests__").join(format!("{}.test.{}", stem, ext)));
    for root in MIRROR_TEST_ROOTS {
      out.push(Path::new(root).join(mirrored_parent).join(format!("{}.test.{}", stem, ext)));
    }
  }
  out
}

//! Per-file edge cache with a TTL.
//!
//! Owned by one analyzer instance. Expired entries are ignored on lookup and
//! overwritten on the next insert; `evict_expired` drops them explicitly.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::types::DependencyEdges;

struct CacheEntry {
  edges: DependencyEdges,
  stored_at: Instant,
}

pub struct DependencyCache {
  entries: HashMap<PathBuf, CacheEntry>,
  ttl: Duration,
  clock: Arc<dyn Clock>,
}

impl DependencyCache {
  pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
    Self {
      entries: HashMap::new(),
      ttl,
      clock,
    }
  }

  /// Fresh edges for `path`, if any.
  pub fn get(&self, path: &Path) -> Option<&DependencyEdges> {
    let entry = self.entries.get(path)?;
    if self.is_fresh(entry) {
      Some(&entry.edges)
    } else {
      None
    }
  }

  pub fn insert(&mut self, path: PathBuf, edges: DependencyEdges) {
    let stored_at = self.clock.now();
    self.entries.insert(path, CacheEntry { edges, stored_at });
  }

  /// Drop every expired entry. Returns how many were removed.
  pub fn evict_expired(&mut self) -> usize {
    let now = self.clock.now();
    let ttl = self.ttl;
    let before = self.entries.len();
    self
      .entries
      .retain(|_, e| now.saturating_duration_since(e.stored_at) < ttl);
    before - self.entries.len()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  fn is_fresh(&self, entry: &CacheEntry) -> bool {
    self.clock.now().saturating_duration_since(entry.stored_at) < self.ttl
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clock::ManualClock;

  fn edges(name: &str) -> DependencyEdges {
    DependencyEdges {
      external: vec![name.to_string()],
      ..DependencyEdges::default()
    }
  }

  #[test]
  fn entries_expire_after_ttl() {
    let clock = Arc::new(ManualClock::new());
    let mut cache = DependencyCache::new(Duration::from_secs(300), clock.clone());
    cache.insert(PathBuf::from("src/a.ts"), edges("react"));

    clock.advance(Duration::from_secs(299));
    assert!(cache.get(Path::new("src/a.ts")).is_some());

    clock.advance(Duration::from_secs(1));
    assert!(cache.get(Path::new("src/a.ts")).is_none());
    // Still stored until overwritten or evicted.
    assert_eq!(cache.len(), 1);
  }

  #[test]
  fn insert_overwrites_stale_entry() {
    let clock = Arc::new(ManualClock::new());
    let mut cache = DependencyCache::new(Duration::from_secs(10), clock.clone());
    cache.insert(PathBuf::from("a.ts"), edges("old"));
    clock.advance(Duration::from_secs(20));
    cache.insert(PathBuf::from("a.ts"), edges("new"));
    assert_eq!(cache.get(Path::new("a.ts")).unwrap().external, vec!["new"]);
  }

  #[test]
  fn evict_expired_removes_only_stale_entries() {
    let clock = Arc::new(ManualClock::new());
    let mut cache = DependencyCache::new(Duration::from_secs(10), clock.clone());
    cache.insert(PathBuf::from("old.ts"), edges("x"));
    clock.advance(Duration::from_secs(8));
    cache.insert(PathBuf::from("new.ts"), edges("y"));
    clock.advance(Duration::from_secs(5));

    assert_eq!(cache.evict_expired(), 1);
    assert_eq!(cache.len(), 1);
    assert!(cache.get(Path::new("new.ts")).is_some());
  }
}

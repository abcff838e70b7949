//! Module-reference extraction from JS/TS source text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// `import x from 'a'`, `import 'a'`, `export { y } from 'a'`, `import type T from 'a'`.
static STATIC_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?m)^\s*(?:import|export)\s+(?:[\w$*{}\s,]+?\s+from\s+)?['"]([^'"\n]+)['"]"#)
    .expect("valid regex")
});

/// `import('a')`
static DYNAMIC_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"\bimport\(\s*['"]([^'"\n]+)['"]\s*\)"#).expect("valid regex")
});

/// `require('a')`
static REQUIRE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"\brequire\(\s*['"]([^'"\n]+)['"]\s*\)"#).expect("valid regex")
});

/// Every distinct module specifier in `source`, in order of first appearance.
pub fn extract_specifiers(source: &str) -> Vec<String> {
  let mut found: Vec<(usize, String)> = Vec::new();
  for re in [&*STATIC_IMPORT_RE, &*DYNAMIC_IMPORT_RE, &*REQUIRE_RE] {
    for caps in re.captures_iter(source) {
      if let Some(m) = caps.get(1) {
        found.push((m.start(), m.as_str().to_string()));
      }
    }
  }
  found.sort_by_key(|(pos, _)| *pos);

  let mut seen = HashSet::new();
  found
    .into_iter()
    .map(|(_, spec)| spec)
    .filter(|spec| seen.insert(spec.clone()))
    .collect()
}

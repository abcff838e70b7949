//! Static lookup tables for the four scoring factors.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::Config;

/// Weight when neither the file name nor the extension is known.
const DEFAULT_FILE_TYPE_WEIGHT: u8 = 1;
/// Weight when no directory prefix matches.
const DEFAULT_DIRECTORY_WEIGHT: u8 = 1;

/// Exact file names (lowercase). Checked before extensions.
const FILE_NAME_WEIGHTS: &[(&str, u8)] = &[
  ("package.json", 3),
  ("package-lock.json", 3),
  ("pnpm-lock.yaml", 3),
  ("yarn.lock", 3),
  ("tsconfig.json", 3),
  ("next.config.js", 3),
  ("next.config.mjs", 3),
  ("next.config.ts", 3),
  ("middleware.ts", 3),
  ("cargo.toml", 3),
  ("cargo.lock", 2),
  ("dockerfile", 2),
  ("vercel.json", 2),
  ("readme.md", 0),
  ("changelog.md", 0),
  ("license", 0),
  (".gitignore", 0),
];

/// Extensions (lowercase, no dot).
const EXTENSION_WEIGHTS: &[(&str, u8)] = &[
  ("ts", 3),
  ("tsx", 3),
  ("rs", 3),
  ("sql", 3),
  ("prisma", 3),
  ("js", 2),
  ("jsx", 2),
  ("mjs", 2),
  ("cjs", 2),
  ("yml", 2),
  ("yaml", 2),
  ("toml", 2),
  ("sh", 2),
  ("json", 1),
  ("css", 1),
  ("scss", 1),
  ("html", 1),
  ("md", 0),
  ("mdx", 0),
  ("txt", 0),
  ("png", 0),
  ("jpg", 0),
  ("jpeg", 0),
  ("gif", 0),
  ("svg", 0),
  ("ico", 0),
];

/// Path prefixes in priority order; the first match wins.
const DIRECTORY_WEIGHTS: &[(&str, u8)] = &[
  ("src/app/api/", 3),
  ("src/app/", 3),
  ("src/middleware", 3),
  ("src/lib/", 3),
  ("src/services/", 3),
  ("src/core/", 3),
  ("supabase/migrations/", 3),
  ("migrations/", 3),
  ("src/components/", 2),
  ("src/hooks/", 2),
  ("src/utils/", 2),
  ("config/", 2),
  (".github/", 2),
  ("src/", 2),
  ("scripts/", 1),
  ("tests/", 1),
  ("docs/", 0),
  ("public/", 0),
  ("readme", 0),
  ("changelog", 0),
  ("license", 0),
];

fn normalize(path: &str) -> String {
  path.trim_start_matches("./").replace('\\', "/").to_lowercase()
}

/// 0–3 from the file name, then the extension; 1 when unknown.
pub fn file_type_weight(path: &str) -> u8 {
  let p = normalize(path);
  let name = p.rsplit('/').next().unwrap_or(&p);

  if name == ".env" || name.starts_with(".env.") {
    return 3;
  }
  if let Some((_, w)) = FILE_NAME_WEIGHTS.iter().find(|(n, _)| *n == name) {
    return *w;
  }
  name
    .rsplit_once('.')
    .and_then(|(_, ext)| EXTENSION_WEIGHTS.iter().find(|(e, _)| *e == ext))
    .map(|(_, w)| *w)
    .unwrap_or(DEFAULT_FILE_TYPE_WEIGHT)
}

/// 0–3 from the first matching path prefix; 1 when nothing matches.
pub fn directory_weight(path: &str) -> u8 {
  let p = normalize(path);
  DIRECTORY_WEIGHTS
    .iter()
    .find(|(prefix, _)| p.starts_with(prefix))
    .map(|(_, w)| *w)
    .unwrap_or(DEFAULT_DIRECTORY_WEIGHT)
}

/// 0–2 from the on-disk size. Files that cannot be stat'd score 0.
pub fn file_size_weight(path: &str, config: &Config) -> u8 {
  let full = config.root.join(Path::new(path));
  match fs::metadata(&full) {
    Ok(meta) => size_band(meta.len(), config),
    Err(e) => {
      debug!(path, error = %e, "size lookup failed, scoring 0");
      0
    }
  }
}

pub fn size_band(bytes: u64, config: &Config) -> u8 {
  if bytes >= config.size_large_bytes {
    2
  } else if bytes >= config.size_medium_bytes {
    1
  } else {
    0
  }
}

/// Added plus removed lines in a unified diff. `---`/`+++` are file headers
/// only before the first hunk of each file section.
pub fn count_changed_lines(diff: &str) -> usize {
  let mut in_hunk = false;
  let mut count = 0;
  for line in diff.lines() {
    if line.starts_with("diff ") {
      in_hunk = false;
    } else if line.starts_with("@@") {
      in_hunk = true;
    } else if line.starts_with('+') || line.starts_with('-') {
      let header = line.starts_with("+++") || line.starts_with("---");
      if in_hunk || !header {
        count += 1;
      }
    }
  }
  count
}

/// 0–4 from the changed-line count.
pub fn change_volume_weight(changed_lines: usize, config: &Config) -> u8 {
  let [small, medium, large] = config.volume_bands;
  match changed_lines {
    0 => 0,
    n if n <= small => 1,
    n if n <= medium => 2,
    n if n <= large => 3,
    _ => 4,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_names_take_precedence_over_extensions() {
    assert_eq!(file_type_weight("package.json"), 3);
    assert_eq!(file_type_weight("data/fixture.json"), 1);
    assert_eq!(file_type_weight("README.md"), 0);
    assert_eq!(file_type_weight("docs/guide.md"), 0);
  }

  #[test]
  fn env_files_are_high_weight() {
    assert_eq!(file_type_weight(".env"), 3);
    assert_eq!(file_type_weight("apps/web/.env.local"), 3);
  }

  #[test]
  fn unknown_types_default_to_one() {
    assert_eq!(file_type_weight("bin/tool"), 1);
    assert_eq!(file_type_weight("assets/model.onnx"), 1);
  }

  #[test]
  fn directory_priority_is_first_match() {
    assert_eq!(directory_weight("src/app/api/users/route.ts"), 3);
    assert_eq!(directory_weight("src/components/Button.tsx"), 2);
    assert_eq!(directory_weight("src/types/index.ts"), 2);
    assert_eq!(directory_weight("./scripts/deploy.sh"), 1);
    assert_eq!(directory_weight("README.md"), 0);
    assert_eq!(directory_weight("package.json"), 1);
  }

  #[test]
  fn change_volume_bands() {
    let config = Config::default();
    assert_eq!(change_volume_weight(0, &config), 0);
    assert_eq!(change_volume_weight(10, &config), 1);
    assert_eq!(change_volume_weight(11, &config), 2);
    assert_eq!(change_volume_weight(200, &config), 3);
    assert_eq!(change_volume_weight(201, &config), 4);
  }

  #[test]
  fn diff_headers_are_not_counted() {
    let diff = "--- a/x.ts\n+++ b/x.ts\n@@ -1,2 +1,2 @@\n-old\n+new\n context\n";
    assert_eq!(count_changed_lines(diff), 2);
  }

  #[test]
  fn comment_lines_inside_hunks_are_counted() {
    let mut diff = String::from("diff --git a/m.sql b/m.sql\n--- a/m.sql\n+++ b/m.sql\n@@ -1,12 +1,12 @@\n");
    for i in 0..12 {
      diff.push_str(&format!("--- comment {}\n", i));
    }
    for i in 0..12 {
      diff.push_str(&format!("+++counter {}\n", i));
    }
    assert_eq!(count_changed_lines(&diff), 24);
    assert_eq!(change_volume_weight(count_changed_lines(&diff), &Config::default()), 2);
  }

  #[test]
  fn headers_of_later_file_sections_are_skipped() {
    let diff = "diff --git a/a b/a\n--- a/a\n+++ b/a\n@@ -1 +1 @@\n--- x\n\
                diff --git a/b b/b\n--- a/b\n+++ b/b\n@@ -1 +1 @@\n+y\n";
    assert_eq!(count_changed_lines(diff), 2);
  }

  #[test]
  fn missing_file_scores_zero_for_size() {
    let config = Config::with_root("/definitely/not/here");
    assert_eq!(file_size_weight("src/a.ts", &config), 0);
  }

  #[test]
  fn size_bands() {
    let config = Config::default();
    assert_eq!(size_band(100, &config), 0);
    assert_eq!(size_band(10 * 1024, &config), 1);
    assert_eq!(size_band(50 * 1024, &config), 2);
  }
}

//! Integration tests for the risk engine.

use std::collections::HashMap;
use std::fs;

use risk_engine::{Config, Input, RiskLevel, RiskScorer, Strategy};

fn diff_with_lines(n: usize) -> String {
  let mut d = String::from("--- a/src/app/page.tsx\n+++ b/src/app/page.tsx\n@@ -1,1 +1,250 @@\n");
  for i in 0..n {
    if i % 2 == 0 {
      d.push_str(&format!("+added {}\n", i));
    } else {
      d.push_str(&format!("-removed {}\n", i));
    }
  }
  d
}

#[test]
fn readme_only_change_recommends_fast() {
  let dir = tempfile::tempdir().unwrap();
  fs::write(dir.path().join("README.md"), "# hello\n").unwrap();

  let scorer = RiskScorer::new(Config::with_root(dir.path()));
  let scores = scorer.score_batch(&["README.md".to_string()], &HashMap::new());
  assert_eq!(scores[0].total_score, 0);
  assert_eq!(scores[0].risk_level, RiskLevel::Minimal);

  let profile = scorer.aggregate(&scores);
  assert_eq!(profile.recommendation.strategy, Strategy::Fast);
  assert!(profile.hotspots.is_empty());
}

#[test]
fn large_page_change_recommends_strict() {
  let dir = tempfile::tempdir().unwrap();
  fs::create_dir_all(dir.path().join("src/app")).unwrap();
  fs::write(dir.path().join("src/app/page.tsx"), "export default function Page() {}\n").unwrap();
  fs::write(dir.path().join("package.json"), "{}\n").unwrap();

  let mut diffs = HashMap::new();
  diffs.insert("src/app/page.tsx".to_string(), diff_with_lines(250));
  let files = vec!["package.json".to_string(), "src/app/page.tsx".to_string()];

  let scorer = RiskScorer::new(Config::with_root(dir.path()));
  let scores = scorer.score_batch(&files, &diffs);
  let page = &scores[1];
  assert_eq!(page.breakdown.file_type, 3);
  assert_eq!(page.breakdown.directory, 3);
  assert_eq!(page.breakdown.change_volume, 4);
  assert_eq!(page.breakdown.file_size, 0);
  assert_eq!(page.risk_level, RiskLevel::Critical);

  let profile = scorer.aggregate(&scores);
  assert_eq!(profile.distribution.critical, 1);
  assert_eq!(profile.recommendation.strategy, Strategy::Strict);
  assert_eq!(profile.hotspots[0], "src/app/page.tsx");
}

#[test]
fn large_files_raise_the_size_factor() {
  let dir = tempfile::tempdir().unwrap();
  fs::create_dir_all(dir.path().join("src/lib")).unwrap();
  fs::write(dir.path().join("src/lib/big.ts"), vec![b'x'; 60 * 1024]).unwrap();
  fs::write(dir.path().join("src/lib/mid.ts"), vec![b'x'; 20 * 1024]).unwrap();

  let scorer = RiskScorer::new(Config::with_root(dir.path()));
  assert_eq!(scorer.score_file("src/lib/big.ts", None).breakdown.file_size, 2);
  assert_eq!(scorer.score_file("src/lib/mid.ts", None).breakdown.file_size, 1);
  assert_eq!(scorer.score_file("src/lib/gone.ts", None).breakdown.file_size, 0);
}

#[test]
fn binary_input_contract_parses() {
  let json = r#"{
    "files_changed": ["src/app/page.tsx", "README.md"],
    "diffs": {"src/app/page.tsx": "+a\n"},
    "unknown_field": true
  }"#;
  let input: Input = serde_json::from_str(json).unwrap();
  let out = risk_engine::run(&input);
  let value = serde_json::to_value(&out).unwrap();
  assert_eq!(value["profile"]["total_files"], 2);
  assert!(value["scores"][0]["risk_level"].is_string());
  assert!(value["profile"]["distribution"]["MINIMAL"].is_number());
}

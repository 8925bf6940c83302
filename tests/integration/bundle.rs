//! Running whole bundles through the library entry points

use eventvm::util::config::InterpreterConfig;
use eventvm::{run_bundle, run_file, Bundle};
use std::fs;
use tempfile::TempDir;

const GREETING: &str = r#"{
  "program": [
    {"code": 101, "parameters": ["", 0, 0, 2]},
    {"code": 401, "parameters": ["Welcome back."]},
    {"code": 122, "parameters": [1, 1, 0, 0, 5]},
    {"code": 112},
    {"code": 122, "indent": 1, "parameters": [1, 1, 2, 0, 1]},
    {"code": 111, "indent": 1, "parameters": [1, 1, 0, 0, 0]},
    {"code": 113, "indent": 2},
    {"code": 0, "indent": 2},
    {"code": 412, "indent": 1},
    {"code": 117, "indent": 1, "parameters": [3]},
    {"code": 0, "indent": 1},
    {"code": 413}
  ],
  "commonEvents": [
    {"id": 3, "name": "count", "list": [
      {"code": 122, "parameters": [2, 2, 1, 0, 1]}
    ]}
  ]
}"#;

#[test]
fn test_run_bundle_from_json() {
    let bundle = Bundle::from_json(GREETING).unwrap();
    let report = run_bundle(&bundle, InterpreterConfig::default(), 600).unwrap();
    assert!(report.finished);
    assert_eq!(report.pages, vec!["Welcome back."]);
    assert_eq!(report.state.variables.int(1), 0);
    // The common event runs on every pass except the one that breaks out
    assert_eq!(report.state.variables.int(2), 4);
}

#[test]
fn test_run_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("greeting.json");
    fs::write(&path, GREETING).unwrap();
    let report = run_file(&path, InterpreterConfig::default(), 600).unwrap();
    assert!(report.finished);
    assert_eq!(report.pages.len(), 1);
}

#[test]
fn test_tick_budget_stops_run() {
    let bundle = Bundle::from_json(
        r#"{"program": [
            {"code": 112},
            {"code": 230, "indent": 1, "parameters": [10]},
            {"code": 0, "indent": 1},
            {"code": 413}
        ]}"#,
    )
    .unwrap();
    let report = run_bundle(&bundle, InterpreterConfig::default(), 50).unwrap();
    assert!(!report.finished);
    assert_eq!(report.ticks, 50);
}

#[test]
fn test_call_depth_overflow_is_an_error() {
    let bundle = Bundle::from_json(
        r#"{
            "program": [{"code": 117, "parameters": [1]}],
            "commonEvents": [{"id": 1, "list": [{"code": 117, "parameters": [1]}]}]
        }"#,
    )
    .unwrap();
    let config = InterpreterConfig {
        max_call_depth: 10,
        ..InterpreterConfig::default()
    };
    let err = run_bundle(&bundle, config, 100).unwrap_err();
    assert!(err.to_string().contains("10"), "{}", err);
}

#[test]
fn test_invalid_bundle() {
    assert!(Bundle::from_json("{\"program\": 3}").is_err());

    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");
    let err = run_file(&missing, InterpreterConfig::default(), 10).unwrap_err();
    assert!(format!("{:#}", err).contains("missing.json"));
}

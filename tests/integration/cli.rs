//! Integration tests for the `eventvm` binary

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn eventvm_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_eventvm"))
}

fn create_test_file(
    dir: &TempDir,
    name: &str,
    content: &str,
) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const HELLO: &str = r#"{"program": [
    {"code": 101, "parameters": ["", 0, 0, 2]},
    {"code": 401, "parameters": ["Hello,"]},
    {"code": 401, "parameters": ["world!"]}
]}"#;

#[test]
fn test_run_prints_pages() {
    let temp_dir = TempDir::new().unwrap();
    let file = create_test_file(&temp_dir, "hello.json", HELLO);

    let output = Command::new(eventvm_bin())
        .arg("run")
        .arg(&file)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end(), "Hello,\nworld!");
}

#[test]
fn test_run_with_config() {
    let temp_dir = TempDir::new().unwrap();
    let file = create_test_file(&temp_dir, "hello.json", HELLO);
    let config = create_test_file(&temp_dir, "eventvm.ron", "(fade_speed: 12, trace_commands: true)");

    let output = Command::new(eventvm_bin())
        .arg("run")
        .arg(&file)
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();

    assert!(output.status.success());
}

#[test]
fn test_check_valid_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = create_test_file(&temp_dir, "hello.json", HELLO);

    let output = Command::new(eventvm_bin())
        .arg("check")
        .arg(&file)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("program: 3 instructions"));
}

#[test]
fn test_check_invalid_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = create_test_file(
        &temp_dir,
        "broken.json",
        r#"{"program": [{"code": 413}, {"code": 9999}]}"#,
    );

    let output = Command::new(eventvm_bin())
        .arg("check")
        .arg(&file)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown code 9999"));
    assert!(stderr.contains("Repeat Above without a Loop"));
}

#[test]
fn test_dump() {
    let temp_dir = TempDir::new().unwrap();
    let file = create_test_file(&temp_dir, "hello.json", HELLO);

    let output = Command::new(eventvm_bin())
        .arg("dump")
        .arg(&file)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ShowText (101)"));
    assert!(stdout.contains("TextLine (401) [world!]"));
}

#[test]
fn test_missing_file() {
    let output = Command::new(eventvm_bin())
        .arg("run")
        .arg("does-not-exist.json")
        .output()
        .unwrap();

    assert!(!output.status.success());
}

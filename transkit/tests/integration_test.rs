use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const CONFIG: &str = r#"
[[transform]]
pattern = "\\.json$"
transformer = "json"

[[transform]]
pattern = "\\.js$"
transformer = "replace"
[transform.options]
rules = [{ pattern = "__DEV__", replacement = "false" }]
"#;

fn setup() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("transkit.toml"), CONFIG).unwrap();
    fs::write(temp_dir.path().join("data.json"), r#"{"ok": true}"#).unwrap();
    fs::write(temp_dir.path().join("index.js"), "if (__DEV__) run();\n").unwrap();
    fs::write(temp_dir.path().join("plain.css"), "a {}").unwrap();
    temp_dir
}

fn transkit(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_transkit"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute transkit")
}

#[test]
fn test_transform_json_output() {
    let temp_dir = setup();
    let output = transkit(
        temp_dir.path(),
        &["transform", "data.json", "index.js", "plain.css", "--json"],
    );
    assert!(output.status.success());

    let results: Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["transformer"], "json");
    assert_eq!(results[0]["code"], "module.exports = {\"ok\": true};\n");
    assert_eq!(results[1]["code"], "if (false) run();\n");
    assert!(results[1]["cache_key"].is_string());
    assert!(results[2]["transformer"].is_null());
    assert_eq!(results[2]["code"], "a {}");
}

#[test]
fn test_transform_esm() {
    let temp_dir = setup();
    let output = transkit(temp_dir.path(), &["transform", "data.json", "--esm", "--json"]);
    assert!(output.status.success());
    let results: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(results[0]["code"], "export default {\"ok\": true};\n");
}

#[test]
fn test_transform_missing_file_fails() {
    let temp_dir = setup();
    let output = transkit(temp_dir.path(), &["transform", "missing.js"]);
    assert!(!output.status.success());
}

#[test]
fn test_cache_key_command() {
    let temp_dir = setup();
    let first = transkit(temp_dir.path(), &["cache-key", "index.js"]);
    let second = transkit(temp_dir.path(), &["cache-key", "index.js"]);
    let covered = transkit(temp_dir.path(), &["cache-key", "index.js", "--coverage"]);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert_ne!(first.stdout, covered.stdout);

    let none = transkit(temp_dir.path(), &["cache-key", "plain.css"]);
    assert_eq!(String::from_utf8_lossy(&none.stdout).trim(), "(none)");
}

#[test]
fn test_list_command() {
    let temp_dir = TempDir::new().unwrap();
    let output = transkit(temp_dir.path(), &["list", "--json"]);
    assert!(output.status.success());
    let list: Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["json", "replace", "text"]);
}

#[test]
fn test_check_command() {
    let temp_dir = setup();
    let output = transkit(temp_dir.path(), &["check", "--json"]);
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], true);
    assert_eq!(report["transforms"], 2);
}

#[test]
fn test_check_rejects_unknown_transformer() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("transkit.toml"),
        "[[transform]]\npattern = \"\\\\.ts$\"\ntransformer = \"swc\"\n",
    )
    .unwrap();
    let output = transkit(temp_dir.path(), &["check", "--json"]);
    assert!(!output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], false);
    assert!(report["error"].as_str().unwrap().contains("swc"));
}

use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use serde_json::{Value as JsonValue, json};

fn rbshim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rbshim")).args(args).output().unwrap()
}

fn stdout_json(output: &Output) -> JsonValue {
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn binds_json_arguments() {
    let out = stdout_json(&rbshim(&["1*:", r#"[1, 2, {"k": 3}]"#]));
    assert_eq!(out["argc"], 2);
    let kinds: Vec<&str> = out["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|slot| slot["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, ["leading", "rest", "keywords"]);
    assert_eq!(out["slots"][1]["value"], json!([2]));
}

#[test]
fn block_flag_passes_a_proc() {
    let out = stdout_json(&rbshim(&["&", "--block"]));
    assert_eq!(out["slots"][0]["value"], json!({"$proc": "block"}));
}

#[test]
fn arity_error_exits_with_failure() {
    let output = rbshim(&["2", "[null]"]);
    assert!(!output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stderr).trim(),
        "ArgumentError: wrong number of arguments (given 1, expected 2)"
    );
}

#[test]
fn bad_format_exits_with_failure() {
    let output = rbshim(&["1x"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("bad scan_args format"));
}

#[test]
fn trace_goes_to_stderr() {
    let output = rbshim(&["1", "[7]", "--trace"]);
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    assert_eq!(stdout_json(&output)["argc"], 1);
    assert!(stderr.contains("[0] leading"), "{stderr}");
    assert!(stderr.contains("=> argc=1"), "{stderr}");
}

#[test]
fn verbose_reports_erased_keywords() {
    let output = rbshim(&["1:", "[1]", "--verbose"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("warning: no keyword hash passed"));
}

#[test]
fn global_lookup_uses_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("shim.json");
    std::fs::write(&config, r#"{"globals": {"record_separator": "\r\n"}}"#).unwrap();
    let out = stdout_json(&rbshim(&["--global", "rb_rs", "--config", config.to_str().unwrap()]));
    assert_eq!(out, json!({"global": "rb_rs", "variable": "$/", "value": "\r\n"}));
}

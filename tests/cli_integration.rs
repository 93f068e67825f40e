// CLI integration tests: classification, fault extraction, probe calls, selftest.
#![cfg(unix)]

use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_ocarina-bridge");
    let mut command = Command::new(exe);
    command.env("OCARINA_BRIDGE_LOG", "off");
    command
}

fn parse_json(output: &[u8]) -> Value {
    let text = std::str::from_utf8(output).expect("utf8");
    serde_json::from_str(text.trim()).expect("single json document")
}

fn run_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = cmd()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait")
}

#[test]
fn classify_reads_stdin() {
    let output = run_with_stdin(&["classify"], "Warning: w1\nError: e1\nmore e1\n");
    assert!(output.status.success());
    let value = parse_json(&output.stdout);
    assert_eq!(value["warnings"], serde_json::json!(["w1"]));
    assert_eq!(value["errors"], serde_json::json!(["e1\nmore e1"]));
}

#[test]
fn classify_reads_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("diag.txt");
    std::fs::write(&path, "Error: a\nError: b\n").expect("write");

    let output = cmd()
        .args(["classify", path.to_str().unwrap()])
        .output()
        .expect("classify");
    assert!(output.status.success());
    let value = parse_json(&output.stdout);
    assert_eq!(value["errors"], serde_json::json!(["a", "b"]));
    assert_eq!(value["warnings"], serde_json::json!([]));
}

#[test]
fn classify_missing_file_is_io_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("absent.txt");
    let output = cmd()
        .args(["classify", path.to_str().unwrap()])
        .output()
        .expect("classify");
    assert_eq!(output.status.code(), Some(4));
    let value = parse_json(&output.stderr);
    assert_eq!(value["error"]["kind"], "Io");
}

#[test]
fn extract_fault_returns_message_section() {
    let text = "Exception name: OCARINA.LOAD_ERROR\nMessage: bad thing\nhappened\nCall stack traceback locations:\n0x401a2c\n";
    let output = run_with_stdin(&["extract-fault"], text);
    assert!(output.status.success());
    let value = parse_json(&output.stdout);
    assert_eq!(value["message"], "bad thing\nhappened\n");
}

#[test]
fn probe_fault_is_reported_in_result() {
    let output = cmd()
        .args([
            "probe",
            "--call",
            "load",
            "--arg",
            "foo.aadl",
            "--stdout",
            "loading foo.aadl\n",
            "--stderr",
            "Warning: legacy syntax\nError: foo.aadl:2: parse error\n",
            "--fault",
            "cannot load foo.aadl",
        ])
        .output()
        .expect("probe");
    assert!(output.status.success());
    assert!(output.stderr.is_empty(), "native output leaked to stderr");

    let value = parse_json(&output.stdout);
    assert_eq!(value["call"], "load");
    assert_eq!(value["engine_calls"], serde_json::json!(["load foo.aadl"]));
    let result = &value["result"];
    assert!(result["value"].is_null());
    assert_eq!(result["info"], "loading foo.aadl\n");
    assert_eq!(result["warnings"], serde_json::json!(["legacy syntax"]));
    assert_eq!(
        result["errors"],
        serde_json::json!(["foo.aadl:2: parse error", "cannot load foo.aadl"])
    );
}

#[test]
fn probe_raw_writes_are_captured() {
    let output = cmd()
        .args([
            "probe",
            "--call",
            "analyze",
            "--raw",
            "--stdout",
            "raw info\n",
            "--stderr",
            "unprefixed diagnostic\n",
        ])
        .output()
        .expect("probe");
    assert!(output.status.success());
    assert!(output.stderr.is_empty());
    let result = parse_json(&output.stdout)["result"].clone();
    assert_eq!(result["value"], true);
    assert_eq!(result["info"], "raw info\n");
    assert_eq!(result["errors"], serde_json::json!(["unprefixed diagnostic"]));
}

#[test]
fn logs_outside_region_reach_real_stderr() {
    let output = cmd()
        .env("OCARINA_BRIDGE_LOG", "debug")
        .args(["probe", "--call", "status", "--stderr", "Warning: inside region\n"])
        .output()
        .expect("probe");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("entering native call"), "stderr: {stderr}");
    assert!(stderr.contains("native call finished"), "stderr: {stderr}");
    assert!(!stderr.contains("inside region"), "stderr: {stderr}");

    let result = parse_json(&output.stdout)["result"].clone();
    assert_eq!(result["warnings"], serde_json::json!(["inside region"]));
}

#[test]
fn probe_generate_rejects_unknown_backend() {
    let output = cmd()
        .args(["probe", "--call", "generate", "--arg", "polyorb_hi_rust"])
        .output()
        .expect("probe");
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let value = parse_json(&output.stderr);
    assert_eq!(value["error"]["kind"], "Usage");
    assert!(
        value["error"]["hint"]
            .as_str()
            .expect("hint")
            .contains("polyorb_hi_ada")
    );
}

#[test]
fn probe_generate_accepts_known_backend() {
    let output = cmd()
        .args(["probe", "--call", "generate", "--arg", "polyorb_hi_ada"])
        .output()
        .expect("probe");
    assert!(output.status.success());
    let value = parse_json(&output.stdout);
    assert_eq!(
        value["engine_calls"],
        serde_json::json!(["generate polyorb_hi_ada"])
    );
}

#[test]
fn selftest_passes() {
    let output = cmd().arg("selftest").output().expect("selftest");
    let value = parse_json(&output.stdout);
    assert!(output.status.success(), "selftest: {value}");
    assert_eq!(value["ok"], true);
    let checks = value["checks"].as_array().expect("checks");
    assert_eq!(checks.len(), 5);
    assert!(checks.iter().all(|check| check["ok"] == true));
}

#[test]
fn version_emits_json_when_piped() {
    let output = cmd().arg("version").output().expect("version");
    assert!(output.status.success());
    let value = parse_json(&output.stdout);
    assert_eq!(value["name"], "ocarina-bridge");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn unknown_flag_is_usage_error() {
    let output = cmd().args(["classify", "--bogus"]).output().expect("classify");
    assert_eq!(output.status.code(), Some(2));
    let value = parse_json(&output.stderr);
    assert_eq!(value["error"]["kind"], "Usage");
}

#[test]
fn color_flag_selects_pretty_or_compact_json() {
    let input = "Warning: w1\n";
    let pretty = run_with_stdin(&["--color", "always", "classify"], input);
    assert!(pretty.status.success());
    let text = String::from_utf8(pretty.stdout.clone()).expect("utf8");
    assert!(text.contains("\n  \"warnings\": [\n    \"w1\"\n  ]"), "{text}");
    assert_eq!(parse_json(&pretty.stdout)["warnings"][0], "w1");

    let compact = run_with_stdin(&["--color", "never", "classify"], input);
    assert!(compact.status.success());
    let text = String::from_utf8(compact.stdout.clone()).expect("utf8");
    assert_eq!(text.trim_end().lines().count(), 1, "{text}");
    assert_eq!(parse_json(&compact.stdout)["warnings"][0], "w1");
}

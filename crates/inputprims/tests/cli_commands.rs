#![cfg(feature = "cli")]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "inputprims-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn inputprims(args: &[&str], path: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_inputprims"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .arg(path)
        .env_remove("INPUTPRIMS_MAX_EVENT_SIZE")
        .output()
        .expect("inputprims should run")
}

#[test]
fn synth_then_inspect_json() {
    let dir = unique_temp_dir("roundtrip");
    let trace = dir.join("trace.bin");

    let output = inputprims(
        &["--format", "json", "synth", "--device", "5", "--events", "10"],
        &trace,
    );
    assert!(output.status.success(), "synth failed: {output:?}");
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("synth summary should be json");
    assert_eq!(summary["events"], 10);
    assert_eq!(summary["actions"], 2);

    let written = std::fs::metadata(&trace).expect("trace should exist").len();
    assert_eq!(summary["bytes"], written);

    let output = inputprims(&["--format", "json", "inspect"], &trace);
    assert!(output.status.success(), "inspect failed: {output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be json"))
        .collect();

    assert_eq!(events.len(), 10);
    assert!(events.iter().all(|e| e["device_id"] == 5));
    assert_eq!(events[0]["type_tag"], "DLTA");
    assert_eq!(events[0]["size_in_bytes"], 30);
    assert_eq!(events[3]["type_tag"], "ACTN");
    assert_eq!(events[3]["size_in_bytes"], 62);
    assert_eq!(events[3]["state"]["size_in_bytes"], 2);
    assert_eq!(events[3]["action"]["phase"], "started");
    assert_eq!(events[7]["action"]["phase"], "performed");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn inspect_count_limits_output() {
    let dir = unique_temp_dir("count");
    let trace = dir.join("trace.bin");
    assert!(inputprims(&["--format", "json", "synth"], &trace).status.success());

    let output = inputprims(&["--format", "json", "inspect", "--count", "3"], &trace);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 3);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn inspect_raw_echoes_trace_bytes() {
    let dir = unique_temp_dir("raw");
    let trace = dir.join("trace.bin");
    assert!(inputprims(&["--format", "json", "synth", "--events", "6"], &trace).status.success());

    let output = inputprims(&["--format", "raw", "inspect"], &trace);
    assert!(output.status.success());
    assert_eq!(output.stdout, std::fs::read(&trace).expect("trace should be readable"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn malformed_trace_returns_60() {
    let dir = unique_temp_dir("malformed");
    let trace = dir.join("bad.bin");
    let mut bytes = vec![0u8; 24];
    bytes[0..4].copy_from_slice(b"ATLD");
    bytes[4..8].copy_from_slice(&4u32.to_le_bytes());
    std::fs::write(&trace, &bytes).expect("write bad trace");

    let output = inputprims(&["--format", "json", "inspect"], &trace);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn truncated_trace_returns_60() {
    let dir = unique_temp_dir("truncated");
    let trace = dir.join("trace.bin");
    assert!(inputprims(&["--format", "json", "synth", "--events", "2"], &trace).status.success());
    let mut bytes = std::fs::read(&trace).expect("trace should be readable");
    bytes.truncate(bytes.len() - 1);
    std::fs::write(&trace, &bytes).expect("rewrite trace");

    let output = inputprims(&["--format", "json", "inspect"], &trace);
    assert_eq!(output.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn max_event_size_env_is_honored() {
    let dir = unique_temp_dir("maxsize");
    let trace = dir.join("trace.bin");
    assert!(inputprims(&["--format", "json", "synth"], &trace).status.success());

    let output = Command::new(env!("CARGO_BIN_EXE_inputprims"))
        .args(["--log-level", "error", "--format", "json", "inspect"])
        .arg(&trace)
        .env("INPUTPRIMS_MAX_EVENT_SIZE", "24")
        .output()
        .expect("inspect should run");
    assert_eq!(output.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn inspect_event_larger_than_default_queue_capacity() {
    use inputprims::event::{create_state_event, FourCC, StateBlob};

    let dir = unique_temp_dir("large");
    let trace = dir.join("large.bin");
    let blob = vec![0x5A; 5 * 1024 * 1024];
    let record = create_state_event(3, 0.0, StateBlob::new(FourCC::new(b'B', b'L', b'O', b'B'), &blob))
        .expect("large event should encode");
    std::fs::write(&trace, record.as_bytes()).expect("write large trace");

    let output = inputprims(
        &["--format", "json", "inspect", "--max-event-size", "16777216"],
        &trace,
    );
    assert!(output.status.success(), "inspect failed: {output:?}");
    let event: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("inspect output should be json");
    assert_eq!(event["size_in_bytes"], 28 + 5 * 1024 * 1024);
    assert_eq!(event["state"]["size_in_bytes"], 5 * 1024 * 1024);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_trace_returns_failure() {
    let dir = unique_temp_dir("missing");
    let output = inputprims(&["--format", "json", "inspect"], &dir.join("nope.bin"));
    assert_eq!(output.status.code(), Some(1));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_prints_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_inputprims"))
        .arg("version")
        .output()
        .expect("version should run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("inputprims {}", env!("CARGO_PKG_VERSION")));
}

//! CLI end-to-end tests

use assert_cmd::Command;
use framelink_runtime::{RecordWriter, Slot};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const DOC: &str = r#"{
    "co_code": "640064015a00",
    "co_names": ["helper", "x"],
    "co_varnames": ["a"],
    "co_freevars": [],
    "co_cellvars": [],
    "co_consts": [
        "banner",
        {"co_code": "7c00", "co_names": [], "co_varnames": ["y"],
         "co_freevars": [], "co_cellvars": [], "co_consts": []}
    ]
}"#;

fn workspace() -> (TempDir, String, String) {
    let dir = TempDir::new().unwrap();
    let doc = dir.path().join("code.json");
    fs::write(&doc, DOC).unwrap();

    let stream = RecordWriter::new()
        .init()
        .make_binding(1, Slot::Names, 0)
        .call(Slot::Names, 0, &[])
        .ret()
        .into_bytes();
    let stream_path = dir.path().join("stream.bin");
    fs::write(&stream_path, stream).unwrap();

    let doc = doc.to_str().unwrap().to_string();
    let stream = stream_path.to_str().unwrap().to_string();
    (dir, doc, stream)
}

fn framelink() -> Command {
    Command::cargo_bin("framelink").unwrap()
}

#[test]
fn test_run_processes_stream() {
    let (_dir, doc, stream) = workspace();
    framelink()
        .args(["run", &stream, "-f", &doc])
        .assert()
        .success()
        .stdout(predicate::str::contains("processed 4 records"));
}

#[test]
fn test_run_debug_traces_records() {
    let (_dir, doc, stream) = workspace();
    framelink()
        .args(["run", &stream, "-f", &doc, "-d"])
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("MAKE_BINDING"))
        .stdout(predicate::str::contains("entered frame"));
}

#[test]
fn test_run_missing_stream_fails() {
    let (_dir, doc, _stream) = workspace();
    framelink()
        .args(["run", "missing.bin", "-f", &doc])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read instruction stream"));
}

#[test]
fn test_run_reports_protocol_error() {
    let (dir, doc, _stream) = workspace();
    let bad = RecordWriter::new().raw(0xFF, &[]).into_bytes();
    let bad_path = dir.path().join("bad.bin");
    fs::write(&bad_path, bad).unwrap();

    framelink()
        .args(["run", bad_path.to_str().unwrap(), "-f", &doc])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown instruction"));
}

#[test]
fn test_run_frame_env_var() {
    let (_dir, doc, stream) = workspace();
    framelink()
        .args(["run", &stream])
        .env("FRAMELINK_FRAME", &doc)
        .assert()
        .success();
}

#[test]
fn test_inspect_prints_tree() {
    let (_dir, doc, _stream) = workspace();
    framelink()
        .args(["inspect", &doc])
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("names: [null, null]"))
        .stdout(predicate::str::contains("consts:"));
}

#[test]
fn test_encode_writes_payload_file() {
    let (dir, doc, _stream) = workspace();
    let out = dir.path().join("output.bin");

    framelink()
        .args(["encode", &doc, "-o", out.to_str().unwrap()])
        .assert()
        .success();

    let bytes = fs::read(&out).unwrap();
    assert_eq!(bytes[0], 0x1D);
    // instruction bytes follow the opening separator
    assert_eq!(&bytes[1..7], &[0x64, 0x00, 0x64, 0x01, 0x5A, 0x00]);
}

#[test]
fn test_encode_hex_dump_to_stdout() {
    let (_dir, doc, _stream) = workspace();
    framelink()
        .args(["encode", &doc])
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Payload generated:"))
        .stdout(predicate::str::contains("1d 64 00 64 01 5a 00 1d"));
}

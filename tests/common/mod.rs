//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Helper to get an spcgen command isolated from user config and env
pub fn spcgen(tmp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("spcgen"));
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".config"))
        .env_remove("SPCGEN_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to run a command and parse its stdout as JSON
pub fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Helper to generate a seeded dataset as JSON records
pub fn generate_json(tmp: &TempDir, count: usize, seed: u64) -> Vec<Value> {
    let count = count.to_string();
    let seed = seed.to_string();
    let value = json_output(spcgen(tmp).args([
        "generate",
        "--count",
        count.as_str(),
        "--seed",
        seed.as_str(),
        "--lot-date",
        "2025-06-01",
        "--format",
        "json",
    ]));
    value.as_array().cloned().unwrap_or_default()
}

/// Helper to write a file into the temp directory and return its path as a string
pub fn write_file(tmp: &TempDir, name: &str, content: &str) -> String {
    let path = tmp.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().to_string()
}

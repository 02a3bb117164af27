//! Smoke tests for the iv CLI.
//!
//! These tests verify basic CLI functionality:
//! - `iv --version` outputs version info
//! - `iv --help` outputs help text
//! - `iv` (no args) prints usage and fails

mod common;

use assert_cmd::Command;
use common::TestEnv;
use predicates::prelude::*;

/// Get a Command for the iv binary.
fn iv() -> Command {
    Command::new(env!("CARGO_BIN_EXE_iv"))
}

#[test]
fn test_version_flag() {
    iv().arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("iv"))
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_flag() {
    iv().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("Options:"));
}

#[test]
fn test_help_flag_short() {
    iv().arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_no_args_prints_usage() {
    iv().assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_unknown_subcommand_fails() {
    iv().arg("frobnicate").assert().failure();
}

#[test]
fn test_empty_vault_lists_nothing() {
    let env = TestEnv::new();

    env.iv()
        .args(["idea", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\":0"));

    // Reads never create the document
    assert!(!env.document_path().exists());
}

#[test]
fn test_long_version_includes_build_info() {
    iv().arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("built "));
}

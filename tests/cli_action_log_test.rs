//! Integration tests for action logging functionality.
//!
//! These tests verify that action logging works correctly through the CLI:
//! - Commands are logged to action.log
//! - Logging can be disabled via config
//! - Log entries have correct structure

mod common;

use common::TestEnv;
use std::fs;

/// Read the action log file contents.
fn read_action_log(env: &TestEnv) -> String {
    let log_path = env.data_path().join("action.log");
    if log_path.exists() {
        fs::read_to_string(&log_path).unwrap_or_default()
    } else {
        String::new()
    }
}

fn entries(env: &TestEnv) -> Vec<serde_json::Value> {
    read_action_log(env)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_action_logging_creates_log_file() {
    let env = TestEnv::new();

    env.iv().args(["idea", "create", "Test idea"]).assert().success();

    let log_path = env.data_path().join("action.log");
    assert!(log_path.exists(), "action.log should exist after command");
    assert!(read_action_log(&env).contains("idea create"));
}

#[test]
fn test_action_logging_logs_multiple_commands() {
    let env = TestEnv::new();

    env.iv().args(["collection", "create", "C"]).assert().success();
    env.iv().args(["idea", "list"]).assert().success();
    env.iv().args(["view", "mindmap"]).assert().success();

    let commands: Vec<String> = entries(&env)
        .iter()
        .map(|e| e["command"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(commands, vec!["collection create", "idea list", "view"]);
}

#[test]
fn test_action_log_entry_structure() {
    let env = TestEnv::new();

    env.iv().args(["idea", "create", "Structured"]).assert().success();

    let entry = &entries(&env)[0];
    assert!(entry["timestamp"].is_string());
    assert_eq!(entry["document"], "idea_vault.json");
    assert_eq!(entry["args"]["title"], "Structured");
    assert_eq!(entry["success"], true);
    assert!(entry.get("error").is_none());
    assert!(entry["duration_ms"].is_u64());
    assert!(entry["user"].is_string());
}

#[test]
fn test_action_log_records_failures() {
    let env = TestEnv::new();

    env.iv().args(["idea", "show", "missing"]).assert().failure();

    let entry = &entries(&env)[0];
    assert_eq!(entry["command"], "idea show");
    assert_eq!(entry["success"], false);
    assert!(entry["error"].as_str().unwrap().contains("missing"));
}

#[test]
fn test_action_log_disabled_by_config() {
    let env = TestEnv::new();
    env.write_config("action-log #false\n");

    env.iv().args(["idea", "create", "Quiet"]).assert().success();

    assert!(!env.data_path().join("action.log").exists());
}

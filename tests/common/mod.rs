//! Common test utilities for ideavault integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's `~/.local/share/ideavault/` or `~/.config/ideavault/`.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
pub use tempfile::TempDir;

/// A test environment with isolated data and config directories.
///
/// The `iv()` method returns a `Command` that sets `IV_DATA_DIR` and
/// `IV_CONFIG_DIR` per invocation, making tests parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the iv binary with isolated directories.
    pub fn iv(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_iv"));
        cmd.current_dir(self.data_dir.path());
        cmd.env("IV_DATA_DIR", self.data_dir.path());
        cmd.env("IV_CONFIG_DIR", self.config_dir.path());
        for var in ["IV_STORE", "IV_ENDPOINT", "IV_DOCUMENT_KEY", "IV_LOG"] {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Run `iv` with `args`, assert success and parse stdout as JSON.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self.iv().args(args).assert().success().get_output().clone();
        serde_json::from_slice(&output.stdout).unwrap()
    }

    /// Create an idea and return its id.
    pub fn create_idea(&self, title: &str, extra: &[&str]) -> String {
        let mut args = vec!["idea", "create", title];
        args.extend_from_slice(extra);
        self.json(&args)["id"].as_str().unwrap().to_string()
    }

    /// Create a collection and return its id.
    pub fn create_collection(&self, name: &str) -> String {
        self.json(&["collection", "create", name])["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Write config.kdl.
    pub fn write_config(&self, kdl: &str) {
        std::fs::write(self.config_dir.path().join("config.kdl"), kdl).unwrap();
    }

    /// Path of the default vault document.
    pub fn document_path(&self) -> std::path::PathBuf {
        self.data_dir.path().join("idea_vault.json")
    }

    /// Parse the stored vault document.
    pub fn document(&self) -> Value {
        let raw = std::fs::read_to_string(self.document_path()).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    /// Get the path to the data directory.
    pub fn data_path(&self) -> &std::path::Path {
        self.data_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

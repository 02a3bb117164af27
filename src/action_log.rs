//! Action logging for `iv` commands.
//!
//! Every invocation appends one JSON line to `<data-dir>/action.log`. Logging
//! is best effort: a failure to write is reported as a warning and never fails
//! the command.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the action log inside the data directory.
pub const ACTION_LOG_FILE: &str = "action.log";

const MAX_STRING_CHARS: usize = 100;
const MAX_ARRAY_ITEMS: usize = 10;

/// Represents a single action log entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionLog {
    /// ISO 8601 timestamp when the action occurred
    pub timestamp: DateTime<Utc>,

    /// Key of the vault document the command ran against
    pub document: String,

    /// Command name (e.g., "idea create", "view")
    pub command: String,

    /// Command arguments as JSON
    pub args: Value,

    /// Whether the command succeeded
    pub success: bool,

    /// Error message if the command failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Command execution duration in milliseconds
    pub duration_ms: u64,

    /// User who executed the command
    pub user: String,
}

/// Where and whether to record actions.
#[derive(Debug, Clone)]
pub struct ActionLogger {
    path: PathBuf,
    enabled: bool,
}

impl ActionLogger {
    /// Logger writing to `<data_dir>/action.log`.
    pub fn new(data_dir: &Path, enabled: bool) -> Self {
        Self {
            path: data_dir.join(ACTION_LOG_FILE),
            enabled,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record one command. Never fails.
    pub fn log(
        &self,
        document: &str,
        command: &str,
        args: Value,
        error: Option<String>,
        duration_ms: u64,
    ) {
        if !self.enabled {
            return;
        }

        let entry = ActionLog {
            timestamp: Utc::now(),
            document: document.to_string(),
            command: command.to_string(),
            args: sanitize_args(&args),
            success: error.is_none(),
            error,
            duration_ms,
            user: get_current_user(),
        };

        if let Err(e) = write_log_entry(&self.path, &entry) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write action log");
        }
    }
}

/// Write a log entry to the log file.
fn write_log_entry(path: &Path, entry: &ActionLog) -> crate::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string(entry)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", json)?;

    Ok(())
}

/// Sanitize arguments before they are written.
///
/// Secret-looking keys are redacted, paths are reduced to their basename,
/// long strings are truncated and large arrays are summarised.
fn sanitize_args(args: &Value) -> Value {
    match args {
        Value::Object(map) => {
            let mut sanitized = serde_json::Map::new();
            for (key, value) in map {
                let key_lower = key.to_lowercase();
                if key_lower.contains("password")
                    || key_lower.contains("token")
                    || key_lower.contains("secret")
                    || key_lower.contains("auth")
                {
                    sanitized.insert(key.clone(), Value::String("[REDACTED]".to_string()));
                } else {
                    sanitized.insert(key.clone(), sanitize_args(value));
                }
            }
            Value::Object(sanitized)
        }
        Value::Array(arr) if arr.len() > MAX_ARRAY_ITEMS => {
            Value::String(format!("[Array with {} items]", arr.len()))
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sanitize_args).collect()),
        Value::String(s) => {
            // URLs keep their shape; anything else with a separator is a path
            let base = if !s.contains("://") && (s.contains('/') || s.contains('\\')) {
                s.rsplit(['/', '\\']).next().unwrap_or(s)
            } else {
                s.as_str()
            };

            let chars = base.chars().count();
            if chars > MAX_STRING_CHARS {
                let head: String = base.chars().take(MAX_STRING_CHARS - 3).collect();
                Value::String(format!("{}... ({} chars)", head, chars))
            } else {
                Value::String(base.to_string())
            }
        }
        _ => args.clone(),
    }
}

/// Get the current user's username.
fn get_current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

//! KDL schema for config.kdl.
//!
//! This module provides:
//! - The Rust struct representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::storage::{BackendType, validate_key};

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// store "file"                       // "file", "http" or "memory"
/// data-dir "/home/me/vault"
/// endpoint "http://127.0.0.1:8001"
/// document-key "idea_vault.json"
/// output-format "human"              // or "json"
/// action-log #false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultConfig {
    /// Storage backend
    pub store: Option<BackendType>,

    /// Directory used by the file backend and the action log
    pub data_dir: Option<PathBuf>,

    /// Base URL of the storage server for the http backend
    pub endpoint: Option<String>,

    /// Key of the vault document
    pub document_key: Option<String>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Whether commands are recorded in the action log
    pub action_log: Option<bool>,
}

impl VaultConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref key) = self.document_key {
            validate_key(key).map_err(|e| format!("document-key: {}", e))?;
        }
        if let Some(ref endpoint) = self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(format!(
                    "endpoint must start with http:// or https://, got {}",
                    endpoint
                ));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Unknown nodes are ignored. A known node with a value of the wrong type
    /// or an unrecognised store/format name is an error.
    pub fn from_kdl(doc: &KdlDocument) -> Result<Self, String> {
        let mut config = Self::new();

        if let Some(s) = string_value(doc, "store")? {
            config.store = Some(
                BackendType::from_str(&s).ok_or_else(|| format!("unknown store: {}", s))?,
            );
        }

        config.data_dir = string_value(doc, "data-dir")?.map(PathBuf::from);
        config.endpoint = string_value(doc, "endpoint")?;
        config.document_key = string_value(doc, "document-key")?;

        if let Some(s) = string_value(doc, "output-format")? {
            config.output_format = Some(
                OutputFormat::parse(&s).ok_or_else(|| format!("unknown output-format: {}", s))?,
            );
        }

        if let Some(node) = doc.get("action-log") {
            if let Some(entry) = node.entries().first() {
                match entry.value().as_bool() {
                    Some(b) => config.action_log = Some(b),
                    None => return Err("action-log must be #true or #false".to_string()),
                }
            }
        }

        Ok(config)
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(store) = self.store {
            push_string(&mut doc, "store", store.as_str());
        }
        if let Some(ref dir) = self.data_dir {
            push_string(&mut doc, "data-dir", &dir.to_string_lossy());
        }
        if let Some(ref endpoint) = self.endpoint {
            push_string(&mut doc, "endpoint", endpoint);
        }
        if let Some(ref key) = self.document_key {
            push_string(&mut doc, "document-key", key);
        }
        if let Some(ref format) = self.output_format {
            push_string(&mut doc, "output-format", format.as_str());
        }
        if let Some(enabled) = self.action_log {
            let mut node = KdlNode::new("action-log");
            node.push(KdlEntry::new(KdlValue::Bool(enabled)));
            doc.nodes_mut().push(node);
        }

        doc
    }
}

/// First argument of node `name` as a string.
fn string_value(doc: &KdlDocument, name: &str) -> Result<Option<String>, String> {
    let Some(entry) = doc.get(name).and_then(|node| node.entries().first()) else {
        return Ok(None);
    };
    match entry.value().as_string() {
        Some(s) => Ok(Some(s.to_string())),
        None => Err(format!("{} must be a string", name)),
    }
}

fn push_string(doc: &mut KdlDocument, name: &str, value: &str) {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(KdlValue::String(value.to_string())));
    doc.nodes_mut().push(node);
}

//! Command implementations for the `iv` CLI.
//!
//! Each command opens the vault described by the resolved configuration,
//! runs one operation and returns a result implementing [`Output`].
//! Commands are organized by entity type:
//! - `idea` - Idea CRUD and graph queries
//! - `collection` - Collection CRUD
//! - `view` - The grid, list, collections and mind-map projections
//! - `doctor` / `config_show` (this module) - Maintenance and diagnostics

pub mod collection;
pub mod idea;
pub mod view;

pub use collection::*;
pub use idea::*;
pub use view::*;

use serde::Serialize;

use crate::config::ResolvedConfig;
use crate::integrity::{self, IntegrityIssue};
use crate::models::Idea;
use crate::session::Vault;
use crate::storage::{DocumentClient, open_backend};
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Serialize any result for JSON output.
pub(crate) fn json_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
}

/// Open the vault for reading.
///
/// A store that cannot be reached yields an empty vault; the failure is logged.
pub fn open_vault(config: &ResolvedConfig) -> Result<Vault> {
    let backend = open_backend(config.store(), config.data_dir(), config.endpoint());
    Vault::open(DocumentClient::new(backend), config.document_key())
}

/// Open the vault for a mutation.
///
/// Unlike [`open_vault`], a store that could not be read is an error here:
/// saving the empty fallback would overwrite the stored vault.
pub fn open_vault_for_write(config: &ResolvedConfig) -> Result<Vault> {
    let vault = open_vault(config)?;
    if let Some(warning) = vault.load_warning() {
        return Err(Error::StoreUnavailable(format!(
            "refusing to modify a vault that could not be loaded: {}",
            warning
        )));
    }
    Ok(vault)
}

/// A short reference to an idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdeaRef {
    pub id: String,
    pub title: String,
}

impl From<&Idea> for IdeaRef {
    fn from(idea: &Idea) -> Self {
        Self {
            id: idea.id.clone(),
            title: idea.title.clone(),
        }
    }
}

// === Doctor ===

#[derive(Serialize)]
pub struct DoctorResult {
    pub ok: bool,
    pub issues: Vec<IntegrityIssue>,
    pub repaired: Vec<IntegrityIssue>,
    /// Ideas whose legacy parent field was migrated on load
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub migrated: Vec<String>,
    pub ideas: usize,
    pub collections: usize,
}

impl Output for DoctorResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{} ideas, {} collections",
            self.ideas, self.collections
        )];
        if !self.migrated.is_empty() {
            lines.push(format!(
                "Migrated legacy parent field on {} idea(s)",
                self.migrated.len()
            ));
        }
        for issue in &self.repaired {
            lines.push(format!("  fixed: {}", issue.describe()));
        }
        for issue in &self.issues {
            lines.push(format!("  issue: {}", issue.describe()));
        }
        if self.ok {
            lines.push("No issues found.".to_string());
        } else {
            lines.push(format!("{} issue(s) remain.", self.issues.len()));
        }
        lines.join("\n")
    }
}

/// Check the vault, and repair it when `fix` is set.
///
/// Without `fix` nothing is written, even for a migrated legacy document.
pub fn doctor(config: &ResolvedConfig, fix: bool) -> Result<DoctorResult> {
    let (report, vault) = if fix {
        let mut vault = open_vault_for_write(config)?;
        let report = vault.repair().into_result()?;
        // A migrated document is worth persisting even if nothing else changed
        if vault.is_dirty() {
            vault.save()?;
        }
        (report, vault)
    } else {
        let vault = open_vault(config)?;
        (integrity::check(vault.graph()), vault)
    };

    Ok(DoctorResult {
        ok: report.is_clean(),
        issues: report.issues,
        repaired: report.repaired,
        migrated: vault.migration().migrated.clone(),
        ideas: vault.graph().ideas().len(),
        collections: vault.graph().collections().len(),
    })
}

// === Config ===

#[derive(Serialize)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub value: String,
    pub source: String,
}

#[derive(Serialize)]
pub struct ConfigShow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
    pub settings: Vec<ConfigEntry>,
}

impl Output for ConfigShow {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        match self.config_file {
            Some(ref path) => lines.push(format!("Config file: {}", path)),
            None => lines.push("Config file: (none)".to_string()),
        }
        for entry in &self.settings {
            lines.push(format!(
                "  {:<14} {}  ({})",
                entry.key, entry.value, entry.source
            ));
        }
        lines.join("\n")
    }
}

/// Report the resolved configuration.
pub fn config_show(config: &ResolvedConfig) -> ConfigShow {
    let entry = |key, value: String, source: &crate::config::ValueSource| ConfigEntry {
        key,
        value,
        source: source.to_string(),
    };

    ConfigShow {
        config_file: config
            .config_file
            .as_ref()
            .map(|p| p.display().to_string()),
        settings: vec![
            entry("store", config.store().to_string(), &config.store.source),
            entry(
                "data-dir",
                config.data_dir().display().to_string(),
                &config.data_dir.source,
            ),
            entry(
                "endpoint",
                config.endpoint().to_string(),
                &config.endpoint.source,
            ),
            entry(
                "document-key",
                config.document_key().to_string(),
                &config.document_key.source,
            ),
            entry(
                "output-format",
                config.output_format().to_string(),
                &config.output_format.source,
            ),
            entry(
                "action-log",
                config.action_log_enabled().to_string(),
                &config.action_log.source,
            ),
        ],
    }
}

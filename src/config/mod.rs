//! Configuration for Idea Vault.
//!
//! ## config.kdl - User preferences
//!
//! Located at `~/.config/ideavault/config.kdl`, or `$IV_CONFIG_DIR/config.kdl`
//! when `IV_CONFIG_DIR` is set.
//!
//! Contains:
//! - `store` - "file", "http" or "memory"
//! - `data-dir` - Directory for the file backend and the action log
//! - `endpoint` - Storage server base URL for the http backend
//! - `document-key` - Name of the vault document
//! - `output-format` - "json" or "human"
//! - `action-log` - `#true`/`#false`
//!
//! ## Precedence
//!
//! CLI flag > environment variable > config.kdl > defaults
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, Resolved, ResolvedConfig, ValueSource, resolve_config, resolve_config_with,
};
pub use schema::{OutputFormat, VaultConfig};

use crate::{Error, Result};
use kdl::KdlDocument;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "IV_CONFIG_DIR";

/// Path of config.kdl.
pub fn config_path() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir).join("config.kdl"));
        }
    }
    let config_dir = dirs::config_dir()
        .ok_or_else(|| Error::Other("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("ideavault").join("config.kdl"))
}

/// Read and validate config.kdl at `path`. A missing file is an empty config.
pub fn load_config_file(path: &Path) -> Result<VaultConfig> {
    if !path.exists() {
        return Ok(VaultConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let doc: KdlDocument = content
        .parse()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    let config = VaultConfig::from_kdl(&doc)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    config
        .validate()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_config_is_default() {
        let dir = TempDir::new().unwrap();
        let config = load_config_file(&dir.path().join("config.kdl")).unwrap();
        assert_eq!(config, VaultConfig::default());
    }

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.kdl");
        let config = VaultConfig {
            document_key: Some("mine.json".to_string()),
            action_log: Some(false),
            ..VaultConfig::default()
        };
        std::fs::write(&path, config.to_kdl().to_string()).unwrap();

        assert_eq!(load_config_file(&path).unwrap(), config);
    }

    #[test]
    fn test_load_invalid_config_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.kdl");
        std::fs::write(&path, "document-key \"notes.txt\"\n").unwrap();

        assert!(matches!(load_config_file(&path), Err(Error::Config(_))));

        std::fs::write(&path, "store {{{").unwrap();
        assert!(matches!(load_config_file(&path), Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn test_config_path_env_override() {
        let dir = TempDir::new().unwrap();
        // SAFETY: serialised with every other env-mutating test
        unsafe {
            std::env::set_var(CONFIG_DIR_ENV, dir.path());
        }
        let path = config_path().unwrap();
        unsafe {
            std::env::remove_var(CONFIG_DIR_ENV);
        }

        assert_eq!(path, dir.path().join("config.kdl"));
    }
}

//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`IV_STORE`, `IV_DATA_DIR`, `IV_ENDPOINT`, `IV_DOCUMENT_KEY`)
//! 3. config.kdl (`~/.config/ideavault/config.kdl`)
//! 4. Built-in defaults

use std::path::PathBuf;

use crate::config::{OutputFormat, VaultConfig, config_path, load_config_file};
use crate::storage::{BackendType, DEFAULT_DOCUMENT_KEY, DEFAULT_ENDPOINT, default_data_dir};
use crate::{Error, Result};

pub const STORE_ENV: &str = "IV_STORE";
pub const DATA_DIR_ENV: &str = "IV_DATA_DIR";
pub const ENDPOINT_ENV: &str = "IV_ENDPOINT";
pub const DOCUMENT_KEY_ENV: &str = "IV_DOCUMENT_KEY";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from config.kdl
    ConfigFile,
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::ConfigFile => write!(f, "config"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub store: Resolved<BackendType>,
    pub data_dir: Resolved<PathBuf>,
    pub endpoint: Resolved<String>,
    pub document_key: Resolved<String>,
    pub output_format: Resolved<OutputFormat>,
    pub action_log: Resolved<bool>,
    /// The config file that was consulted, if it exists
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    pub fn store(&self) -> BackendType {
        self.store.value
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir.value
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint.value
    }

    pub fn document_key(&self) -> &str {
        &self.document_key.value
    }

    pub fn output_format(&self) -> &OutputFormat {
        &self.output_format.value
    }

    pub fn action_log_enabled(&self) -> bool {
        self.action_log.value
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub store: Option<BackendType>,
    pub data_dir: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub document_key: Option<String>,
    pub output_format: Option<OutputFormat>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, store: BackendType) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_document_key(mut self, key: impl Into<String>) -> Self {
        self.document_key = Some(key.into());
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }
}

/// Resolve configuration from the CLI, the process environment and config.kdl.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let path = config_path()?;
    let file = load_config_file(&path)?;

    let mut resolved = resolve_config_with(&file, |name| std::env::var(name).ok(), overrides)?;
    if path.exists() {
        resolved.config_file = Some(path);
    }
    Ok(resolved)
}

/// Resolve configuration from explicit inputs.
///
/// `env` looks up an environment variable; empty values count as unset.
pub fn resolve_config_with<F>(
    file: &VaultConfig,
    env: F,
    overrides: &ConfigOverrides,
) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| env(name).filter(|v| !v.is_empty());
    let from_env = |name: &str| ValueSource::EnvVar(name.to_string());

    let store = if let Some(store) = overrides.store {
        Resolved::new(store, ValueSource::CliFlag)
    } else if let Some(raw) = lookup(STORE_ENV) {
        let store = BackendType::from_str(&raw)
            .ok_or_else(|| Error::Config(format!("{}: unknown store: {}", STORE_ENV, raw)))?;
        Resolved::new(store, from_env(STORE_ENV))
    } else if let Some(store) = file.store {
        Resolved::new(store, ValueSource::ConfigFile)
    } else {
        Resolved::new(BackendType::File, ValueSource::Default)
    };

    let data_dir = if let Some(ref dir) = overrides.data_dir {
        Resolved::new(dir.clone(), ValueSource::CliFlag)
    } else if let Some(dir) = lookup(DATA_DIR_ENV) {
        Resolved::new(PathBuf::from(dir), from_env(DATA_DIR_ENV))
    } else if let Some(ref dir) = file.data_dir {
        Resolved::new(dir.clone(), ValueSource::ConfigFile)
    } else {
        Resolved::new(default_data_dir()?, ValueSource::Default)
    };

    let endpoint = pick(
        overrides.endpoint.clone(),
        lookup(ENDPOINT_ENV).map(|v| (v, from_env(ENDPOINT_ENV))),
        file.endpoint.clone(),
        DEFAULT_ENDPOINT.to_string(),
    );

    let document_key = pick(
        overrides.document_key.clone(),
        lookup(DOCUMENT_KEY_ENV).map(|v| (v, from_env(DOCUMENT_KEY_ENV))),
        file.document_key.clone(),
        DEFAULT_DOCUMENT_KEY.to_string(),
    );
    crate::storage::validate_key(&document_key.value)?;

    let output_format = pick(
        overrides.output_format.clone(),
        None,
        file.output_format.clone(),
        OutputFormat::Json,
    );

    let action_log = match file.action_log {
        Some(enabled) => Resolved::new(enabled, ValueSource::ConfigFile),
        None => Resolved::new(true, ValueSource::Default),
    };

    Ok(ResolvedConfig {
        store,
        data_dir,
        endpoint,
        document_key,
        output_format,
        action_log,
        config_file: None,
    })
}

/// First present value in precedence order.
fn pick<T>(
    cli: Option<T>,
    env: Option<(T, ValueSource)>,
    file: Option<T>,
    default: T,
) -> Resolved<T> {
    if let Some(value) = cli {
        Resolved::new(value, ValueSource::CliFlag)
    } else if let Some((value, source)) = env {
        Resolved::new(value, source)
    } else if let Some(value) = file {
        Resolved::new(value, ValueSource::ConfigFile)
    } else {
        Resolved::new(default, ValueSource::Default)
    }
}

//! Storage layer for Idea Vault documents.
//!
//! The whole vault (ideas and collections) is one JSON document stored under
//! a key such as `idea_vault.json`. Every save rewrites the entire document;
//! there is no partial update and no concurrency token, so the last writer wins.
//!
//! ## Storage Backends
//!
//! - **File backend** (default): `<data-dir>/<key>`, where the data dir is
//!   `~/.local/share/ideavault/` unless `IV_DATA_DIR` is set
//! - **HTTP backend**: a storage server at `{endpoint}/api/storage/{key}`
//! - **Memory backend**: process-local, nothing survives the process

pub mod backend;
pub mod file;
pub mod http;
pub mod memory;

pub use backend::{BackendType, DocumentBackend};
pub use file::FileBackend;
pub use http::HttpBackend;
pub use memory::MemoryBackend;

use crate::models::VaultDocument;
use crate::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key used when none is configured.
pub const DEFAULT_DOCUMENT_KEY: &str = "idea_vault.json";

/// Base URL used by the HTTP backend when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8001";

/// Check that `key` names a plain JSON file.
///
/// Keys must end in `.json` and may not contain `..`, `/` or `\`, so a key
/// can never escape the storage directory.
pub fn validate_key(key: &str) -> Result<()> {
    if key.contains("..") || key.contains('/') || key.contains('\\') {
        return Err(Error::InvalidKey(format!(
            "{} (path separators and '..' are not allowed)",
            key
        )));
    }
    if !key.ends_with(".json") || key.len() == ".json".len() {
        return Err(Error::InvalidKey(format!("{} (must be a .json file name)", key)));
    }
    Ok(())
}

/// Get the default data directory, `<data_dir>/ideavault`.
///
/// `IV_DATA_DIR`, the config file and `--data-dir` take precedence; see
/// [`crate::config::resolve_config`].
pub fn default_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("ideavault"))
}

/// Create a backend of the given type.
pub fn open_backend(
    backend_type: BackendType,
    data_dir: &Path,
    endpoint: &str,
) -> Box<dyn DocumentBackend> {
    match backend_type {
        BackendType::File => Box::new(FileBackend::new(data_dir)),
        BackendType::Http => Box::new(HttpBackend::new(endpoint)),
        BackendType::Memory => Box::new(MemoryBackend::new()),
    }
}

/// A document fetched by [`DocumentClient::load`].
#[derive(Debug)]
pub struct Loaded {
    pub document: VaultDocument,
    /// Set when the store could not be reached and `document` is the empty default
    pub degraded: Option<Error>,
}

/// Loads and saves whole vault documents through a backend.
pub struct DocumentClient {
    backend: Box<dyn DocumentBackend>,
}

impl DocumentClient {
    pub fn new(backend: Box<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    /// Load the document stored under `key`.
    ///
    /// A missing document, or the endpoint's `[]` marker, loads as the empty
    /// default. If the store cannot be reached the empty default is returned
    /// with the failure in `degraded`. A stored document that is not valid
    /// vault JSON is an error: saving an empty vault over it would destroy data.
    pub fn load(&self, key: &str) -> Result<Loaded> {
        validate_key(key)?;

        let raw = match self.backend.read(key) {
            Ok(raw) => raw,
            Err(e @ Error::Json(_)) => return Err(e),
            Err(e) => {
                warn!(key, error = %e, "store unavailable, starting from an empty vault");
                return Ok(Loaded {
                    document: VaultDocument::default(),
                    degraded: Some(e),
                });
            }
        };

        let document = match raw {
            None | Some(Value::Null) => VaultDocument::default(),
            Some(Value::Array(ref items)) if items.is_empty() => VaultDocument::default(),
            Some(value) => serde_json::from_value(value)?,
        };

        debug!(
            key,
            ideas = document.ideas.len(),
            collections = document.collections.len(),
            "loaded document"
        );
        Ok(Loaded {
            document,
            degraded: None,
        })
    }

    /// Overwrite the document stored under `key`.
    pub fn save(&self, key: &str, document: &VaultDocument) -> Result<()> {
        validate_key(key)?;
        let value = serde_json::to_value(document)?;
        self.backend.write(key, &value)?;
        debug!(key, ideas = document.ideas.len(), "saved document");
        Ok(())
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    pub fn backend_type(&self) -> BackendType {
        self.backend.backend_type()
    }
}

//! Storage backend trait.
//!
//! A backend persists whole JSON documents under a key:
//! - `FileBackend` - one file per key in the data directory (default)
//! - `HttpBackend` - the remote `/api/storage/{key}` endpoint
//! - `MemoryBackend` - in-process map, for tests and scratch sessions

use crate::Result;
use serde_json::Value;

/// Trait for storage backends that handle raw document persistence.
///
/// Keys are validated by the caller before they reach a backend.
pub trait DocumentBackend: Send + Sync {
    /// Read the document stored under `key`, or `None` when nothing is stored.
    fn read(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the document stored under `key`.
    fn write(&self, key: &str, document: &Value) -> Result<()>;

    /// Get the storage location description (for display purposes).
    fn location(&self) -> String;

    /// Get the backend type.
    fn backend_type(&self) -> BackendType;
}

/// Available storage backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// One JSON file per key under the data directory (default)
    File,
    /// Remote storage endpoint
    Http,
    /// Process-local, nothing is persisted
    Memory,
}

impl BackendType {
    /// Parse a backend type from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "file" | "local" | "default" => Some(Self::File),
            "http" | "remote" | "server" => Some(Self::Http),
            "memory" | "mem" => Some(Self::Memory),
            _ => None,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Http => "http",
            Self::Memory => "memory",
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_type_aliases() {
        assert_eq!(BackendType::from_str("FILE"), Some(BackendType::File));
        assert_eq!(BackendType::from_str("remote"), Some(BackendType::Http));
        assert_eq!(BackendType::from_str("mem"), Some(BackendType::Memory));
        assert_eq!(BackendType::from_str("sqlite"), None);
    }

    #[test]
    fn test_backend_type_display() {
        assert_eq!(BackendType::Http.to_string(), "http");
        assert_eq!(
            BackendType::from_str(BackendType::Memory.as_str()),
            Some(BackendType::Memory)
        );
    }
}

//! File-based document backend.
//!
//! Each key maps to `<root>/<key>`. Writes go to a temporary file in the same
//! directory and are renamed into place, so a crash mid-write never leaves a
//! truncated document behind.

use super::backend::{BackendType, DocumentBackend};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Stores documents as pretty-printed JSON files.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl DocumentBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write(&self, key: &str, document: &Value) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        document.serialize(&mut ser)?;
        buf.push(b'\n');

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&buf)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(key)).map_err(|e| Error::Io(e.error))?;

        tracing::debug!(key, bytes = buf.len(), "wrote document file");
        Ok(())
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn backend_type(&self) -> BackendType {
        BackendType::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path());
        assert!(backend.read("idea_vault.json").unwrap().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().join("nested"));
        let doc = json!({"ideas": [], "collections": [{"id": "c", "name": "N"}]});

        backend.write("idea_vault.json", &doc).unwrap();
        assert_eq!(backend.read("idea_vault.json").unwrap(), Some(doc));
    }

    #[test]
    fn test_write_uses_four_space_indent() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path());
        backend
            .write("idea_vault.json", &json!({"ideas": []}))
            .unwrap();

        let raw = fs::read_to_string(dir.path().join("idea_vault.json")).unwrap();
        assert_eq!(raw, "{\n    \"ideas\": []\n}\n");
    }

    #[test]
    fn test_corrupt_file_is_json_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("idea_vault.json"), "{not json").unwrap();
        let backend = FileBackend::new(dir.path());

        assert!(matches!(
            backend.read("idea_vault.json"),
            Err(Error::Json(_))
        ));
    }
}

//! In-memory document backend.
//!
//! Clones share the same map, so a test can keep a handle to inspect what a
//! session saved. The backend can be switched offline to exercise the
//! failure paths of the client.

use super::backend::{BackendType, DocumentBackend};
use crate::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    documents: Arc<Mutex<HashMap<String, Value>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `key` with `document`.
    pub fn with_document(self, key: &str, document: Value) -> Self {
        self.lock_documents().insert(key.to_string(), document);
        self
    }

    /// Make every read and write fail with `StoreUnavailable` until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Current document under `key`, bypassing the offline switch.
    pub fn snapshot(&self, key: &str) -> Option<Value> {
        self.lock_documents().get(key).cloned()
    }

    fn lock_documents(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        // A poisoned map still holds valid JSON values
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable(
                "memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

impl DocumentBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<Value>> {
        self.check_online()?;
        Ok(self.lock_documents().get(key).cloned())
    }

    fn write(&self, key: &str, document: &Value) -> Result<()> {
        self.check_online()?;
        self.lock_documents()
            .insert(key.to_string(), document.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clones_share_documents() {
        let backend = MemoryBackend::new();
        let handle = backend.clone();

        backend.write("k.json", &json!({"ideas": []})).unwrap();
        assert_eq!(handle.snapshot("k.json"), Some(json!({"ideas": []})));
    }

    #[test]
    fn test_offline_rejects_io() {
        let backend = MemoryBackend::new().with_document("k.json", json!([]));
        backend.set_offline(true);

        assert!(matches!(backend.read("k.json"), Err(Error::StoreUnavailable(_))));
        assert!(backend.write("k.json", &json!({})).is_err());
        assert_eq!(backend.snapshot("k.json"), Some(json!([])));

        backend.set_offline(false);
        assert!(backend.read("k.json").unwrap().is_some());
    }
}

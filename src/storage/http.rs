//! Remote document backend.
//!
//! Talks to a storage server exposing
//! - `GET  {endpoint}/api/storage/{key}` returning the stored document, or `[]` when absent
//! - `POST {endpoint}/api/storage/{key}` with body `{"data": <document>}`
//!
//! Failures reported by the server come back as `{"error": "..."}`.

use super::backend::{BackendType, DocumentBackend};
use crate::{Error, Result};
use serde_json::{Value, json};
use std::time::Duration;

const USER_AGENT: &str = concat!("ideavault/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(10);

/// Reads and writes documents over HTTP (blocking).
pub struct HttpBackend {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpBackend {
    /// Create a backend for the server at `endpoint` (e.g. `http://localhost:8001`).
    pub fn new(endpoint: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(TIMEOUT)
            .user_agent(USER_AGENT)
            .build();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            agent,
        }
    }

    /// Full URL for `key`.
    pub fn url_for(&self, key: &str) -> String {
        format!("{}/api/storage/{}", self.endpoint, key)
    }
}

impl DocumentBackend for HttpBackend {
    fn read(&self, key: &str) -> Result<Option<Value>> {
        let url = self.url_for(key);
        let response = self.agent.get(&url).call();

        let body: Value = match response {
            Ok(resp) => resp
                .into_json()
                .map_err(|e| Error::StoreUnavailable(format!("{}: unreadable body: {}", url, e)))?,
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(e) => return Err(request_error(&url, e)),
        };

        if let Some(message) = server_error(&body) {
            return Err(Error::StoreUnavailable(message));
        }
        match body {
            Value::Null => Ok(None),
            Value::Array(ref items) if items.is_empty() => Ok(None),
            other => Ok(Some(other)),
        }
    }

    fn write(&self, key: &str, document: &Value) -> Result<()> {
        let url = self.url_for(key);
        let response = self.agent.post(&url).send_json(json!({ "data": document }));

        match response {
            Ok(resp) => {
                // A 2xx may still carry an error payload
                if let Ok(body) = resp.into_json::<Value>() {
                    if let Some(message) = server_error(&body) {
                        return Err(Error::StoreUnavailable(message));
                    }
                }
                tracing::debug!(key, "posted document");
                Ok(())
            }
            Err(e) => Err(request_error(&url, e)),
        }
    }

    fn location(&self) -> String {
        self.endpoint.clone()
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Http
    }
}

/// Extract the message from an `{"error": ...}` payload.
fn server_error(body: &Value) -> Option<String> {
    let error = body.as_object()?.get("error")?;
    Some(match error {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn request_error(url: &str, err: ureq::Error) -> Error {
    match err {
        ureq::Error::Status(code, resp) => {
            let body = resp.into_string().unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| server_error(&v))
                .unwrap_or(body);
            Error::StoreUnavailable(format!("{}: HTTP {}: {}", url, code, detail))
        }
        other => Error::StoreUnavailable(format!("{}: {}", url, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_trims_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:8001/");
        assert_eq!(
            backend.url_for("idea_vault.json"),
            "http://localhost:8001/api/storage/idea_vault.json"
        );
        assert_eq!(backend.location(), "http://localhost:8001");
    }

    #[test]
    fn test_server_error_payload() {
        assert_eq!(
            server_error(&json!({"error": "disk full"})),
            Some("disk full".to_string())
        );
        assert_eq!(server_error(&json!({"ideas": []})), None);
        assert_eq!(server_error(&json!([])), None);
    }

    #[test]
    fn test_unreachable_server_is_store_unavailable() {
        // Port 9 (discard) on localhost is closed on test machines
        let backend = HttpBackend::new("http://127.0.0.1:9");
        assert!(matches!(
            backend.read("idea_vault.json"),
            Err(Error::StoreUnavailable(_))
        ));
        assert!(matches!(
            backend.write("idea_vault.json", &json!({})),
            Err(Error::StoreUnavailable(_))
        ));
    }
}

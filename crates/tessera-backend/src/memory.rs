//! In-memory backend
//!
//! Mutex-guarded map keyed by string. Satisfies the same contract as
//! the filesystem backend; used in tests and as a scratch store.

use std::collections::HashMap;
use std::sync::Mutex;

use tessera_errors::{Result, TessError};

use crate::Backend;

/// Volatile key→bytes store (`memory://<label>`)
#[derive(Debug)]
pub struct MemoryBackend {
    label: String,
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            blobs: Mutex::new(HashMap::new()),
        }
    }
}

impl Backend for MemoryBackend {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.blobs
            .lock()
            .expect("memory backend poisoned")
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.blobs
            .lock()
            .expect("memory backend poisoned")
            .get(key)
            .cloned()
            .ok_or_else(|| TessError::BackendMissing {
                key: key.to_string(),
            })
    }

    fn contains(&self, key: &str) -> bool {
        self.blobs
            .lock()
            .expect("memory backend poisoned")
            .contains_key(key)
    }

    fn url_for(&self, key: &str) -> String {
        format!("memory://{}/{}", self.label, key)
    }

    fn keys(&self) -> Vec<String> {
        self.blobs
            .lock()
            .expect("memory backend poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_roundtrip() {
        let backend = MemoryBackend::new("scratch");

        backend.put("aa", b"bytes").unwrap();
        assert_eq!(backend.get("aa").unwrap(), b"bytes");
        assert!(backend.contains("aa"));
        assert!(!backend.contains("bb"));
    }

    #[test]
    fn test_get_missing_key() {
        let backend = MemoryBackend::new("scratch");

        let err = backend.get("aa").unwrap_err();
        assert_eq!(err.kind(), tessera_errors::TessErrorKind::NotFound);
    }

    #[test]
    fn test_url_for() {
        let backend = MemoryBackend::new("scratch");
        assert_eq!(backend.url_for("aa"), "memory://scratch/aa");
    }
}

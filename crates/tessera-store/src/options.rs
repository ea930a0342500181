//! Store open options
//!
//! Carries the reopen uuid, digest algorithm, and the optional
//! alternate payload root. Deserializable so deployments can keep
//! them in a TOML fragment next to the pipeline config.

use std::path::Path;

use serde::Deserialize;

use tessera_errors::{io_error, Result, TessError};

/// Options for `ObjectStore::open`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OpenOptions {
    /// Reopen an existing store by uuid; `None` creates a fresh one
    pub store_uuid: Option<String>,
    /// Digest algorithm name; `None` means the default (`sha1`)
    pub algorithm: Option<String>,
    /// Backend URL receiving bulk file/table payloads
    pub alt_root: Option<String>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.store_uuid = Some(uuid.into());
        self
    }

    pub fn with_algorithm(mut self, name: impl Into<String>) -> Self {
        self.algorithm = Some(name.into());
        self
    }

    pub fn with_alt_root(mut self, url: impl Into<String>) -> Self {
        self.alt_root = Some(url.into());
        self
    }

    /// Parse options from a TOML fragment
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| TessError::Decode {
            subject: "open options".into(),
            reason: e.to_string(),
        })
    }

    /// Load options from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| io_error("read_options", path.display().to_string(), e))?;
        Self::from_toml_str(&raw)
    }
}

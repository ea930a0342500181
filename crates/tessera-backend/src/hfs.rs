//! Hierarchical filesystem backend
//!
//! Maps a key to `<root>/<first-2-chars>/<key>` and writes atomically.
//! URL scheme: `hfs://<absolute-root>`.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use tessera_errors::{io_error, Result, TessError};

use crate::atomic::atomic_write;
use crate::sharding::shard_path;
use crate::Backend;

/// Filesystem-backed key→bytes store
#[derive(Debug)]
pub struct HfsBackend {
    root: PathBuf,
}

impl HfsBackend {
    /// Open (creating if needed) a backend rooted at the given directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| io_error("create_root", root.display().to_string(), e))?;
        Ok(Self { root })
    }

    /// Root directory of this backend
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl Backend for HfsBackend {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let target = shard_path(&self.root, key);
        debug!(key, bytes = bytes.len(), "hfs put");
        atomic_write(&target, bytes)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let target = shard_path(&self.root, key);
        if !target.exists() {
            return Err(TessError::BackendMissing {
                key: key.to_string(),
            });
        }
        fs::read(&target).map_err(|e| io_error("read_blob", target.display().to_string(), e))
    }

    fn contains(&self, key: &str) -> bool {
        shard_path(&self.root, key).exists()
    }

    fn url_for(&self, key: &str) -> String {
        format!("hfs://{}/{}", self.root.display(), key)
    }

    fn keys(&self) -> Vec<String> {
        let mut out = Vec::new();
        let Ok(shards) = fs::read_dir(&self.root) else {
            return out;
        };
        for shard in shards.filter_map(|e| e.ok()) {
            let Ok(entries) = fs::read_dir(shard.path()) else {
                continue;
            };
            for entry in entries.filter_map(|e| e.ok()) {
                if let Some(name) = entry.file_name().to_str() {
                    if !name.ends_with(".tmp") {
                        out.push(name.to_string());
                    }
                }
            }
        }
        out
    }
}

//! Blob backends for the tessera store
//!
//! Provides:
//! - `Backend`, the opaque key→bytes contract behind a URL
//! - `HfsBackend`, a hierarchical filesystem store (`hfs://<root>`)
//!   with sharded directories and atomic writes
//! - `MemoryBackend` (`memory://<label>`) for tests and scratch use
//! - `open_backend`, a URL-scheme factory

mod atomic;
mod hfs;
mod memory;
mod sharding;

pub use hfs::HfsBackend;
pub use memory::MemoryBackend;

use tessera_errors::{Result, TessError};

/// Opaque key→bytes store addressable by URL
///
/// Overwrite is permitted at this layer; immutability is enforced by
/// the catalog above it.
pub trait Backend: std::fmt::Debug {
    /// Store bytes under a key
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Fetch the bytes stored under a key
    fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Whether a key holds bytes
    fn contains(&self, key: &str) -> bool;

    /// Stable URL derived from the backend root and a key
    fn url_for(&self, key: &str) -> String;

    /// Keys currently held, in no particular order
    fn keys(&self) -> Vec<String>;
}

/// Open a backend from a URL
///
/// Recognized schemes: `hfs://<root>` and `memory://<label>`. A bare
/// filesystem path is accepted as an `hfs` root, matching how store
/// roots are usually supplied.
pub fn open_backend(location: &str) -> Result<Box<dyn Backend>> {
    let Some((scheme, rest)) = location.split_once("://") else {
        return Ok(Box::new(HfsBackend::open(location)?));
    };
    match scheme {
        "hfs" => Ok(Box::new(HfsBackend::open(rest)?)),
        "memory" => Ok(Box::new(MemoryBackend::new(rest))),
        _ => Err(TessError::InvalidUrl {
            url: location.to_string(),
        }),
    }
}

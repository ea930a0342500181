//! Tessera store - metadata catalog over content-addressed storage
//!
//! Provides:
//! - Digest service hashing payloads into content addresses
//! - `Book`, the insertion-ordered immutable-insert catalog
//! - `ObjectStore`, composing backend + digests + catalog: content
//!   registration, put/get, typed readers, listing, save and reload
//! - `Assembler`, a façade for dataset construction and bulk ingest

pub mod assembler;
pub mod book;
pub mod digest;
mod names;
pub mod options;
pub mod reader;
pub mod store;

pub use assembler::Assembler;
pub use book::Book;
pub use digest::DigestAlgorithm;
pub use options::OpenOptions;
pub use reader::ContentReader;
pub use store::{ContentCtx, MetaObject, ObjectStore};

// Re-export the model so callers build descriptors from one place
pub use tessera_model as model;

pub use tessera_errors::{Result, TessError, TessErrorKind};

//! Error taxonomy for the tessera store
//!
//! Every failure carries the offending id or path plus a stable kind
//! code usable for programmatic handling and test assertions.

use thiserror::Error;

/// Result type alias using TessError
pub type Result<T> = std::result::Result<T, TessError>;

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code so callers can classify
/// failures without matching on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TessErrorKind {
    /// Id or key absent in the catalog or the backend
    NotFound,
    /// Immutable insert violated, duplicate partition key, duplicate id
    Conflict,
    /// Reopen with a name that disagrees with the persisted manifest
    NameMismatch,
    /// Unknown descriptor variant, bad key, or required context missing
    InvalidInfo,
    /// Backend or filesystem read/write failure
    Io,
    /// Manifest or payload bytes do not parse
    Decode,
}

impl TessErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            TessErrorKind::NotFound => "ERR_NOT_FOUND",
            TessErrorKind::Conflict => "ERR_CONFLICT",
            TessErrorKind::NameMismatch => "ERR_NAME_MISMATCH",
            TessErrorKind::InvalidInfo => "ERR_INVALID_INFO",
            TessErrorKind::Io => "ERR_IO",
            TessErrorKind::Decode => "ERR_DECODE",
        }
    }
}

/// Error taxonomy for tessera store operations
#[derive(Error, Debug)]
pub enum TessError {
    // ===== Catalog Errors =====
    /// Object id not present in the catalog
    #[error("object not found: {id}")]
    ObjectNotFound { id: String },

    /// Object id already registered (the catalog is immutable-insert)
    #[error("object already registered: {id}")]
    DuplicateObject { id: String },

    /// Partition key already present in the dataset
    #[error("partition key '{key}' already exists in dataset {dataset_id}")]
    DuplicatePartition { dataset_id: String, key: String },

    /// Partition key not present in the dataset
    #[error("partition key '{key}' not found in dataset {dataset_id}")]
    PartitionNotFound { dataset_id: String, key: String },

    /// Job ordinal out of range for the dataset
    #[error("job {job_id} not found in dataset {dataset_id}")]
    JobNotFound { dataset_id: String, job_id: usize },

    // ===== Store Errors =====
    /// Persisted manifest name disagrees with the name supplied on reopen
    #[error("store name mismatch: expected '{expected}', manifest holds '{actual}'")]
    NameMismatch { expected: String, actual: String },

    /// Descriptor carries no recognized info variant
    #[error("descriptor {id} has no recognized info variant")]
    MissingInfo { id: String },

    /// Descriptor variant does not suit the requested operation
    #[error("descriptor {id} is a {actual}, expected {expected}")]
    WrongInfo {
        id: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// File or table registration without the dataset/partition context
    #[error("{tag} registration requires dataset_id and partition_key")]
    MissingContext { tag: &'static str },

    /// Partition key or lookup name rejected (empty, or contains a glob char)
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// Digest algorithm name not recognized
    #[error("unsupported digest algorithm: {name}")]
    UnknownAlgorithm { name: String },

    // ===== Backend Errors =====
    /// Key absent in the backing key-value store
    #[error("backend key not found: {key}")]
    BackendMissing { key: String },

    /// Backend URL could not be interpreted
    #[error("invalid backend url: {url}")]
    InvalidUrl { url: String },

    /// Read/write failure against the backend or an external file
    #[error("i/o failure during {op} on '{path}': {source}")]
    Io {
        op: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ===== Codec Errors =====
    /// Manifest or payload bytes failed to parse
    #[error("decode failure for {subject}: {reason}")]
    Decode { subject: String, reason: String },
}

impl TessError {
    /// Get the error kind
    pub fn kind(&self) -> TessErrorKind {
        match self {
            TessError::ObjectNotFound { .. }
            | TessError::PartitionNotFound { .. }
            | TessError::JobNotFound { .. }
            | TessError::BackendMissing { .. } => TessErrorKind::NotFound,
            TessError::DuplicateObject { .. } | TessError::DuplicatePartition { .. } => {
                TessErrorKind::Conflict
            }
            TessError::NameMismatch { .. } => TessErrorKind::NameMismatch,
            TessError::MissingInfo { .. }
            | TessError::WrongInfo { .. }
            | TessError::MissingContext { .. }
            | TessError::InvalidKey { .. }
            | TessError::UnknownAlgorithm { .. }
            | TessError::InvalidUrl { .. } => TessErrorKind::InvalidInfo,
            TessError::Io { .. } => TessErrorKind::Io,
            TessError::Decode { .. } => TessErrorKind::Decode,
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}

/// Create an i/o error with operation context
pub fn io_error(op: &'static str, path: impl Into<String>, source: std::io::Error) -> TessError {
    TessError::Io {
        op,
        path: path.into(),
        source,
    }
}

//! Descriptor model for the tessera store
//!
//! Hand-written prost messages defining the store manifest and the
//! typed descriptors it catalogs. The encoding is plain protobuf:
//! deterministic for a given state (maps are btree-backed), readable
//! back into equivalent structures, and interrogable for which union
//! variant a descriptor carries.

pub mod info;
pub mod manifest;
pub mod merge;
pub mod time;

pub use info::{
    ConfigInfo, DatasetInfo, FileAux, FileInfo, FileType, HistsInfo, InfoKind, JobInfo, LogInfo,
    MenuInfo, ObjectInfo, PartitionInfo, TableInfo,
};
pub use manifest::{Descriptor, StoreInfo, StoreManifest};
pub use merge::merge_descriptors;
pub use time::{now, to_datetime};

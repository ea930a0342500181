//! Typed descriptor payloads
//!
//! One message per object category; a descriptor carries exactly one
//! of these in its `info` oneof. Dataset membership (menu, config,
//! partitions, jobs, hists, logs) is expressed as id-valued foreign
//! keys, never owning pointers.

use std::collections::BTreeMap;

use prost_types::Timestamp;

/// Payload classification of a stored file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum FileType {
    Raw = 0,
    Csv = 1,
    Tsv = 2,
    Json = 3,
    Parquet = 4,
    /// Arrow record-batch file (random access, footer carries batch count)
    ArrowFile = 5,
    /// Arrow record-batch stream (sequential)
    ArrowStream = 6,
}

impl FileType {
    /// Display extension used when building descriptor names
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::ArrowFile | FileType::ArrowStream => "arrow",
            _ => "dat",
        }
    }
}

/// Menu descriptor payload
#[derive(Clone, PartialEq, prost::Message)]
pub struct MenuInfo {
    #[prost(message, optional, tag = "1")]
    pub created: Option<Timestamp>,
    #[prost(btree_map = "string, string", tag = "2")]
    pub aux: BTreeMap<String, String>,
}

/// Configuration descriptor payload
#[derive(Clone, PartialEq, prost::Message)]
pub struct ConfigInfo {
    #[prost(message, optional, tag = "1")]
    pub created: Option<Timestamp>,
    #[prost(btree_map = "string, string", tag = "2")]
    pub aux: BTreeMap<String, String>,
}

/// Dataset descriptor payload: binds a menu, a config, partitions and jobs
#[derive(Clone, PartialEq, prost::Message)]
pub struct DatasetInfo {
    /// Catalog id of the menu this dataset was produced from
    #[prost(string, tag = "1")]
    pub menu_id: String,
    /// Catalog id of the configuration this dataset was produced from
    #[prost(string, tag = "2")]
    pub config_id: String,
    #[prost(message, repeated, tag = "3")]
    pub partitions: Vec<PartitionInfo>,
    /// Job runs, append-only; the position is the job ordinal
    #[prost(message, repeated, tag = "4")]
    pub jobs: Vec<JobInfo>,
    /// Catalog ids of histogram collections produced for this dataset
    #[prost(string, repeated, tag = "5")]
    pub hists: Vec<String>,
    /// Catalog ids of log payloads produced for this dataset
    #[prost(string, repeated, tag = "6")]
    pub logs: Vec<String>,
    /// Opaque annotation for an alternate payload root; never interpreted
    #[prost(string, tag = "7")]
    pub storage_location: String,
}

impl DatasetInfo {
    pub fn partition(&self, key: &str) -> Option<&PartitionInfo> {
        self.partitions.iter().find(|p| p.key == key)
    }

    pub fn partition_mut(&mut self, key: &str) -> Option<&mut PartitionInfo> {
        self.partitions.iter_mut().find(|p| p.key == key)
    }

    /// Partition keys in insertion order
    pub fn partition_keys(&self) -> Vec<String> {
        self.partitions.iter().map(|p| p.key.clone()).collect()
    }
}

/// A named bucket within a dataset collecting files and tables
#[derive(Clone, PartialEq, prost::Message)]
pub struct PartitionInfo {
    #[prost(string, tag = "1")]
    pub key: String,
    /// Catalog ids of files written under this partition
    #[prost(string, repeated, tag = "2")]
    pub files: Vec<String>,
    /// Catalog ids of table schemas written under this partition
    #[prost(string, repeated, tag = "3")]
    pub tables: Vec<String>,
}

/// Auxiliary file attributes
#[derive(Clone, PartialEq, prost::Message)]
pub struct FileAux {
    #[prost(string, tag = "1")]
    pub description: String,
    #[prost(int32, tag = "2")]
    pub num_columns: i32,
    #[prost(btree_map = "string, string", tag = "3")]
    pub metadata: BTreeMap<String, String>,
}

/// File descriptor payload
#[derive(Clone, PartialEq, prost::Message)]
pub struct FileInfo {
    #[prost(enumeration = "FileType", tag = "1")]
    pub file_type: i32,
    #[prost(message, optional, tag = "2")]
    pub aux: Option<FileAux>,
}

impl FileInfo {
    pub fn new(file_type: FileType) -> Self {
        FileInfo {
            file_type: file_type as i32,
            aux: Some(FileAux::default()),
        }
    }
}

/// Table (schema) descriptor payload
#[derive(Clone, PartialEq, prost::Message)]
pub struct TableInfo {
    #[prost(message, optional, tag = "1")]
    pub created: Option<Timestamp>,
    #[prost(btree_map = "string, string", tag = "2")]
    pub aux: BTreeMap<String, String>,
}

/// Histogram collection descriptor payload
#[derive(Clone, PartialEq, prost::Message)]
pub struct HistsInfo {
    #[prost(message, optional, tag = "1")]
    pub created: Option<Timestamp>,
    #[prost(btree_map = "string, string", tag = "2")]
    pub aux: BTreeMap<String, String>,
}

/// Job run descriptor payload
#[derive(Clone, PartialEq, prost::Message)]
pub struct JobInfo {
    #[prost(message, optional, tag = "1")]
    pub created: Option<Timestamp>,
    #[prost(btree_map = "string, string", tag = "2")]
    pub aux: BTreeMap<String, String>,
    /// Catalog id of the registered job payload, empty until one exists
    #[prost(string, tag = "3")]
    pub descriptor: String,
}

/// Log descriptor payload
#[derive(Clone, PartialEq, prost::Message)]
pub struct LogInfo {
    #[prost(message, optional, tag = "1")]
    pub created: Option<Timestamp>,
    #[prost(btree_map = "string, string", tag = "2")]
    pub aux: BTreeMap<String, String>,
}

/// Tagged union of descriptor payloads
#[derive(Clone, PartialEq, prost::Oneof)]
pub enum ObjectInfo {
    #[prost(message, tag = "10")]
    Menu(MenuInfo),
    #[prost(message, tag = "11")]
    Config(ConfigInfo),
    #[prost(message, tag = "12")]
    Dataset(DatasetInfo),
    #[prost(message, tag = "13")]
    Partition(PartitionInfo),
    #[prost(message, tag = "14")]
    File(FileInfo),
    #[prost(message, tag = "15")]
    Table(TableInfo),
    #[prost(message, tag = "16")]
    Hists(HistsInfo),
    #[prost(message, tag = "17")]
    Job(JobInfo),
    #[prost(message, tag = "18")]
    Log(LogInfo),
}

/// Which union variant a descriptor carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoKind {
    Menu,
    Config,
    Dataset,
    Partition,
    File,
    Table,
    Hists,
    Job,
    Log,
}

impl InfoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoKind::Menu => "menu",
            InfoKind::Config => "config",
            InfoKind::Dataset => "dataset",
            InfoKind::Partition => "partition",
            InfoKind::File => "file",
            InfoKind::Table => "table",
            InfoKind::Hists => "hists",
            InfoKind::Job => "job",
            InfoKind::Log => "log",
        }
    }
}

impl std::fmt::Display for InfoKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ObjectInfo {
    /// Tag of this payload variant
    pub fn kind(&self) -> InfoKind {
        match self {
            ObjectInfo::Menu(_) => InfoKind::Menu,
            ObjectInfo::Config(_) => InfoKind::Config,
            ObjectInfo::Dataset(_) => InfoKind::Dataset,
            ObjectInfo::Partition(_) => InfoKind::Partition,
            ObjectInfo::File(_) => InfoKind::File,
            ObjectInfo::Table(_) => InfoKind::Table,
            ObjectInfo::Hists(_) => InfoKind::Hists,
            ObjectInfo::Job(_) => InfoKind::Job,
            ObjectInfo::Log(_) => InfoKind::Log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_extension() {
        assert_eq!(FileType::ArrowFile.extension(), "arrow");
        assert_eq!(FileType::ArrowStream.extension(), "arrow");
        assert_eq!(FileType::Raw.extension(), "dat");
        assert_eq!(FileType::Csv.extension(), "dat");
    }

    #[test]
    fn test_info_kind_tags() {
        let info = ObjectInfo::Menu(MenuInfo::default());
        assert_eq!(info.kind(), InfoKind::Menu);
        assert_eq!(info.kind().as_str(), "menu");

        let info = ObjectInfo::Dataset(DatasetInfo::default());
        assert_eq!(info.kind(), InfoKind::Dataset);
    }

    #[test]
    fn test_dataset_partition_lookup() {
        let mut ds = DatasetInfo::default();
        ds.partitions.push(PartitionInfo {
            key: "key1".into(),
            files: vec![],
            tables: vec![],
        });
        ds.partitions.push(PartitionInfo {
            key: "key2".into(),
            files: vec!["abc".into()],
            tables: vec![],
        });

        assert!(ds.partition("key1").is_some());
        assert!(ds.partition("missing").is_none());
        assert_eq!(ds.partition_keys(), vec!["key1", "key2"]);

        ds.partition_mut("key1").unwrap().files.push("f00d".into());
        assert_eq!(ds.partition("key1").unwrap().files, vec!["f00d"]);
    }

    #[test]
    fn test_file_type_roundtrip_through_i32() {
        let info = FileInfo::new(FileType::ArrowFile);
        assert_eq!(info.file_type(), FileType::ArrowFile);
        assert_eq!(info.file_type, 5);
    }
}

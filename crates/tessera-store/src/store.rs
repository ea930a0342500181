//! Object store
//!
//! Composes the blob backend, the digest service and the Book into
//! the store proper: content registration, put/get, typed readers,
//! dataset composition, listing, save and reload.
//!
//! A store instance is an explicit value owning its catalog and
//! backend handles. It is not thread-safe; callers serialize
//! mutating access.

use std::collections::HashMap;
use std::fs;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Utc};
use prost::Message;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use tessera_backend::{open_backend, Backend};
use tessera_errors::{io_error, Result, TessError};
use tessera_model::{
    now, to_datetime, DatasetInfo, Descriptor, InfoKind, JobInfo, ObjectInfo, PartitionInfo,
    StoreManifest,
};

use crate::book::Book;
use crate::digest::DigestAlgorithm;
use crate::names;
use crate::options::OpenOptions;
use crate::reader::ContentReader;

/// Result of a registration: the descriptor's identity fields
///
/// A value copy; the catalog's descriptor stays owned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaObject {
    pub name: String,
    pub uuid: String,
    pub parent_uuid: String,
    pub address: String,
}

fn meta_of(descriptor: &Descriptor) -> MetaObject {
    MetaObject {
        name: descriptor.name.clone(),
        uuid: descriptor.uuid.clone(),
        parent_uuid: descriptor.parent_uuid.clone(),
        address: descriptor.address.clone(),
    }
}

/// Dataset/partition/job context for a registration
#[derive(Debug, Clone, Default)]
pub struct ContentCtx {
    pub dataset_id: Option<String>,
    pub job_id: Option<usize>,
    pub partition_key: Option<String>,
}

impl ContentCtx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(mut self, id: impl Into<String>) -> Self {
        self.dataset_id = Some(id.into());
        self
    }

    pub fn with_partition(mut self, key: impl Into<String>) -> Self {
        self.partition_key = Some(key.into());
        self
    }

    pub fn with_job(mut self, job_id: usize) -> Self {
        self.job_id = Some(job_id);
        self
    }
}

/// Metadata catalog over content-addressed storage
#[derive(Debug)]
pub struct ObjectStore {
    manifest: StoreManifest,
    book: Book,
    backend: Box<dyn Backend>,
    alt_backend: Option<Box<dyn Backend>>,
    algorithm: DigestAlgorithm,
    /// Last `_n` suffix handed out per base digest
    dups: HashMap<String, u32>,
}

impl ObjectStore {
    /// Create a fresh store, or reload one by uuid
    ///
    /// `root` is the primary backend location (`hfs://<path>`,
    /// `memory://<label>`, or a bare directory path). Reload fetches
    /// the manifest from the backend, verifies `name` against the
    /// persisted one, and replays the catalog in order.
    pub fn open(root: &str, name: &str, options: OpenOptions) -> Result<Self> {
        let backend = open_backend(root)?;
        let alt_backend = match options.alt_root.as_deref() {
            Some(alt) => {
                info!(alt, "opening alternate payload backend");
                Some(open_backend(alt)?)
            }
            None => None,
        };

        match options.store_uuid.as_deref() {
            None => {
                let algorithm: DigestAlgorithm =
                    options.algorithm.as_deref().unwrap_or("sha1").parse()?;
                let uuid = Uuid::new_v4().to_string();
                let mut manifest = StoreManifest {
                    name: name.to_string(),
                    uuid: uuid.clone(),
                    parent_uuid: String::new(),
                    address: backend.url_for(&uuid),
                    digest_algorithm: algorithm.as_str().to_string(),
                    info: None,
                };
                manifest.info_mut().created = Some(now());
                info!(store = name, %uuid, address = %manifest.address, "created new store");
                Ok(Self {
                    manifest,
                    book: Book::new(),
                    backend,
                    alt_backend,
                    algorithm,
                    dups: HashMap::new(),
                })
            }
            Some(store_uuid) => {
                let buf = backend.get(store_uuid)?;
                let mut manifest =
                    StoreManifest::decode(buf.as_slice()).map_err(|e| TessError::Decode {
                        subject: format!("store manifest {store_uuid}"),
                        reason: e.to_string(),
                    })?;
                if manifest.name != name {
                    return Err(TessError::NameMismatch {
                        expected: name.to_string(),
                        actual: manifest.name,
                    });
                }
                let algorithm: DigestAlgorithm = if manifest.digest_algorithm.is_empty() {
                    options.algorithm.as_deref().unwrap_or("sha1").parse()?
                } else {
                    manifest.digest_algorithm.parse()?
                };

                let mut book = Book::new();
                for object in manifest.info_mut().objects.drain(..) {
                    debug!(id = %object.uuid, "loading object");
                    book.set(object.uuid.clone(), object)?;
                }
                let dups = rebuild_dups(&book);
                info!(store = name, uuid = %manifest.uuid, objects = book.len(), "loaded store");
                Ok(Self {
                    manifest,
                    book,
                    backend,
                    alt_backend,
                    algorithm,
                    dups,
                })
            }
        }
    }

    // ===== Store accessors =====

    pub fn store_name(&self) -> &str {
        &self.manifest.name
    }

    pub fn store_uuid(&self) -> &str {
        &self.manifest.uuid
    }

    pub fn store_address(&self) -> &str {
        &self.manifest.address
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Creation time as a calendar value
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.manifest
            .info
            .as_ref()
            .and_then(|i| i.created.as_ref())
            .map(to_datetime)
    }

    /// Free-form store attributes
    pub fn aux(&self) -> Option<&std::collections::BTreeMap<String, String>> {
        self.manifest.info.as_ref().map(|i| &i.aux)
    }

    pub fn aux_mut(&mut self) -> &mut std::collections::BTreeMap<String, String> {
        &mut self.manifest.info_mut().aux
    }

    /// Read-only view of the catalog
    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn len(&self) -> usize {
        self.book.len()
    }

    pub fn is_empty(&self) -> bool {
        self.book.is_empty()
    }

    /// Snapshot of one descriptor
    pub fn descriptor(&self, id: &str) -> Result<Descriptor> {
        self.book.get(id).cloned()
    }

    // ===== Registration =====

    /// Register a byte buffer under its content digest
    ///
    /// The descriptor is catalogued immediately; the bytes themselves
    /// are persisted by a later `put`. Re-registering identical bytes
    /// is idempotent: the existing id comes back, nothing is
    /// appended.
    pub fn register_content(
        &mut self,
        buf: &[u8],
        info: ObjectInfo,
        ctx: ContentCtx,
    ) -> Result<MetaObject> {
        let kind = info.kind();
        require_context(kind, &ctx)?;

        let digest = self.algorithm.hex_digest(buf);
        if self.book.contains(&digest) {
            debug!(id = %digest, "content already registered");
            return Ok(meta_of(self.book.get(&digest)?));
        }

        let address = self.payload_backend(kind).url_for(&digest);
        let name = names::content_name(&digest, &info, &ctx);
        self.apply_context(&digest, kind, &ctx)?;

        let descriptor = Descriptor {
            uuid: digest.clone(),
            name,
            parent_uuid: self.manifest.uuid.clone(),
            address,
            info: Some(info),
        };
        let meta = meta_of(&descriptor);
        self.book.set(digest, descriptor)?;
        info!(id = %meta.uuid, kind = %kind, name = %meta.name, "registered content");
        Ok(meta)
    }

    /// Register a serializable payload (its encoded bytes are hashed)
    pub fn register_message<M: Message>(
        &mut self,
        msg: &M,
        info: ObjectInfo,
        ctx: ContentCtx,
    ) -> Result<MetaObject> {
        self.register_content(&msg.encode_to_vec(), info, ctx)
    }

    /// Register a file that already lives outside the backend
    ///
    /// The id is the digest of the file's contents and the address a
    /// percent-encoded `file://` URL. The same id at a different path
    /// gets a `_n` suffix; re-registering the same path is
    /// idempotent.
    pub fn register_file(
        &mut self,
        path: impl AsRef<Path>,
        info: ObjectInfo,
        ctx: ContentCtx,
    ) -> Result<MetaObject> {
        let kind = info.kind();
        require_context(kind, &ctx)?;

        let path = path.as_ref();
        let abs = fs::canonicalize(path)
            .map_err(|e| io_error("resolve_path", path.display().to_string(), e))?;
        let file = fs::File::open(&abs)
            .map_err(|e| io_error("open_file", abs.display().to_string(), e))?;
        let digest = self
            .algorithm
            .hex_digest_reader(BufReader::new(file), &abs.display().to_string())?;
        let address = Url::from_file_path(&abs)
            .map_err(|_| TessError::InvalidUrl {
                url: abs.display().to_string(),
            })?
            .to_string();

        // Same content at the same path: hand back the existing entry
        if let Some(existing) = self.find_registered_path(&digest, &address) {
            debug!(id = %existing.uuid, "file already registered at this path");
            return Ok(existing);
        }

        let id = if self.book.contains(&digest) {
            let n = self.next_suffix(&digest);
            format!("{digest}_{n}")
        } else {
            digest
        };

        let file_stem = abs
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(id.as_str())
            .to_string();
        let name = names::file_name(&id, &file_stem, &info, &ctx);
        self.apply_context(&id, kind, &ctx)?;

        let descriptor = Descriptor {
            uuid: id.clone(),
            name,
            parent_uuid: self.manifest.uuid.clone(),
            address,
            info: Some(info),
        };
        let meta = meta_of(&descriptor);
        self.book.set(id, descriptor)?;
        info!(id = %meta.uuid, path = %abs.display(), "registered file");
        Ok(meta)
    }

    /// Register every file under `dir` matching a glob pattern
    ///
    /// Returns one MetaObject per match, in glob iteration order.
    pub fn register_dir(
        &mut self,
        dir: impl AsRef<Path>,
        pattern: &str,
        info: ObjectInfo,
        ctx: ContentCtx,
    ) -> Result<Vec<MetaObject>> {
        let full = dir.as_ref().join(pattern);
        let full = full.to_str().ok_or_else(|| TessError::InvalidKey {
            key: pattern.to_string(),
            reason: "glob path is not valid utf-8",
        })?;
        let paths = glob::glob(full).map_err(|_| TessError::InvalidKey {
            key: pattern.to_string(),
            reason: "not a valid glob pattern",
        })?;

        let mut out = Vec::new();
        for entry in paths {
            let path =
                entry.map_err(|e| io_error("glob_dir", full.to_string(), e.into_error()))?;
            if path.is_file() {
                out.push(self.register_file(path, info.clone(), ctx.clone())?);
            }
        }
        Ok(out)
    }

    /// Create a dataset bound to an existing menu and config
    pub fn register_dataset(&mut self, menu_id: &str, config_id: &str) -> Result<MetaObject> {
        self.expect_kind(menu_id, InfoKind::Menu)?;
        self.expect_kind(config_id, InfoKind::Config)?;

        let uuid = Uuid::new_v4().to_string();
        let info = DatasetInfo {
            menu_id: menu_id.to_string(),
            config_id: config_id.to_string(),
            ..Default::default()
        };
        let descriptor = Descriptor {
            uuid: uuid.clone(),
            name: format!("{uuid}.dataset"),
            parent_uuid: self.manifest.uuid.clone(),
            address: self.backend.url_for(&uuid),
            info: Some(ObjectInfo::Dataset(info)),
        };
        let meta = meta_of(&descriptor);
        self.book.set(uuid, descriptor)?;
        info!(dataset = %meta.uuid, menu = menu_id, config = config_id, "registered dataset");
        Ok(meta)
    }

    /// Add a named partition to a dataset
    pub fn new_partition(&mut self, dataset_id: &str, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(TessError::InvalidKey {
                key: key.to_string(),
                reason: "partition key must not be empty",
            });
        }
        if key.contains('*') {
            return Err(TessError::InvalidKey {
                key: key.to_string(),
                reason: "partition key must not contain glob characters",
            });
        }
        let dataset = self.dataset_mut(dataset_id)?;
        if dataset.partition(key).is_some() {
            return Err(TessError::DuplicatePartition {
                dataset_id: dataset_id.to_string(),
                key: key.to_string(),
            });
        }
        dataset.partitions.push(PartitionInfo {
            key: key.to_string(),
            ..Default::default()
        });
        debug!(dataset = dataset_id, key, "new partition");
        Ok(())
    }

    /// Append a job run to a dataset, returning its 0-based ordinal
    pub fn new_job(&mut self, dataset_id: &str) -> Result<usize> {
        let dataset = self.dataset_mut(dataset_id)?;
        dataset.jobs.push(JobInfo {
            created: Some(now()),
            ..Default::default()
        });
        let job_id = dataset.jobs.len() - 1;
        debug!(dataset = dataset_id, job_id, "new job");
        Ok(job_id)
    }

    // ===== Payload access =====

    /// Seal a registered payload into the backend
    pub fn put(&self, id: &str, bytes: &[u8]) -> Result<()> {
        let descriptor = self.book.get(id)?;
        let kind = descriptor
            .which_info()
            .ok_or_else(|| TessError::MissingInfo { id: id.to_string() })?;
        self.payload_backend(kind).put(id, bytes)
    }

    /// Serialize and seal a structured payload
    pub fn put_message<M: Message>(&self, id: &str, msg: &M) -> Result<()> {
        self.put(id, &msg.encode_to_vec())
    }

    /// Fetch the payload bytes for a descriptor
    ///
    /// Falls back to the descriptor's external `file://` URL when the
    /// id is not a backend key (file-referenced entries).
    pub fn get(&self, id: &str) -> Result<Vec<u8>> {
        let descriptor = self.book.get(id)?;
        let kind = descriptor
            .which_info()
            .ok_or_else(|| TessError::MissingInfo { id: id.to_string() })?;
        let backend = self.payload_backend(kind);
        if backend.contains(id) {
            return backend.get(id);
        }
        if descriptor.address.starts_with("file://") {
            let path = Url::parse(&descriptor.address)
                .ok()
                .and_then(|u| u.to_file_path().ok())
                .ok_or_else(|| TessError::InvalidUrl {
                    url: descriptor.address.clone(),
                })?;
            return fs::read(&path)
                .map_err(|e| io_error("read_external", path.display().to_string(), e));
        }
        Err(TessError::BackendMissing {
            key: id.to_string(),
        })
    }

    /// Fetch and decode a structured payload
    pub fn get_message<M: Message + Default>(&self, id: &str) -> Result<M> {
        let bytes = self.get(id)?;
        M::decode(bytes.as_slice()).map_err(|e| TessError::Decode {
            subject: id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Open a typed reader over a payload
    ///
    /// File descriptors of type arrow_file/arrow_stream get
    /// record-batch readers; everything else reads as raw bytes.
    pub fn open_reader(&self, id: &str) -> Result<ContentReader> {
        let descriptor = self.book.get(id)?;
        let bytes = self.get(id)?;
        match &descriptor.info {
            Some(ObjectInfo::File(file)) => match file.file_type() {
                tessera_model::FileType::ArrowFile => ContentReader::arrow_file(id, bytes),
                tessera_model::FileType::ArrowStream => ContentReader::arrow_stream(id, bytes),
                _ => Ok(ContentReader::Raw(std::io::Cursor::new(bytes))),
            },
            _ => Ok(ContentReader::Raw(std::io::Cursor::new(bytes))),
        }
    }

    // ===== Listing =====

    /// Scan the catalog, filtering by name prefix and name suffix
    ///
    /// Either filter may be absent. Returned descriptors are value
    /// copies in catalog (insertion) order.
    pub fn list(&self, prefix: Option<&str>, suffix: Option<&str>) -> Vec<Descriptor> {
        self.book
            .values()
            .filter(|d| prefix.map_or(true, |p| d.name.starts_with(p)))
            .filter(|d| suffix.map_or(true, |s| d.name.ends_with(s)))
            .cloned()
            .collect()
    }

    /// Partition keys of a dataset in insertion order
    pub fn list_partitions(&self, dataset_id: &str) -> Result<Vec<String>> {
        let dataset = self.dataset_ref(dataset_id)?;
        Ok(dataset.partition_keys())
    }

    /// Serialize the manifest (catalog included) under the store uuid
    pub fn save_store(&mut self) -> Result<()> {
        let objects: Vec<Descriptor> = self.book.values().cloned().collect();
        self.manifest.info_mut().objects = objects;
        let bytes = self.manifest.encode_to_vec();
        // The catalog stays owned by the book between saves
        self.manifest.info_mut().objects.clear();
        self.backend.put(&self.manifest.uuid, &bytes)?;
        info!(store = %self.manifest.name, uuid = %self.manifest.uuid, bytes = bytes.len(), "saved store");
        Ok(())
    }

    // ===== Internals =====

    /// Backend holding a payload of the given kind: bulk file/table
    /// payloads go to the alternate backend when one is registered
    fn payload_backend(&self, kind: InfoKind) -> &dyn Backend {
        match (&self.alt_backend, kind) {
            (Some(alt), InfoKind::File | InfoKind::Table) => alt.as_ref(),
            _ => self.backend.as_ref(),
        }
    }

    fn expect_kind(&self, id: &str, expected: InfoKind) -> Result<()> {
        let descriptor = self.book.get(id)?;
        match descriptor.which_info() {
            Some(kind) if kind == expected => Ok(()),
            Some(kind) => Err(TessError::WrongInfo {
                id: id.to_string(),
                expected: expected.as_str(),
                actual: kind.as_str(),
            }),
            None => Err(TessError::MissingInfo { id: id.to_string() }),
        }
    }

    fn dataset_ref(&self, dataset_id: &str) -> Result<&DatasetInfo> {
        let descriptor = self.book.get(dataset_id)?;
        match &descriptor.info {
            Some(ObjectInfo::Dataset(ds)) => Ok(ds),
            Some(other) => Err(TessError::WrongInfo {
                id: dataset_id.to_string(),
                expected: "dataset",
                actual: other.kind().as_str(),
            }),
            None => Err(TessError::MissingInfo {
                id: dataset_id.to_string(),
            }),
        }
    }

    fn dataset_mut(&mut self, dataset_id: &str) -> Result<&mut DatasetInfo> {
        let descriptor = self.book.get_mut(dataset_id)?;
        let actual = descriptor
            .which_info()
            .map(|k| k.as_str())
            .unwrap_or("empty");
        match descriptor.info.as_mut() {
            Some(ObjectInfo::Dataset(ds)) => Ok(ds),
            _ => Err(TessError::WrongInfo {
                id: dataset_id.to_string(),
                expected: "dataset",
                actual,
            }),
        }
    }

    /// Record a new entry's id on the dataset it was produced under
    fn apply_context(&mut self, id: &str, kind: InfoKind, ctx: &ContentCtx) -> Result<()> {
        let Some(dataset_id) = ctx.dataset_id.as_deref() else {
            return Ok(());
        };
        let dataset_id = dataset_id.to_string();
        let dataset = self.dataset_mut(&dataset_id)?;
        match kind {
            InfoKind::File | InfoKind::Table => {
                let key = ctx
                    .partition_key
                    .as_deref()
                    .ok_or(TessError::MissingContext {
                        tag: kind.as_str(),
                    })?;
                if let Some(job_id) = ctx.job_id {
                    if dataset.jobs.len() <= job_id {
                        return Err(TessError::JobNotFound { dataset_id, job_id });
                    }
                }
                let partition =
                    dataset
                        .partition_mut(key)
                        .ok_or_else(|| TessError::PartitionNotFound {
                            dataset_id: dataset_id.clone(),
                            key: key.to_string(),
                        })?;
                if kind == InfoKind::File {
                    partition.files.push(id.to_string());
                } else {
                    partition.tables.push(id.to_string());
                }
            }
            InfoKind::Hists => dataset.hists.push(id.to_string()),
            InfoKind::Log => dataset.logs.push(id.to_string()),
            InfoKind::Job => {
                if let Some(job_id) = ctx.job_id {
                    let job =
                        dataset
                            .jobs
                            .get_mut(job_id)
                            .ok_or_else(|| TessError::JobNotFound {
                                dataset_id: dataset_id.clone(),
                                job_id,
                            })?;
                    job.descriptor = id.to_string();
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Existing entry for this digest at this exact address, if any
    fn find_registered_path(&self, digest: &str, address: &str) -> Option<MetaObject> {
        self.book.iter().find_map(|(catalog_id, descriptor)| {
            let same_base = catalog_id == digest
                || catalog_id
                    .strip_prefix(digest)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map_or(false, |n| n.parse::<u32>().is_ok());
            if same_base && descriptor.address == address {
                Some(meta_of(descriptor))
            } else {
                None
            }
        })
    }

    fn next_suffix(&mut self, base: &str) -> u32 {
        let n = self
            .dups
            .entry(base.to_string())
            .and_modify(|n| *n += 1)
            .or_insert(0);
        *n
    }
}

/// Required context per payload kind
fn require_context(kind: InfoKind, ctx: &ContentCtx) -> Result<()> {
    if matches!(kind, InfoKind::File | InfoKind::Table)
        && (ctx.dataset_id.is_none() || ctx.partition_key.is_none())
    {
        return Err(TessError::MissingContext {
            tag: kind.as_str(),
        });
    }
    Ok(())
}

/// Restore per-digest suffix counters from suffixed catalog ids
fn rebuild_dups(book: &Book) -> HashMap<String, u32> {
    let mut dups: HashMap<String, u32> = HashMap::new();
    for id in book.keys() {
        if let Some((base, n)) = id.rsplit_once('_') {
            if let Ok(n) = n.parse::<u32>() {
                let entry = dups.entry(base.to_string()).or_insert(n);
                if *entry < n {
                    *entry = n;
                }
            }
        }
    }
    dups
}

//! Dataset assembler
//!
//! Groups the common registration sequences: menu + config + dataset
//! in one step, and bulk file ingestion into a partition.

use std::path::Path;

use prost::Message;
use tracing::info;

use tessera_errors::Result;
use tessera_model::{ConfigInfo, FileInfo, MenuInfo, ObjectInfo};

use crate::store::{ContentCtx, MetaObject, ObjectStore};

/// Façade over an object store for dataset construction
pub struct Assembler<'a> {
    store: &'a mut ObjectStore,
}

impl<'a> Assembler<'a> {
    pub fn new(store: &'a mut ObjectStore) -> Self {
        Self { store }
    }

    /// Register a menu and a config, seal both payloads, and create
    /// the dataset bound to them
    pub fn build_dataset<M: Message, C: Message>(
        &mut self,
        menu: &M,
        menu_info: MenuInfo,
        config: &C,
        config_info: ConfigInfo,
    ) -> Result<MetaObject> {
        let menu_meta =
            self.store
                .register_message(menu, ObjectInfo::Menu(menu_info), ContentCtx::new())?;
        self.store.put_message(&menu_meta.uuid, menu)?;

        let config_meta = self.store.register_message(
            config,
            ObjectInfo::Config(config_info),
            ContentCtx::new(),
        )?;
        self.store.put_message(&config_meta.uuid, config)?;

        let dataset = self
            .store
            .register_dataset(&menu_meta.uuid, &config_meta.uuid)?;
        info!(dataset = %dataset.uuid, "assembled dataset");
        Ok(dataset)
    }

    /// Register every file under `dir` matching `pattern` into a
    /// dataset partition, optionally tagged with a job ordinal
    pub fn ingest_files(
        &mut self,
        dataset_id: &str,
        partition_key: &str,
        dir: impl AsRef<Path>,
        pattern: &str,
        file_info: FileInfo,
        job_id: Option<usize>,
    ) -> Result<Vec<MetaObject>> {
        let mut ctx = ContentCtx::new()
            .with_dataset(dataset_id)
            .with_partition(partition_key);
        if let Some(job_id) = job_id {
            ctx = ctx.with_job(job_id);
        }
        let registered =
            self.store
                .register_dir(dir, pattern, ObjectInfo::File(file_info), ctx)?;
        info!(
            dataset = dataset_id,
            partition = partition_key,
            files = registered.len(),
            "ingested files"
        );
        Ok(registered)
    }
}

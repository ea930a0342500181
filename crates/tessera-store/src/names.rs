//! Display-name construction
//!
//! Names are deterministic and for display/listing only; identity is
//! always the content id. Partition payloads follow
//! `<dataset>.part_<key>.<job>.<ext>`.

use tessera_model::{InfoKind, ObjectInfo};

use crate::store::ContentCtx;

/// `<dataset>.part_<key>` plus the job ordinal when one is supplied
fn partition_base(ctx: &ContentCtx) -> Option<String> {
    let dataset = ctx.dataset_id.as_deref()?;
    let key = ctx.partition_key.as_deref()?;
    Some(match ctx.job_id {
        Some(job) => format!("{dataset}.part_{key}.{job}"),
        None => format!("{dataset}.part_{key}"),
    })
}

/// Name for a byte-buffer registration
pub(crate) fn content_name(id: &str, info: &ObjectInfo, ctx: &ContentCtx) -> String {
    match info {
        ObjectInfo::Menu(_) => format!("{id}.menu.dat"),
        ObjectInfo::Config(_) => format!("{id}.config.dat"),
        ObjectInfo::Dataset(_) => format!("{id}.dataset"),
        ObjectInfo::Partition(_) => format!("{id}.partition.dat"),
        ObjectInfo::File(file) => {
            let ext = file.file_type().extension();
            match partition_base(ctx) {
                Some(base) => format!("{base}.{ext}"),
                None => format!("{id}.{ext}"),
            }
        }
        ObjectInfo::Table(_) => match partition_base(ctx) {
            Some(base) => format!("{base}.table.dat"),
            None => format!("{id}.table.dat"),
        },
        ObjectInfo::Hists(_) => match ctx.dataset_id.as_deref() {
            Some(dataset) => format!("{dataset}.{id}.hists.dat"),
            None => format!("{id}.hists.dat"),
        },
        ObjectInfo::Job(_) => match (ctx.dataset_id.as_deref(), ctx.job_id) {
            (Some(dataset), Some(job)) => format!("{dataset}.job_{job}.dat"),
            _ => format!("{id}.job.dat"),
        },
        ObjectInfo::Log(_) => match ctx.dataset_id.as_deref() {
            Some(dataset) => format!("{dataset}.{id}.log.dat"),
            None => format!("{id}.log.dat"),
        },
    }
}

/// Name for a file-path registration: the original file name stays
/// the final segment so suffix listing by extension keeps working
pub(crate) fn file_name(id: &str, file_stem: &str, info: &ObjectInfo, ctx: &ContentCtx) -> String {
    if info.kind() == InfoKind::File {
        return match (ctx.dataset_id.as_deref(), ctx.partition_key.as_deref()) {
            (Some(dataset), Some(key)) => format!("{dataset}.part_{key}.{file_stem}"),
            _ => file_stem.to_string(),
        };
    }
    content_name(id, info, ctx)
}

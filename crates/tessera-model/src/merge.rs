//! Descriptor merge
//!
//! Field-wise combine used when two catalogs hold the same id:
//! scalars are left-biased, repeated sub-lists concatenate. Dataset
//! partitions merge by key so the per-dataset key-uniqueness
//! invariant survives the combine.

use crate::info::ObjectInfo;
use crate::manifest::Descriptor;

/// Merge two descriptors sharing an id
///
/// Scalars (name, parent, address) come from the left side. When both
/// sides carry dataset payloads their membership lists concatenate;
/// any other variant pairing keeps the left payload.
pub fn merge_descriptors(left: &Descriptor, right: &Descriptor) -> Descriptor {
    let mut out = left.clone();

    if let (Some(ObjectInfo::Dataset(l)), Some(ObjectInfo::Dataset(r))) =
        (&left.info, &right.info)
    {
        let mut merged = l.clone();
        for part in &r.partitions {
            match merged.partition_mut(&part.key) {
                Some(existing) => {
                    existing.files.extend(part.files.iter().cloned());
                    existing.tables.extend(part.tables.iter().cloned());
                }
                None => merged.partitions.push(part.clone()),
            }
        }
        merged.jobs.extend(r.jobs.iter().cloned());
        merged.hists.extend(r.hists.iter().cloned());
        merged.logs.extend(r.logs.iter().cloned());
        out.info = Some(ObjectInfo::Dataset(merged));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::{DatasetInfo, MenuInfo, PartitionInfo};

    fn dataset_descriptor(uuid: &str, info: DatasetInfo) -> Descriptor {
        Descriptor {
            uuid: uuid.into(),
            name: format!("{uuid}.dataset"),
            parent_uuid: "store".into(),
            address: String::new(),
            info: Some(ObjectInfo::Dataset(info)),
        }
    }

    #[test]
    fn test_merge_concatenates_dataset_lists() {
        let mut left = DatasetInfo::default();
        left.partitions.push(PartitionInfo {
            key: "key1".into(),
            files: vec!["f1".into()],
            tables: vec![],
        });
        left.logs.push("log1".into());

        let mut right = DatasetInfo::default();
        right.partitions.push(PartitionInfo {
            key: "key1".into(),
            files: vec!["f2".into()],
            tables: vec!["t1".into()],
        });
        right.partitions.push(PartitionInfo {
            key: "key2".into(),
            files: vec![],
            tables: vec![],
        });
        right.hists.push("h1".into());

        let merged = merge_descriptors(
            &dataset_descriptor("dd", left),
            &dataset_descriptor("dd", right),
        );
        let ObjectInfo::Dataset(ds) = merged.info.unwrap() else {
            panic!("merged descriptor lost its dataset payload");
        };

        assert_eq!(ds.partition_keys(), vec!["key1", "key2"]);
        assert_eq!(ds.partition("key1").unwrap().files, vec!["f1", "f2"]);
        assert_eq!(ds.partition("key1").unwrap().tables, vec!["t1"]);
        assert_eq!(ds.hists, vec!["h1"]);
        assert_eq!(ds.logs, vec!["log1"]);
    }

    #[test]
    fn test_merge_left_biased_on_scalars() {
        let left = Descriptor {
            uuid: "aa".into(),
            name: "left-name".into(),
            parent_uuid: "p1".into(),
            address: "hfs:///left".into(),
            info: Some(ObjectInfo::Menu(MenuInfo::default())),
        };
        let right = Descriptor {
            name: "right-name".into(),
            ..left.clone()
        };

        let merged = merge_descriptors(&left, &right);
        assert_eq!(merged.name, "left-name");
        assert_eq!(merged.address, "hfs:///left");
    }
}

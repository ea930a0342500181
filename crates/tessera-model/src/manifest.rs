//! Store manifest and descriptor messages
//!
//! The manifest is the root record of a store instance; its `objects`
//! sequence is the serialized catalog in insertion order.

use std::collections::BTreeMap;

use prost_types::Timestamp;

use crate::info::{InfoKind, ObjectInfo};

/// Root record of a store instance
#[derive(Clone, PartialEq, prost::Message)]
pub struct StoreManifest {
    /// Human-readable label; must match the name supplied on reopen
    #[prost(string, tag = "1")]
    pub name: String,
    /// Stable identifier assigned at creation (UUID v4)
    #[prost(string, tag = "2")]
    pub uuid: String,
    /// Identifier of the enclosing store; empty for top-level
    #[prost(string, tag = "3")]
    pub parent_uuid: String,
    /// Backend URL where the manifest blob lives
    #[prost(string, tag = "4")]
    pub address: String,
    /// Digest algorithm name, persisted so reload hashes identically
    #[prost(string, tag = "5")]
    pub digest_algorithm: String,
    #[prost(message, optional, tag = "6")]
    pub info: Option<StoreInfo>,
}

impl StoreManifest {
    /// Store info, created on first access
    pub fn info_mut(&mut self) -> &mut StoreInfo {
        self.info.get_or_insert_with(StoreInfo::default)
    }
}

/// Store-level metadata and the descriptor catalog
#[derive(Clone, PartialEq, prost::Message)]
pub struct StoreInfo {
    /// Wall-clock creation time
    #[prost(message, optional, tag = "1")]
    pub created: Option<Timestamp>,
    /// Free-form auxiliary attributes
    #[prost(btree_map = "string, string", tag = "2")]
    pub aux: BTreeMap<String, String>,
    /// Catalog entries, iteration order equals insertion order
    #[prost(message, repeated, tag = "3")]
    pub objects: Vec<Descriptor>,
}

/// One catalog entry per content blob
#[derive(Clone, PartialEq, prost::Message)]
pub struct Descriptor {
    /// Content digest hex, or `<digest>_<n>` on file-path collision
    #[prost(string, tag = "1")]
    pub uuid: String,
    /// Display name, e.g. `<dataset>.part_<key>.<job>.arrow`
    #[prost(string, tag = "2")]
    pub name: String,
    /// Uuid of the enclosing store manifest
    #[prost(string, tag = "3")]
    pub parent_uuid: String,
    /// URL of the payload bytes (backend key or external `file://`)
    #[prost(string, tag = "4")]
    pub address: String,
    #[prost(
        oneof = "ObjectInfo",
        tags = "10, 11, 12, 13, 14, 15, 16, 17, 18"
    )]
    pub info: Option<ObjectInfo>,
}

impl Descriptor {
    /// Which union variant is set, if any
    pub fn which_info(&self) -> Option<InfoKind> {
        self.info.as_ref().map(ObjectInfo::kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::{DatasetInfo, MenuInfo};
    use prost::Message;

    fn sample_descriptor(uuid: &str, info: ObjectInfo) -> Descriptor {
        Descriptor {
            uuid: uuid.into(),
            name: format!("{uuid}.menu.dat"),
            parent_uuid: "store-1".into(),
            address: format!("hfs:///tmp/{uuid}"),
            info: Some(info),
        }
    }

    #[test]
    fn test_which_info() {
        let desc = sample_descriptor("aa00", ObjectInfo::Menu(MenuInfo::default()));
        assert_eq!(desc.which_info(), Some(InfoKind::Menu));

        let bare = Descriptor::default();
        assert_eq!(bare.which_info(), None);
    }

    #[test]
    fn test_manifest_roundtrip_preserves_object_order() {
        let mut manifest = StoreManifest {
            name: "test".into(),
            uuid: "store-1".into(),
            parent_uuid: String::new(),
            address: "hfs:///tmp/store".into(),
            digest_algorithm: "sha1".into(),
            info: Some(StoreInfo::default()),
        };
        for id in ["cc", "aa", "bb"] {
            manifest
                .info_mut()
                .objects
                .push(sample_descriptor(id, ObjectInfo::Menu(MenuInfo::default())));
        }

        let bytes = manifest.encode_to_vec();
        let decoded = StoreManifest::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded, manifest);

        let ids: Vec<&str> = decoded.info.as_ref().unwrap().objects
            .iter()
            .map(|o| o.uuid.as_str())
            .collect();
        assert_eq!(ids, vec!["cc", "aa", "bb"]);
    }

    #[test]
    fn test_encoding_deterministic() {
        let mut manifest = StoreManifest {
            name: "test".into(),
            uuid: "store-1".into(),
            ..Default::default()
        };
        let info = manifest.info_mut();
        info.aux.insert("owner".into(), "pipeline".into());
        info.aux.insert("tier".into(), "derived".into());
        info.objects.push(sample_descriptor(
            "dd",
            ObjectInfo::Dataset(DatasetInfo::default()),
        ));

        assert_eq!(manifest.encode_to_vec(), manifest.clone().encode_to_vec());
    }
}

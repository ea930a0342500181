// Integration tests for store save/reload fidelity
// Covers menu round-trips, reopen identity, and name-mismatch refusal

use prost::Message;

use tessera_model::{ConfigInfo, MenuInfo, ObjectInfo};
use tessera_store::{ContentCtx, DigestAlgorithm, ObjectStore, OpenOptions, TessErrorKind};

/// Stand-in for a pipeline menu payload
#[derive(Clone, PartialEq, prost::Message)]
struct TestMenu {
    #[prost(string, tag = "1")]
    uuid: String,
    #[prost(string, tag = "2")]
    name: String,
}

fn scratch_root() -> (tempfile::TempDir, String) {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path().join("test").to_str().unwrap().to_string();
    (dir, root)
}

#[test]
fn test_menu_round_trip() {
    // Given: A fresh store and a menu payload
    tessera_logging::init(tessera_logging::Profile::Test);
    let (_dir, root) = scratch_root();
    let mut store = ObjectStore::open(&root, "test", OpenOptions::new()).unwrap();

    let menu = TestMenu {
        uuid: "11111111-2222-3333-4444-555555555555".into(),
        name: "cartesian.menu".into(),
    };

    // When: The menu is registered and its payload sealed
    let meta = store
        .register_message(
            &menu,
            ObjectInfo::Menu(MenuInfo::default()),
            ContentCtx::new(),
        )
        .unwrap();
    store.put_message(&meta.uuid, &menu).unwrap();

    // Then: The id is the digest of the serialized payload
    assert_eq!(
        meta.uuid,
        DigestAlgorithm::Sha1.hex_digest(&menu.encode_to_vec())
    );

    // And: Reading it back into a fresh message reproduces the fields
    let reloaded: TestMenu = store.get_message(&meta.uuid).unwrap();
    assert_eq!(reloaded.name, menu.name);
    assert_eq!(reloaded.uuid, menu.uuid);
}

#[test]
fn test_registration_order_survives_save_and_reopen() {
    // Given: A store with several entries in a known order
    let (_dir, root) = scratch_root();
    let mut store = ObjectStore::open(&root, "test", OpenOptions::new()).unwrap();

    let mut ids = Vec::new();
    for payload in [&b"gamma"[..], &b"alpha"[..], &b"beta"[..]] {
        let meta = store
            .register_content(
                payload,
                ObjectInfo::Menu(MenuInfo::default()),
                ContentCtx::new(),
            )
            .unwrap();
        store.put(&meta.uuid, payload).unwrap();
        ids.push(meta.uuid);
    }

    // When: The store is saved and reopened by uuid
    store.save_store().unwrap();
    let reopened = ObjectStore::open(
        &root,
        "test",
        OpenOptions::new().with_store_uuid(store.store_uuid()),
    )
    .unwrap();

    // Then: The catalog is equal and iterates in the original order
    assert!(store.book().compatible(reopened.book()));
    assert_eq!(store.book(), reopened.book());
    let reopened_ids: Vec<&str> = reopened.book().keys().collect();
    assert_eq!(reopened_ids, ids.iter().map(String::as_str).collect::<Vec<_>>());

    // And: Every payload is still readable
    for id in &ids {
        assert!(!reopened.get(id).unwrap().is_empty());
    }
}

#[test]
fn test_reopen_with_wrong_name_fails() {
    // Given: A saved store named "test"
    let (_dir, root) = scratch_root();
    let mut store = ObjectStore::open(&root, "test", OpenOptions::new()).unwrap();
    store.save_store().unwrap();

    // When: It is reopened under a different name
    let err = ObjectStore::open(
        &root,
        "other",
        OpenOptions::new().with_store_uuid(store.store_uuid()),
    )
    .unwrap_err();

    // Then: The open is refused with a name-mismatch kind
    assert_eq!(err.kind(), TessErrorKind::NameMismatch);
}

#[test]
fn test_reopen_unknown_uuid_fails() {
    let (_dir, root) = scratch_root();
    let _store = ObjectStore::open(&root, "test", OpenOptions::new()).unwrap();

    let err = ObjectStore::open(
        &root,
        "test",
        OpenOptions::new().with_store_uuid("not-a-store"),
    )
    .unwrap_err();
    assert_eq!(err.kind(), TessErrorKind::NotFound);
}

#[test]
fn test_algorithm_persisted_in_manifest() {
    // Given: A store created with sha256 addressing
    let (_dir, root) = scratch_root();
    let mut store = ObjectStore::open(
        &root,
        "test",
        OpenOptions::new().with_algorithm("sha256"),
    )
    .unwrap();

    let meta = store
        .register_content(
            b"payload",
            ObjectInfo::Config(ConfigInfo::default()),
            ContentCtx::new(),
        )
        .unwrap();
    assert_eq!(meta.uuid.len(), 64);
    store.save_store().unwrap();

    // When: It is reopened without repeating the algorithm option
    let reopened = ObjectStore::open(
        &root,
        "test",
        OpenOptions::new().with_store_uuid(store.store_uuid()),
    )
    .unwrap();

    // Then: The persisted algorithm is restored
    assert_eq!(reopened.algorithm(), DigestAlgorithm::Sha256);
}

#[test]
fn test_store_aux_attributes_round_trip() {
    let (_dir, root) = scratch_root();
    let mut store = ObjectStore::open(&root, "test", OpenOptions::new()).unwrap();
    store
        .aux_mut()
        .insert("owner".into(), "nightly-pipeline".into());
    store.save_store().unwrap();

    let reopened = ObjectStore::open(
        &root,
        "test",
        OpenOptions::new().with_store_uuid(store.store_uuid()),
    )
    .unwrap();
    assert_eq!(
        reopened.aux().unwrap().get("owner").map(String::as_str),
        Some("nightly-pipeline")
    );
}

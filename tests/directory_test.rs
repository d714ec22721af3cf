//! Tests for resolving and installing locations in a [`LocationDirectory`], and for its persisted form.

use sysvar_cache::{
    codec::{self, DecodeError},
    directory::{DirectoryError, LocationDirectory},
    types::data_types::{BlockHeight, DeferredChange, NamespacedKey},
};

fn loc(namespace: &str, key: &str) -> NamespacedKey {
    NamespacedKey::new(namespace.as_bytes(), key.as_bytes())
}

fn height(int: u64) -> BlockHeight {
    BlockHeight::new(int)
}

/// A directory in which "fee" moves from `old/fee` to `new/fee` at height 10.
fn migrating_directory() -> LocationDirectory {
    let mut directory = LocationDirectory::new();
    directory
        .install("fee", loc("old", "fee"), height(0), height(1))
        .unwrap();
    directory
        .install("fee", loc("new", "fee"), height(5), height(10))
        .unwrap();
    directory
}

#[test]
fn resolve_switches_to_future_at_change_on() {
    let directory = migrating_directory();

    assert_eq!(directory.resolve("fee", height(5)), Ok(&loc("old", "fee")));
    assert_eq!(directory.resolve("fee", height(9)), Ok(&loc("old", "fee")));
    assert_eq!(directory.resolve("fee", height(10)), Ok(&loc("new", "fee")));
    assert_eq!(directory.resolve("fee", height(u64::MAX)), Ok(&loc("new", "fee")));
}

#[test]
fn resolve_is_deterministic() {
    let directory = migrating_directory();
    let decoded = LocationDirectory::from_bytes(&directory.to_bytes().unwrap()).unwrap();

    for h in [0, 9, 10, 11] {
        let first = directory.resolve("fee", height(h)).unwrap().clone();
        let second = directory.resolve("fee", height(h)).unwrap().clone();
        let on_another_node = decoded.resolve("fee", height(h)).unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(first, on_another_node);
    }
}

#[test]
fn resolve_unknown_name_is_not_found() {
    let directory = migrating_directory();

    assert_eq!(
        directory.resolve("gas_limit", height(3)),
        Err(DirectoryError::NotFound {
            name: "gas_limit".to_string()
        })
    );
}

#[test]
fn install_new_name_sets_both_locations() {
    let mut directory = LocationDirectory::new();
    directory
        .install("gas_limit", loc("params", "gas"), height(100), height(200))
        .unwrap();

    let record = directory.get("gas_limit").unwrap();
    assert_eq!(record.current(), &loc("params", "gas"));
    assert_eq!(record.future(), &loc("params", "gas"));
    assert_eq!(record.change_on(), height(200));

    for h in [0, 100, 199, 200, 1_000_000] {
        assert_eq!(directory.resolve("gas_limit", height(h)), Ok(&loc("params", "gas")));
    }
}

#[test]
fn install_keeps_location_resolved_at_current_height() {
    let mut directory = migrating_directory();

    // The move to `new/fee` has taken effect by height 12, so it becomes the current location.
    directory
        .install("fee", loc("newer", "fee"), height(12), height(20))
        .unwrap();

    assert_eq!(
        directory.get("fee"),
        Some(&DeferredChange::new(
            loc("new", "fee"),
            loc("newer", "fee"),
            height(20)
        ))
    );
    assert_eq!(directory.resolve("fee", height(19)), Ok(&loc("new", "fee")));
    assert_eq!(directory.resolve("fee", height(20)), Ok(&loc("newer", "fee")));
}

#[test]
fn install_over_pending_change_replaces_it() {
    let mut directory = migrating_directory();

    // The move to `new/fee` has not taken effect by height 7, so it is dropped.
    directory
        .install("fee", loc("newer", "fee"), height(7), height(15))
        .unwrap();

    assert_eq!(directory.resolve("fee", height(12)), Ok(&loc("old", "fee")));
    assert_eq!(directory.resolve("fee", height(15)), Ok(&loc("newer", "fee")));
}

#[test]
fn install_rejects_change_not_in_future() {
    let mut directory = migrating_directory();
    let before = directory.clone();

    for change_on in [3, 4] {
        assert_eq!(
            directory.install("fee", loc("newer", "fee"), height(4), height(change_on)),
            Err(DirectoryError::ChangeNotInFuture {
                name: "fee".to_string(),
                current_height: height(4),
                change_on: height(change_on),
            })
        );
    }
    assert_eq!(directory, before);
}

#[test]
fn remove_drops_record() {
    let mut directory = migrating_directory();

    assert!(directory.remove("fee").is_some());
    assert!(!directory.contains("fee"));
    assert!(directory.is_empty());
    assert!(directory.remove("fee").is_none());
}

#[test]
fn directory_survives_persistence() {
    let mut directory = migrating_directory();
    directory
        .install("gas_limit", loc("params", "gas"), height(0), height(1))
        .unwrap();

    let bytes = directory.to_bytes().unwrap();
    let decoded = LocationDirectory::from_bytes(&bytes).unwrap();

    assert_eq!(decoded, directory);
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded.to_bytes().unwrap(), bytes);
}

#[test]
fn records_survive_persistence() {
    let record = DeferredChange::new(loc("old", "fee"), loc("new", "fee"), height(10));

    let decoded: DeferredChange = codec::decode_exact(&codec::encode(&record).unwrap()).unwrap();
    assert_eq!(decoded, record);

    let key = loc("", "");
    let decoded: NamespacedKey = codec::decode_exact(&codec::encode(&key).unwrap()).unwrap();
    assert_eq!(decoded, key);
}

#[test]
fn from_bytes_rejects_trailing_data() {
    let mut bytes = migrating_directory().to_bytes().unwrap();
    bytes.extend_from_slice(&[0, 1, 2]);

    match LocationDirectory::from_bytes(&bytes) {
        Err(DecodeError::TrailingData { remaining }) => assert_eq!(remaining, 3),
        other => panic!("expected TrailingData, got {:?}", other),
    }
}

#[test]
fn from_bytes_rejects_truncated_directory() {
    let bytes = migrating_directory().to_bytes().unwrap();

    match LocationDirectory::from_bytes(&bytes[..bytes.len() - 1]) {
        Err(DecodeError::Malformed(_)) => (),
        other => panic!("expected Malformed, got {:?}", other),
    }
}

#[test]
fn iter_is_ordered_by_name() {
    let mut directory = LocationDirectory::new();
    for name in ["c", "a", "b"] {
        directory
            .install(name, loc("params", name), height(0), height(1))
            .unwrap();
    }

    let names: Vec<&String> = directory.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["a", "b", "c"]);

    let resolved = directory.resolve_all(height(0));
    assert_eq!(
        resolved,
        vec![
            ("a".to_string(), loc("params", "a")),
            ("b".to_string(), loc("params", "b")),
            ("c".to_string(), loc("params", "c")),
        ]
    );
}

#[test]
fn install_at_extreme_heights() {
    let mut directory = LocationDirectory::new();
    directory
        .install("fee", loc("old", "fee"), height(0), height(1))
        .unwrap();
    directory
        .install("fee", loc("new", "fee"), height(5), height(u64::MAX))
        .unwrap();
    assert_eq!(directory.resolve("fee", height(u64::MAX - 1)), Ok(&loc("old", "fee")));
    assert_eq!(directory.resolve("fee", height(u64::MAX)), Ok(&loc("new", "fee")));

    // No height comes after the last one.
    assert!(matches!(
        directory.install("fee", loc("new", "fee"), height(u64::MAX), height(u64::MAX)),
        Err(DirectoryError::ChangeNotInFuture { .. })
    ));
}

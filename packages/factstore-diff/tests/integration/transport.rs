//! Cache round trips and the overflow path.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use factstore_diff::{
    CacheLookup, ChangeDiff, ChangeOp, DiffConfig, FieldMap, FieldValue, MemoryCache,
    TempChangeOpStore,
};

use crate::helpers::{berlin, berlin_write, BERLIN_ID};

#[test]
fn test_save_then_fetch_round_trip() {
    let cache = MemoryCache::new();
    let config = DiffConfig::default();
    let diff = berlin_write().seal().to_change_diff();

    diff.save(&cache, &config).unwrap();
    let fetched = ChangeDiff::fetch(&cache, &config, &berlin());
    assert_eq!(fetched, CacheLookup::Hit(diff));
}

#[test]
fn test_fetch_unknown_subject_is_a_miss() {
    let cache = MemoryCache::new();
    let config = DiffConfig::default();
    let fetched = ChangeDiff::fetch(&cache, &config, &berlin());
    assert_eq!(fetched, CacheLookup::Miss);
}

#[test]
fn test_fetch_with_wrong_key_is_corrupt() {
    let cache = MemoryCache::new();
    let config = DiffConfig::default();
    berlin_write()
        .seal()
        .to_change_diff()
        .save(&cache, &config)
        .unwrap();

    let other = DiffConfig {
        auth_key: b"rotated".to_vec(),
        ..DiffConfig::default()
    };
    assert_eq!(ChangeDiff::fetch(&cache, &other, &berlin()), CacheLookup::Corrupt);
}

#[test]
fn test_overflow_spill_load_delete_cycle() {
    let cache = Arc::new(MemoryCache::new());
    let store = TempChangeOpStore::new(cache, DiffConfig::default());
    let sealed = berlin_write().seal();

    let slot = store.create_slot_from(&sealed).unwrap().unwrap();
    assert_eq!(store.load(&slot), CacheLookup::Hit(sealed));

    store.delete(&slot);
    store.delete(&slot);
    assert_eq!(store.load(&slot), CacheLookup::Miss);
}

#[test]
fn test_empty_write_spills_nothing() {
    let cache = Arc::new(MemoryCache::new());
    let store = TempChangeOpStore::new(cache.clone(), DiffConfig::default());
    let sealed = ChangeOp::new(berlin()).seal();

    assert_eq!(store.create_slot_from(&sealed).unwrap(), None);
    assert!(cache.is_empty());
}

#[test]
fn test_identical_writes_share_a_slot() {
    let cache = Arc::new(MemoryCache::new());
    let store = TempChangeOpStore::new(cache.clone(), DiffConfig::default());

    let first = berlin_write().seal();
    let second = berlin_write().seal();
    assert_eq!(
        store.slot_key(&first).unwrap(),
        store.slot_key(&second).unwrap()
    );

    store.create_slot_from(&first).unwrap().unwrap();
    store.create_slot_from(&second).unwrap().unwrap();
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_signed_integer_rows_survive_round_trip() {
    // Rows produced from signed columns carry `Int` values; the decoded side
    // of any round trip holds `Uint` for the non-negative ones.
    let mut op = ChangeOp::new(berlin());
    op.add_diff_op(
        BTreeMap::from([(
            "smw_di_number".to_string(),
            vec![FieldMap::from([
                ("s_id".to_string(), FieldValue::Int(BERLIN_ID as i64)),
                ("p_id".to_string(), FieldValue::Int(61)),
                ("o_number".to_string(), FieldValue::Int(-40)),
            ])],
        )]),
        BTreeMap::new(),
    );
    let sealed = op.seal();

    // The id walk accepts non-negative signed ids; -40 is not an id.
    assert_eq!(
        sealed.changed_entity_ids(None),
        BTreeSet::from([61, BERLIN_ID])
    );

    let cache = MemoryCache::new();
    let config = DiffConfig::default();
    let diff = sealed.to_change_diff();
    diff.save(&cache, &config).unwrap();
    assert_eq!(
        ChangeDiff::fetch(&cache, &config, &berlin()),
        CacheLookup::Hit(diff)
    );

    let store = TempChangeOpStore::new(Arc::new(MemoryCache::new()), DiffConfig::default());
    let slot = store.create_slot_from(&sealed).unwrap().unwrap();
    assert_eq!(store.load(&slot), CacheLookup::Hit(sealed));
}

#[test]
fn test_racing_writers_last_write_wins_per_subject() {
    let cache = MemoryCache::new();
    let config = DiffConfig::default();

    let first = berlin_write().seal().to_change_diff();
    first.save(&cache, &config).unwrap();

    let mut later = berlin_write();
    later.add_property_list(std::collections::BTreeMap::from([(
        "Mayor".to_string(),
        90,
    )]));
    let second = later.seal().to_change_diff();
    second.save(&cache, &config).unwrap();

    assert_eq!(
        ChangeDiff::fetch(&cache, &config, &berlin()),
        CacheLookup::Hit(second)
    );
}

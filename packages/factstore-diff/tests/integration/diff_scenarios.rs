//! Ordered-view and changed-id derivation over realistic writes.

use std::collections::{BTreeMap, BTreeSet};

use factstore_diff::{ChangeOp, OpType};

use crate::helpers::{berlin_write, number_row, BERLIN_ID};

#[test]
fn test_berlin_write_ordered_diff_contains_exactly_touched_tables() {
    let sealed = berlin_write().seal();

    let tables: Vec<&str> = sealed.ordered_diff().keys().map(String::as_str).collect();
    assert_eq!(tables, vec!["smw_di_number", "smw_fpt_mdat"]);

    let number_diff = sealed.ordered_diff_for("smw_di_number").unwrap();
    assert_eq!(number_diff.insert.len(), 2);
    assert!(number_diff.delete.is_empty());
}

#[test]
fn test_berlin_write_insert_ids() {
    let sealed = berlin_write().seal();
    assert_eq!(
        sealed.changed_entity_ids(Some(OpType::Insert)),
        BTreeSet::from([61, 62, BERLIN_ID])
    );
}

#[test]
fn test_berlin_write_unfiltered_ids_include_fixed_property() {
    let sealed = berlin_write().seal();
    let ids = sealed.changed_entity_ids(None);
    assert!(ids.contains(&29));
    assert_eq!(ids, BTreeSet::from([29, 61, 62, BERLIN_ID]));
    assert_eq!(sealed.changed_entity_id_summary(), vec![29, 61, 62, BERLIN_ID]);
}

#[test]
fn test_delete_ids_are_separate_from_insert_ids() {
    let mut op = ChangeOp::new(crate::helpers::berlin());
    op.add_diff_op(
        BTreeMap::from([("smw_di_number".to_string(), vec![number_row(BERLIN_ID, 61, 2.0)])]),
        BTreeMap::from([("smw_di_number".to_string(), vec![number_row(BERLIN_ID, 77, 1.0)])]),
    );
    let sealed = op.seal();

    assert_eq!(
        sealed.changed_entity_ids(Some(OpType::Insert)),
        BTreeSet::from([61, BERLIN_ID])
    );
    assert_eq!(
        sealed.changed_entity_ids(Some(OpType::Delete)),
        BTreeSet::from([77, BERLIN_ID])
    );
}

#[test]
fn test_change_diff_snapshot_matches_sealed_state() {
    let sealed = berlin_write().seal();
    let diff = sealed.to_change_diff();

    assert_eq!(diff.subject(), sealed.subject());
    assert_eq!(diff.table_change_ops().len(), 2);
    assert_eq!(diff.insert_ids(), &[61, 62, BERLIN_ID]);
    assert!(diff.delete_ids().is_empty());
    assert_eq!(diff.property_list().get("Population"), Some(&61));
    assert_eq!(diff.changed_entity_id_summary(), vec![61, 62, BERLIN_ID]);
}

#[test]
fn test_table_change_ops_filter_by_table() {
    let sealed = berlin_write().seal();
    let ops = sealed.table_change_ops(Some("smw_fpt_mdat"));
    assert_eq!(ops.len(), 1);
    assert!(ops[0].is_fixed_property_op());
}

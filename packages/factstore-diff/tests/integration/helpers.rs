//! Shared fixtures for the integration suite.

use std::collections::BTreeMap;

use factstore_diff::{ChangeOp, EntityRef, FieldMap, FieldValue, FixedPropertyRecord};

pub const BERLIN_ID: u64 = 3668;

pub fn berlin() -> EntityRef {
    EntityRef::new("Berlin", 0)
}

pub fn number_row(s_id: u64, p_id: u64, value: f64) -> FieldMap {
    FieldMap::from([
        ("s_id".to_string(), FieldValue::Uint(s_id)),
        ("p_id".to_string(), FieldValue::Uint(p_id)),
        ("o_number".to_string(), FieldValue::Float(value)),
    ])
}

pub fn mdat_row(s_id: u64, serialized: &str) -> FieldMap {
    FieldMap::from([
        ("s_id".to_string(), FieldValue::Uint(s_id)),
        ("o_serialized".to_string(), FieldValue::Text(serialized.to_string())),
    ])
}

/// A write to `Berlin` inserting two number facts and touching the fixed
/// modification-date table.
pub fn berlin_write() -> ChangeOp {
    let mut op = ChangeOp::new(berlin());
    op.add_diff_op(
        BTreeMap::from([(
            "smw_di_number".to_string(),
            vec![
                number_row(BERLIN_ID, 61, 3_500_000.0),
                number_row(BERLIN_ID, 62, 891.0),
            ],
        )]),
        BTreeMap::new(),
    );
    op.add_diff_op(
        BTreeMap::from([(
            "smw_fpt_mdat".to_string(),
            vec![mdat_row(BERLIN_ID, "1/2026/8/28")],
        )]),
        BTreeMap::new(),
    );
    op.add_fixed_property_record(
        "smw_fpt_mdat",
        FixedPropertyRecord {
            key: "_MDAT".to_string(),
            p_id: 29,
        },
    );
    op.add_property_list(BTreeMap::from([
        ("Population".to_string(), 61),
        ("Area".to_string(), 62),
    ]));
    op
}

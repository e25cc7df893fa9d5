//! Per-table grouping of field change operations.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{FieldMap, FieldValue};

use super::field_change_op::FieldChangeOp;

/// Kind of a row-level change operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpType {
    /// Row inserted by the write
    Insert,
    /// Row deleted by the write
    Delete,
}

/// Descriptor marking that a table stores a fixed (internally predefined)
/// property rather than one resolved through a generic property-id join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedPropertyRecord {
    /// Internal property key (e.g. `_MDAT`)
    pub key: String,
    /// The property's own entity id
    pub p_id: u64,
}

/// Row filter keyed by field name, e.g. subject ids excluded because they
/// are reported elsewhere (redirects).
pub type ExcludeFilter = BTreeMap<String, BTreeSet<u64>>;

/// Merged change operations for one table.
///
/// `flat` carries the legacy shape where rows are not split into insert and
/// delete lists; it is only read when both lists are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDiff {
    /// Fixed-property descriptor, when the table stores a fixed property
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<FixedPropertyRecord>,
    /// Inserted rows, in original order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insert: Vec<FieldMap>,
    /// Deleted rows, in original order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delete: Vec<FieldMap>,
    /// Legacy flat operation set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flat: Vec<FieldMap>,
}

impl TableDiff {
    /// Returns `true` when the merged insert, delete, flat, and property
    /// parts are all absent.
    pub fn is_empty(&self) -> bool {
        self.property.is_none() && self.insert.is_empty() && self.delete.is_empty() && self.flat.is_empty()
    }
}

/// Change operations for one table of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableChangeOp {
    table_name: String,
    diff: TableDiff,
}

impl TableChangeOp {
    /// Creates a table change op from a merged per-table diff.
    pub fn new(table_name: impl Into<String>, diff: TableDiff) -> Self {
        Self {
            table_name: table_name.into(),
            diff,
        }
    }

    /// Returns the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns `true` when this table stores a fixed property.
    pub fn is_fixed_property_op(&self) -> bool {
        self.diff.property.is_some()
    }

    /// Returns a field of the fixed-property descriptor (`key` or `p_id`).
    pub fn fixed_property_value_by_field(&self, field: &str) -> Option<FieldValue> {
        let record = self.diff.property.as_ref()?;
        match field {
            "key" => Some(FieldValue::Text(record.key.clone())),
            "p_id" => Some(FieldValue::Uint(record.p_id)),
            _ => None,
        }
    }

    /// Returns `true` when rows of the given kind are present.
    pub fn has_change_op(&self, op_type: OpType) -> bool {
        !self.rows(op_type).is_empty()
    }

    /// Returns the field change ops of this table.
    ///
    /// With no `op_type` filter, delete ops come before insert ops; an
    /// insert may reuse a key just freed by a delete, so consumers that
    /// materialize rows directly rely on this order. When neither list is
    /// present the legacy flat operation set is returned.
    ///
    /// Rows whose filtered field value appears in `exclude` are skipped.
    /// Every returned row has `p_id` injected from the fixed-property
    /// descriptor when one is present.
    pub fn field_change_ops(
        &self,
        op_type: Option<OpType>,
        exclude: Option<&ExcludeFilter>,
    ) -> Vec<FieldChangeOp> {
        match op_type {
            Some(op) => self.collect_rows(self.rows(op), exclude),
            None => {
                if self.diff.insert.is_empty() && self.diff.delete.is_empty() {
                    self.collect_rows(&self.diff.flat, exclude)
                } else {
                    let mut ops = self.collect_rows(&self.diff.delete, exclude);
                    ops.extend(self.collect_rows(&self.diff.insert, exclude));
                    ops
                }
            }
        }
    }

    /// Returns the canonical `{table_name: diff}` encoding.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({ self.table_name.clone(): &self.diff })
    }

    fn rows(&self, op_type: OpType) -> &[FieldMap] {
        match op_type {
            OpType::Insert => &self.diff.insert,
            OpType::Delete => &self.diff.delete,
        }
    }

    fn collect_rows(&self, rows: &[FieldMap], exclude: Option<&ExcludeFilter>) -> Vec<FieldChangeOp> {
        rows.iter()
            .filter(|row| !is_excluded(row, exclude))
            .map(|row| {
                let mut op = FieldChangeOp::new(row.clone());
                if let Some(record) = &self.diff.property {
                    op.set("p_id", FieldValue::Uint(record.p_id));
                }
                op
            })
            .collect()
    }
}

impl fmt::Display for TableChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

fn is_excluded(row: &FieldMap, exclude: Option<&ExcludeFilter>) -> bool {
    let Some(filter) = exclude else {
        return false;
    };
    filter.iter().any(|(field, ids)| {
        row.get(field)
            .and_then(FieldValue::as_entity_id)
            .is_some_and(|id| ids.contains(&id))
    })
}

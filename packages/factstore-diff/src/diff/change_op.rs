//! Transaction-scoped change aggregation.
//!
//! A [`ChangeOp`] is owned by exactly one write transaction. It accumulates
//! diff groups, fixed-property metadata, full-entity snapshots, and the
//! transaction's property list, then is sealed into a [`SealedChangeOp`]
//! whose canonical ordered-by-table view is computed exactly once. Sealing
//! consumes the builder, so late mutation after the first read cannot
//! compile.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::entity::EntityRef;
use crate::error::DiffError;
use crate::value::FieldMap;

use super::change_diff::ChangeDiff;
use super::table_change_op::{FixedPropertyRecord, OpType, TableChangeOp, TableDiff};

/// Per-table row lists keyed by table name.
pub type TableRows = BTreeMap<String, Vec<FieldMap>>;

/// One `{insert, delete}` pair of per-table row lists from one table's
/// before/after comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffGroup {
    /// Rows inserted, per table
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub insert: TableRows,
    /// Rows deleted, per table
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub delete: TableRows,
}

/// Accumulator for all change operations of one write transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeOp {
    subject: EntityRef,
    diff: Vec<DiffGroup>,
    fixed_property_records: BTreeMap<String, FixedPropertyRecord>,
    property_list: BTreeMap<String, u64>,
    data_ops: BTreeMap<String, TableRows>,
    text_items: BTreeMap<u64, Vec<String>>,
    capture_text_items: bool,
}

impl ChangeOp {
    /// Creates an empty change op for a subject.
    pub fn new(subject: EntityRef) -> Self {
        Self::with_initial_diff(subject, Vec::new())
    }

    /// Creates a change op seeded with already-computed diff groups.
    pub fn with_initial_diff(subject: EntityRef, diff: Vec<DiffGroup>) -> Self {
        Self {
            subject,
            diff,
            fixed_property_records: BTreeMap::new(),
            property_list: BTreeMap::new(),
            data_ops: BTreeMap::new(),
            text_items: BTreeMap::new(),
            capture_text_items: false,
        }
    }

    /// Returns the subject of the write transaction.
    pub fn subject(&self) -> &EntityRef {
        &self.subject
    }

    /// Gates whether [`ChangeOp::add_text_items`] stores anything, so large
    /// payloads are not retained when no consumer needs them.
    pub fn set_text_items_flag(&mut self, capture: bool) {
        self.capture_text_items = capture;
    }

    /// Records that a table stores a fixed property.
    pub fn add_fixed_property_record(&mut self, table: impl Into<String>, record: FixedPropertyRecord) {
        self.fixed_property_records.insert(table.into(), record);
    }

    /// Merges property label to id mappings into the transaction-wide list.
    pub fn add_property_list(&mut self, properties: BTreeMap<String, u64>) {
        self.property_list.extend(properties);
    }

    /// Records a full current-state snapshot, independent of the
    /// incremental diff.
    pub fn add_data_op(&mut self, hash: impl Into<String>, tables: TableRows) {
        self.data_ops.insert(hash.into(), tables);
    }

    /// Appends one `{insert, delete}` group; called once per table touched
    /// by the write.
    pub fn add_diff_op(&mut self, insert: TableRows, delete: TableRows) {
        self.diff.push(DiffGroup { insert, delete });
    }

    /// Stores text items for an id when capture is enabled.
    pub fn add_text_items(&mut self, id: u64, items: Vec<String>) {
        if self.capture_text_items {
            self.text_items.insert(id, items);
        }
    }

    /// Seals the accumulated state, computing the canonical ordered-by-table
    /// view. All mutation must happen before this point.
    pub fn seal(self) -> SealedChangeOp {
        let mut ordered: BTreeMap<String, TableDiff> = BTreeMap::new();

        for group in &self.diff {
            for (table, rows) in &group.insert {
                ordered
                    .entry(table.clone())
                    .or_default()
                    .insert
                    .extend(rows.iter().cloned());
            }
            for (table, rows) in &group.delete {
                ordered
                    .entry(table.clone())
                    .or_default()
                    .delete
                    .extend(rows.iter().cloned());
            }
        }

        for (table, record) in &self.fixed_property_records {
            ordered.entry(table.clone()).or_default().property = Some(record.clone());
        }

        ordered.retain(|_, diff| !diff.is_empty());

        SealedChangeOp {
            subject: self.subject,
            ordered,
            fixed_property_records: self.fixed_property_records,
            property_list: self.property_list,
            data_ops: self.data_ops,
            text_items: self.text_items,
        }
    }
}

/// Read-only view of a finished change op.
///
/// Write-once/read-many: this is the form that crosses the hand-off boundary
/// into asynchronous consumers, either as a [`ChangeDiff`] or spilled into
/// the overflow store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealedChangeOp {
    subject: EntityRef,
    ordered: BTreeMap<String, TableDiff>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    fixed_property_records: BTreeMap<String, FixedPropertyRecord>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    property_list: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    data_ops: BTreeMap<String, TableRows>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    text_items: BTreeMap<u64, Vec<String>>,
}

impl SealedChangeOp {
    /// Returns the subject of the write transaction.
    pub fn subject(&self) -> &EntityRef {
        &self.subject
    }

    /// Returns the canonical ordered-by-table diff. Tables whose merged
    /// insert, delete, and property parts are all empty are absent.
    pub fn ordered_diff(&self) -> &BTreeMap<String, TableDiff> {
        &self.ordered
    }

    /// Returns the merged diff of a single table, if it changed.
    pub fn ordered_diff_for(&self, table: &str) -> Option<&TableDiff> {
        self.ordered.get(table)
    }

    /// Returns `true` when the ordered diff holds nothing worth notifying
    /// consumers about.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Returns the transaction-wide property label to id list.
    pub fn property_list(&self) -> &BTreeMap<String, u64> {
        &self.property_list
    }

    /// Returns stored text items, keyed by id.
    pub fn text_items(&self) -> &BTreeMap<u64, Vec<String>> {
        &self.text_items
    }

    /// Builds table change ops from the ordered view, optionally for one
    /// table only.
    pub fn table_change_ops(&self, table: Option<&str>) -> Vec<TableChangeOp> {
        self.ordered
            .iter()
            .filter(|(name, _)| table.is_none_or(|t| t == name.as_str()))
            .map(|(name, diff)| TableChangeOp::new(name.clone(), diff.clone()))
            .collect()
    }

    /// Builds table change ops from the full-entity snapshots, with the same
    /// fixed-property injection as the incremental view.
    pub fn data_ops(&self) -> Vec<TableChangeOp> {
        self.data_ops
            .values()
            .flat_map(|tables| {
                tables.iter().map(|(name, rows)| {
                    let diff = TableDiff {
                        property: self.fixed_property_records.get(name).cloned(),
                        flat: rows.clone(),
                        ..Default::default()
                    };
                    TableChangeOp::new(name.clone(), diff)
                })
            })
            .collect()
    }

    /// Collects every subject/property/object id referenced by rows of the
    /// given kind into a deduplicated set.
    ///
    /// With no filter, both kinds count, and a fixed-property table always
    /// contributes its own `p_id` even when its row lists are empty:
    /// updating a fixed property's own table is itself a change to that
    /// property entity.
    pub fn changed_entity_ids(&self, op_type: Option<OpType>) -> BTreeSet<u64> {
        let mut ids = BTreeSet::new();

        for diff in self.ordered.values() {
            match op_type {
                Some(OpType::Insert) => collect_row_ids(&diff.insert, &mut ids),
                Some(OpType::Delete) => collect_row_ids(&diff.delete, &mut ids),
                None => {
                    collect_row_ids(&diff.insert, &mut ids);
                    collect_row_ids(&diff.delete, &mut ids);
                    collect_row_ids(&diff.flat, &mut ids);
                    if let Some(record) = &diff.property {
                        ids.insert(record.p_id);
                    }
                }
            }
        }

        ids
    }

    /// Returns the single artifact handed to invalidation consumers: every
    /// changed entity id, deduplicated and ordered.
    pub fn changed_entity_id_summary(&self) -> Vec<u64> {
        self.changed_entity_ids(None).into_iter().collect()
    }

    /// Content hash of the canonical encoding, used for content-addressed
    /// overflow slots.
    pub fn content_hash(&self) -> Result<String, DiffError> {
        let payload = serde_json::to_vec(self)
            .map_err(|e| DiffError::SerializationError(e.to_string()))?;
        Ok(codec::content_hash(&payload))
    }

    /// Seals the current state into an immutable [`ChangeDiff`] snapshot,
    /// including both precomputed id lists.
    pub fn to_change_diff(&self) -> ChangeDiff {
        ChangeDiff::new(
            self.subject.clone(),
            self.table_change_ops(None),
            self.property_list.clone(),
            self.changed_entity_ids(Some(OpType::Insert)).into_iter().collect(),
            self.changed_entity_ids(Some(OpType::Delete)).into_iter().collect(),
        )
    }
}

fn collect_row_ids(rows: &[FieldMap], ids: &mut BTreeSet<u64>) {
    const ID_FIELDS: [&str; 3] = ["s_id", "p_id", "o_id"];

    for row in rows {
        for field in ID_FIELDS {
            if let Some(id) = row.get(field).and_then(crate::value::FieldValue::as_entity_id) {
                ids.insert(id);
            }
        }
    }
}

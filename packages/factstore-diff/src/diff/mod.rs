//! Change-op aggregation, canonicalization, and diff snapshots.

mod change_diff;
mod change_op;
mod field_change_op;
mod table_change_op;

pub use change_diff::ChangeDiff;
pub use change_op::{ChangeOp, DiffGroup, SealedChangeOp, TableRows};
pub use field_change_op::FieldChangeOp;
pub use table_change_op::{ExcludeFilter, FixedPropertyRecord, OpType, TableChangeOp, TableDiff};

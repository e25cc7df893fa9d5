//! Change-diff aggregation and transport for a normalized semantic fact store.
//!
//! Aggregates per-table insert/delete operation lists produced by a write,
//! canonicalizes them, derives the set of changed entity ids, and makes the
//! result transportable to asynchronous consumers, with a content-addressed
//! overflow store for diffs too large for the primary transport.

pub mod cache;
pub mod codec;
pub mod config;
pub mod diff;
pub mod entity;
pub mod error;
pub mod spill;
pub mod value;

pub use cache::{Cache, CacheLookup, MemoryCache};
pub use config::DiffConfig;
pub use diff::{
    ChangeDiff, ChangeOp, DiffGroup, ExcludeFilter, FieldChangeOp, FixedPropertyRecord, OpType,
    SealedChangeOp, TableChangeOp, TableDiff, TableRows,
};
pub use entity::EntityRef;
pub use error::DiffError;
pub use spill::TempChangeOpStore;
pub use value::{FieldMap, FieldValue};

//! Diff subsystem error types.

use thiserror::Error;

/// Change-diff operation errors.
///
/// Cache misses are not errors; reads that can miss return
/// [`crate::cache::CacheLookup`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    /// Field not present in a change operation (presence, not nullness)
    #[error("Field '{field}' not found in change operation")]
    MissingField { field: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Authenticated payload rejected before interpretation
    #[error("Integrity failure for cache key '{key}'")]
    IntegrityFailure { key: String },
}

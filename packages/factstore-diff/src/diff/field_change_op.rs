//! Single-row field change operation.

use serde::{Deserialize, Serialize};

use crate::error::DiffError;
use crate::value::{FieldMap, FieldValue};

/// One row's field to value snapshot, the unit a consumer materializes into
/// a row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldChangeOp {
    fields: FieldMap,
}

impl FieldChangeOp {
    /// Creates a field change op from an initial row snapshot.
    pub fn new(initial: FieldMap) -> Self {
        Self { fields: initial }
    }

    /// Sets a field value, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    /// Returns `true` when the field is present, regardless of its value.
    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns the value of a field.
    ///
    /// # Returns
    /// `Result<&FieldValue, DiffError>`, failing with
    /// [`DiffError::MissingField`] when the field is absent. Presence, not
    /// nullness, is tested.
    pub fn get(&self, key: &str) -> Result<&FieldValue, DiffError> {
        self.fields.get(key).ok_or_else(|| DiffError::MissingField {
            field: key.to_string(),
        })
    }

    /// Returns all fields of the row.
    pub fn get_all(&self) -> &FieldMap {
        &self.fields
    }
}

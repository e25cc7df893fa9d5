//! Scalar field values stored in table rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One row's field name to value snapshot.
///
/// Ordered map so that serialized encodings are canonical for hashing.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Scalar value of a single table field.
///
/// The untagged encoding writes integers as plain JSON numbers, which erases
/// signedness for non-negative values: a decoded non-negative integer is
/// always `Uint`. Equality therefore compares integers numerically across
/// the `Uint`/`Int` variants, so a value survives an encode/decode cycle
/// deep-equal to the original.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean flag
    Bool(bool),
    /// Unsigned integer (ids, counts)
    Uint(u64),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text value (serialized values, sort keys)
    Text(String),
}

impl FieldValue {
    /// Interprets the value as an entity id, if it is a non-negative integer.
    pub fn as_entity_id(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            Self::Int(v) if *v >= 0 => Some(*v as u64),
            _ => None,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Uint(a), Self::Uint(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Uint(a), Self::Int(b)) | (Self::Int(b), Self::Uint(a)) => {
                i64::try_from(*a).is_ok_and(|a| a == *b)
            }
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        // Non-negative integers take the canonical decoded variant.
        match u64::try_from(v) {
            Ok(v) => Self::Uint(v),
            Err(_) => Self::Int(v),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

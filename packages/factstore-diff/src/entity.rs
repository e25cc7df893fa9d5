//! Entity references addressing subjects in the store.

use serde::{Deserialize, Serialize};

/// Reference to an entity (a subject/object in the store).
///
/// # Invariants
/// - `hash()` is stable for a given (dbkey, namespace, subobject) triple and
///   is the only form of this reference used in cache-key derivation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Canonical database key (e.g. page title with underscores)
    dbkey: String,
    /// Namespace identifier
    namespace: i32,
    /// Subobject discriminator, empty for the page itself
    subobject: String,
}

impl EntityRef {
    /// Creates a reference to a page-level entity.
    pub fn new(dbkey: impl Into<String>, namespace: i32) -> Self {
        Self {
            dbkey: dbkey.into(),
            namespace,
            subobject: String::new(),
        }
    }

    /// Creates a reference to a subobject of a page.
    pub fn with_subobject(dbkey: impl Into<String>, namespace: i32, subobject: impl Into<String>) -> Self {
        Self {
            dbkey: dbkey.into(),
            namespace,
            subobject: subobject.into(),
        }
    }

    /// Returns the canonical database key.
    pub fn dbkey(&self) -> &str {
        &self.dbkey
    }

    /// Returns the namespace identifier.
    pub fn namespace(&self) -> i32 {
        self.namespace
    }

    /// Returns the subobject discriminator.
    pub fn subobject(&self) -> &str {
        &self.subobject
    }

    /// Returns the stable hash string used for equality and cache keys.
    pub fn hash(&self) -> String {
        format!("{}#{}#{}", self.dbkey, self.namespace, self.subobject)
    }
}

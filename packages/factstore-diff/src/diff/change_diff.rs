//! Immutable, cache-serializable diff snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cache::{Cache, CacheLookup};
use crate::codec;
use crate::config::DiffConfig;
use crate::entity::EntityRef;
use crate::error::DiffError;

use super::table_change_op::TableChangeOp;

const DIFF_KEY_NAMESPACE: &str = "factstore:store:diff:";

/// Immutable snapshot built from a finished change op; the artifact handed
/// to consumers. Produced once, never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeDiff {
    subject: EntityRef,
    table_change_ops: Vec<TableChangeOp>,
    property_list: BTreeMap<String, u64>,
    insert_ids: Vec<u64>,
    delete_ids: Vec<u64>,
}

impl ChangeDiff {
    /// Creates a diff snapshot from its already-derived parts.
    pub fn new(
        subject: EntityRef,
        table_change_ops: Vec<TableChangeOp>,
        property_list: BTreeMap<String, u64>,
        insert_ids: Vec<u64>,
        delete_ids: Vec<u64>,
    ) -> Self {
        Self {
            subject,
            table_change_ops,
            property_list,
            insert_ids,
            delete_ids,
        }
    }

    /// Returns the subject of the write that produced this diff.
    pub fn subject(&self) -> &EntityRef {
        &self.subject
    }

    /// Returns the canonical per-table change ops.
    pub fn table_change_ops(&self) -> &[TableChangeOp] {
        &self.table_change_ops
    }

    /// Returns the property label to id list.
    pub fn property_list(&self) -> &BTreeMap<String, u64> {
        &self.property_list
    }

    /// Returns the property list flipped to id to label.
    pub fn property_list_flipped(&self) -> BTreeMap<u64, String> {
        self.property_list
            .iter()
            .map(|(label, id)| (*id, label.clone()))
            .collect()
    }

    /// Returns the ids referenced by inserted rows.
    pub fn insert_ids(&self) -> &[u64] {
        &self.insert_ids
    }

    /// Returns the ids referenced by deleted rows.
    pub fn delete_ids(&self) -> &[u64] {
        &self.delete_ids
    }

    /// Returns every changed entity id, deduplicated and ordered; the
    /// artifact consumed by invalidation consumers.
    pub fn changed_entity_id_summary(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .insert_ids
            .iter()
            .chain(self.delete_ids.iter())
            .copied()
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Serializes the diff into an authenticated frame.
    pub fn serialize(&self, auth_key: &[u8]) -> Result<Vec<u8>, DiffError> {
        let payload =
            serde_json::to_vec(self).map_err(|e| DiffError::SerializationError(e.to_string()))?;
        Ok(codec::seal_frame(auth_key, &payload))
    }

    /// Authenticates and deserializes a framed diff.
    pub fn deserialize(auth_key: &[u8], framed: &[u8], key: &str) -> Result<Self, DiffError> {
        let payload = codec::open_frame(auth_key, framed).ok_or_else(|| {
            DiffError::IntegrityFailure {
                key: key.to_string(),
            }
        })?;
        serde_json::from_slice(payload).map_err(|e| DiffError::SerializationError(e.to_string()))
    }

    /// Returns the cache key under which the diff for a subject is stored.
    pub fn cache_key(subject: &EntityRef) -> String {
        format!("{}{}", DIFF_KEY_NAMESPACE, codec::subject_hash(&subject.hash()))
    }

    /// Saves the diff under its subject-derived key with the configured TTL.
    pub fn save(&self, cache: &dyn Cache, config: &DiffConfig) -> Result<(), DiffError> {
        let key = Self::cache_key(&self.subject);
        let framed = self.serialize(&config.auth_key)?;
        let bytes = framed.len();
        cache.save(&key, framed, Some(config.diff_ttl));
        tracing::debug!("Saved change diff for subject {} ({} bytes)", self.subject.hash(), bytes);
        Ok(())
    }

    /// Fetches the diff stored for a subject.
    ///
    /// A miss is not a failure; callers must treat it as "recompute or
    /// skip". A payload that fails authentication or decoding is reported
    /// as corrupt so it can be alerted on separately from eviction.
    pub fn fetch(cache: &dyn Cache, config: &DiffConfig, subject: &EntityRef) -> CacheLookup<Self> {
        let key = Self::cache_key(subject);
        let Some(framed) = cache.get(&key) else {
            return CacheLookup::Miss;
        };
        match Self::deserialize(&config.auth_key, &framed, &key) {
            Ok(diff) => CacheLookup::Hit(diff),
            Err(e) => {
                tracing::warn!("Rejected change diff under '{}': {}", key, e);
                CacheLookup::Corrupt
            }
        }
    }
}

//! Content-addressed overflow store for oversized change ops.

use std::sync::Arc;

use crate::cache::{Cache, CacheLookup};
use crate::codec;
use crate::config::DiffConfig;
use crate::diff::SealedChangeOp;
use crate::error::DiffError;

const SLOT_KEY_NAMESPACE: &str = "factstore:diff:";

/// Overflow store used when a change op is too large for the primary
/// transport, whose size ceiling would otherwise cause a hard
/// deserialization failure downstream.
///
/// Slots are content-addressed: re-deriving an identical diff yields an
/// identical slot, so duplicate or retried work collides harmlessly instead
/// of leaking unbounded cache entries. The slot key is an opaque string safe
/// to embed as a task parameter in place of the full diff.
pub struct TempChangeOpStore {
    cache: Arc<dyn Cache>,
    config: DiffConfig,
    prefix: String,
}

impl TempChangeOpStore {
    /// Creates a store over a shared cache backend.
    pub fn new(cache: Arc<dyn Cache>, config: DiffConfig) -> Self {
        Self::with_prefix(cache, config, "")
    }

    /// Creates a store with a key prefix, letting multiple logical stores
    /// share one cache backend.
    pub fn with_prefix(cache: Arc<dyn Cache>, config: DiffConfig, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            config,
            prefix: prefix.into(),
        }
    }

    /// Returns the content-addressed slot key for a sealed change op.
    pub fn slot_key(&self, op: &SealedChangeOp) -> Result<String, DiffError> {
        Ok(format!(
            "{}{}{}",
            self.prefix,
            SLOT_KEY_NAMESPACE,
            op.content_hash()?
        ))
    }

    /// Spills a sealed change op into its slot and returns the key.
    ///
    /// Returns `None` without writing anything when the ordered diff is
    /// empty: there is nothing worth spilling. Concurrent producers racing
    /// on the same slot write byte-equivalent payloads.
    pub fn create_slot_from(&self, op: &SealedChangeOp) -> Result<Option<String>, DiffError> {
        if op.is_empty() {
            return Ok(None);
        }

        let payload =
            serde_json::to_vec(op).map_err(|e| DiffError::SerializationError(e.to_string()))?;
        let framed = codec::seal_frame(&self.config.auth_key, &payload);
        let key = self.slot_key(op)?;
        let bytes = framed.len();
        self.cache.save(&key, framed, Some(self.config.slot_ttl));
        tracing::debug!(
            "Spilled change op for subject {} into slot '{}' ({} bytes)",
            op.subject().hash(),
            key,
            bytes
        );
        Ok(Some(key))
    }

    /// Evicts a slot after a consumer finishes. Idempotent: a crashed
    /// consumer may be retried, and both deletes must succeed.
    pub fn delete(&self, slot: &str) {
        self.cache.delete(slot);
    }

    /// Loads a sealed change op from a slot.
    ///
    /// A miss means the slot expired or was already consumed; callers treat
    /// it as "recompute or skip". Corrupt payloads are reported separately.
    pub fn load(&self, slot: &str) -> CacheLookup<SealedChangeOp> {
        let Some(framed) = self.cache.get(slot) else {
            return CacheLookup::Miss;
        };
        let Some(payload) = codec::open_frame(&self.config.auth_key, &framed) else {
            tracing::warn!("Rejected overflow payload under '{}': digest mismatch", slot);
            return CacheLookup::Corrupt;
        };
        match serde_json::from_slice(payload) {
            Ok(op) => CacheLookup::Hit(op),
            Err(e) => {
                tracing::warn!("Undecodable overflow payload under '{}': {}", slot, e);
                CacheLookup::Corrupt
            }
        }
    }
}

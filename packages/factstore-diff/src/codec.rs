//! Authenticated payload framing for cache-bound bytes.
//!
//! Every payload that crosses the shared cache backend is framed with a keyed
//! digest so a later read can reject tampered or corrupted bytes before
//! interpreting them.

use sha2::{Digest, Sha256};

const TAG_LEN: usize = 32;

/// Wraps a payload with its keyed digest.
pub fn seal_frame(key: &[u8], payload: &[u8]) -> Vec<u8> {
    let tag = keyed_digest(key, payload);
    let mut framed = Vec::with_capacity(TAG_LEN + payload.len());
    framed.extend_from_slice(&tag);
    framed.extend_from_slice(payload);
    framed
}

/// Authenticates a framed payload and returns the inner bytes.
///
/// Returns `None` when the frame is truncated or the digest does not match.
pub fn open_frame<'a>(key: &[u8], framed: &'a [u8]) -> Option<&'a [u8]> {
    if framed.len() < TAG_LEN {
        return None;
    }
    let (tag, payload) = framed.split_at(TAG_LEN);
    if keyed_digest(key, payload).as_slice() == tag {
        Some(payload)
    } else {
        None
    }
}

/// Hex digest of a payload, used for content-addressed cache keys.
pub fn content_hash(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Hex digest of a subject hash string, used for subject-addressed cache keys.
pub fn subject_hash(subject_hash: &str) -> String {
    hex::encode(Sha256::digest(subject_hash.as_bytes()))
}

fn keyed_digest(key: &[u8], payload: &[u8]) -> [u8; TAG_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(key);
    hasher.update((payload.len() as u64).to_le_bytes());
    hasher.update(payload);
    hasher.finalize().into()
}

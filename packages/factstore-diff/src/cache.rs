//! Pluggable key-value cache backend and typed lookup results.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Key-value cache backend shared across all subjects and writers.
///
/// The only mutation discipline is content/subject-addressed keys with
/// last-write-wins; no locking is required of implementations beyond their
/// own internal consistency.
pub trait Cache: Send + Sync {
    /// Returns the value stored under `key`, or `None` on a miss.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores `value` under `key`, optionally bounded by a TTL.
    fn save(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>);

    /// Removes `key`. Must be a no-op when the key is already absent.
    fn delete(&self, key: &str);
}

/// Outcome of interpreting a cache read.
///
/// A miss is expected (TTL expiry, eviction, never written) and callers must
/// treat it as "recompute or skip". A corrupt payload is operationally
/// distinct and worth alerting on separately.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum CacheLookup<T> {
    /// The payload was present and authenticated
    Hit(T),
    /// Nothing stored under the key
    Miss,
    /// A payload was present but failed authentication or deserialization
    Corrupt,
}

impl<T> CacheLookup<T> {
    /// Returns `true` for a hit.
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// Converts the lookup into an option, mapping both miss and corrupt
    /// outcomes to `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Hit(value) => Some(value),
            Self::Miss | Self::Corrupt => None,
        }
    }
}

struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// In-process TTL-aware cache, usable as a backend for tests and embedded
/// callers.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live (non-expired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.values().filter(|entry| !entry.is_expired(now)).count()
    }

    /// Returns `true` when no live entries remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        let expired = {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.is_expired(now) => true,
                Some(entry) => return Some(entry.value.clone()),
            }
        };
        if expired {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.remove(key);
        }
        None
    }

    fn save(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) {
        let entry = CacheEntry {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), entry);
    }

    fn delete(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }
}

//! Diff subsystem configuration.

use std::time::Duration;

/// Configuration for diff caching and the overflow store.
#[derive(Debug, Clone)]
pub struct DiffConfig {
    /// TTL for cached change diffs; consumers are asynchronous and may lag
    /// behind a queue backlog, so this bounds staleness exposure
    pub diff_ttl: Duration,
    /// TTL for overflow slots, so a crashed consumer cannot leak entries
    pub slot_ttl: Duration,
    /// Key for the authenticated payload frame
    pub auth_key: Vec<u8>,
    /// Whether change ops retain text items by default
    pub capture_text_items: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            diff_ttl: Duration::from_secs(7 * 24 * 60 * 60), // 7 days
            slot_ttl: Duration::from_secs(24 * 60 * 60),     // 24 hours
            auth_key: b"factstore-diff".to_vec(),
            capture_text_items: false,
        }
    }
}

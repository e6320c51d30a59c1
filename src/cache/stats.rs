//! Cache Statistics Module
//!
//! Snapshot of a store's size, configuration and counters.

use std::time::Duration;

use serde::{Serialize, Serializer};

// == Cache Stats ==
/// Point-in-time view of a cache store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Live entries after the expiration sweep
    pub size: usize,
    /// Capacity of the store
    pub max_size: usize,
    /// TTL applied when `set` is called without one
    #[serde(rename = "default_ttl_ms", serialize_with = "serialize_millis")]
    pub default_ttl: Duration,
    /// Lookups that returned a value
    pub hits: u64,
    /// Lookups that found nothing live
    pub misses: u64,
    /// Entries removed to stay within `max_size`
    pub evictions: u64,
    /// Entries removed because their TTL elapsed
    pub expirations: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

fn serialize_millis<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

// == Counters ==
/// Running counters kept by the store.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Counters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with insertion-order tracking,
//! lazy TTL expiration and regex invalidation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::{debug, warn};

use crate::cache::stats::Counters;
use crate::cache::{CacheEntry, CacheStats, Clock, InsertionOrder, SystemClock};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// In-memory key-value store with per-entry TTL and a size cap.
///
/// Expired entries are removed lazily: by the sweep at the start of
/// [`get`](Self::get) and [`stats`](Self::stats), or by
/// [`purge_expired`](Self::purge_expired) from a background task. Until then
/// they still count toward `max_size`.
#[derive(Debug)]
pub struct CacheStore<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// Insertion order for capacity eviction
    order: InsertionOrder,
    /// Running counters
    counters: Counters,
    /// Maximum number of entries allowed
    max_size: usize,
    /// TTL for entries set without an explicit one
    default_ttl: Duration,
    /// Time source
    clock: Arc<dyn Clock>,
    /// Bumped by every invalidation and clear
    generation: u64,
}

impl<T> CacheStore<T> {
    // == Constructor ==
    /// Creates a store backed by the system clock.
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of entries; 0 is clamped to 1
    /// * `default_ttl` - TTL for entries set without an explicit one
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self::with_clock(max_size, default_ttl, Arc::new(SystemClock))
    }

    /// Creates a store reading time from `clock`.
    pub fn with_clock(max_size: usize, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let max_size = if max_size == 0 {
            warn!("Cache max_size of 0 clamped to 1");
            1
        } else {
            max_size
        };

        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            counters: Counters::default(),
            max_size,
            default_ttl,
            clock,
            generation: 0,
        }
    }

    // == Set ==
    /// Stores a value, overwriting any previous entry for the key.
    ///
    /// An overwrite counts as a fresh insertion: the entry gets a new
    /// creation time and moves to the back of the eviction order. When the
    /// store is full the oldest entries are evicted first, expired or not.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL (uses `default_ttl` if None)
    pub fn set(&mut self, key: impl Into<String>, value: T, ttl: Option<Duration>) {
        let key = key.into();
        let now = self.clock.now();

        if self.entries.remove(&key).is_some() {
            self.order.remove(&key);
        }

        if self.entries.len() >= self.max_size {
            let excess = self.entries.len() - self.max_size + 1;
            self.evict_oldest(excess);
        }

        let entry = CacheEntry::new(value, now, ttl.unwrap_or(self.default_ttl));
        self.entries.insert(key.clone(), entry);
        self.order.record(&key);
        debug_assert_eq!(self.order.len(), self.entries.len());
    }

    /// Stores a value only if no invalidation ran since `generation` was
    /// read from [`generation`](Self::generation).
    ///
    /// Returns whether the value was stored.
    pub fn set_if_generation(
        &mut self,
        key: impl Into<String>,
        value: T,
        ttl: Option<Duration>,
        generation: u64,
    ) -> bool {
        if self.generation != generation {
            return false;
        }
        self.set(key, value, ttl);
        true
    }

    /// Invalidation epoch of the store.
    ///
    /// Changes whenever `invalidate`, `invalidate_pattern` or `clear` runs,
    /// whether or not anything was removed, so a value read from the backend
    /// before the change can be told apart from one read after it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn evict_oldest(&mut self, count: usize) {
        for _ in 0..count {
            let Some(oldest) = self.order.pop_oldest() else {
                break;
            };
            if self.entries.remove(&oldest).is_some() {
                self.counters.evictions += 1;
                debug!(key = %oldest, "Evicted oldest cache entry");
            }
        }
    }

    // == Invalidate ==
    /// Removes a single key. Missing keys are a no-op.
    ///
    /// Returns whether an entry was removed.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.generation += 1;
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            true
        } else {
            false
        }
    }

    // == Invalidate Pattern ==
    /// Removes every key matched anywhere by the regular expression.
    ///
    /// Matching is unanchored, so `video_` also hits `client_video_1`; use
    /// `^` and `$` to pin it. `.*` clears the store.
    ///
    /// Returns the number of removed entries, or
    /// [`CacheError::InvalidPattern`] if the pattern does not compile.
    pub fn invalidate_pattern(&mut self, pattern: &str) -> Result<usize> {
        let regex = Regex::new(pattern).map_err(|source| CacheError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self.invalidate_matching(&regex))
    }

    /// Removes every key matched by a precompiled regular expression.
    pub fn invalidate_matching(&mut self, regex: &Regex) -> usize {
        self.generation += 1;
        let matched: Vec<String> = self
            .entries
            .keys()
            .filter(|key| regex.is_match(key))
            .cloned()
            .collect();

        for key in &matched {
            self.entries.remove(key);
            self.order.remove(key);
        }

        if !matched.is_empty() {
            debug!(pattern = %regex, removed = matched.len(), "Invalidated cache keys");
        }
        matched.len()
    }

    // == Clear ==
    /// Removes all entries unconditionally.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.entries.clear();
        self.order.clear();
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        self.purge_expired_at(now)
    }

    fn purge_expired_at(&mut self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.order.remove(key);
        }

        self.counters.expirations += expired.len() as u64;
        expired.len()
    }

    // == Stats ==
    /// Returns statistics after sweeping expired entries, so `size` only
    /// counts live entries.
    pub fn stats(&mut self) -> CacheStats {
        self.purge_expired();
        CacheStats {
            size: self.entries.len(),
            max_size: self.max_size,
            default_ttl: self.default_ttl,
            hits: self.counters.hits,
            misses: self.counters.misses,
            evictions: self.counters.evictions,
            expirations: self.counters.expirations,
        }
    }

    // == Contains Key ==
    /// Checks for a live entry without sweeping or touching counters.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries.get(key).is_some_and(|entry| entry.is_live(now))
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet
    /// swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

impl<T: Clone> CacheStore<T> {
    // == Get ==
    /// Returns a clone of the live value for `key`.
    ///
    /// Sweeps every expired entry first. Absent and expired keys both yield
    /// `None`; callers cannot tell them apart.
    pub fn get(&mut self, key: &str) -> Option<T> {
        let now = self.clock.now();
        self.purge_expired_at(now);

        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                let value = entry.value.clone();
                self.counters.hits += 1;
                return Some(value);
            }
            // Expiry is not an invalidation; the generation stays put
            self.entries.remove(key);
            self.order.remove(key);
        }

        self.counters.misses += 1;
        None
    }
}

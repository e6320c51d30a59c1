//! Shared Cache Handle Module
//!
//! Cloneable async handle over a locked [`CacheStore`], plus the
//! type-erased [`ManagedCache`] view used by code that does not care about
//! the value type (invalidation, sweeping, stats).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStore};
use crate::error::Result;

// == Cache Handle ==
/// Shared, thread-safe reference to one cache store.
///
/// Every operation takes the write lock (reads sweep expired entries and
/// update counters), so calls on one store are applied strictly in order.
pub struct CacheHandle<T> {
    inner: Arc<RwLock<CacheStore<T>>>,
}

impl<T> CacheHandle<T> {
    /// Wraps a store for sharing.
    pub fn new(store: CacheStore<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: T, ttl: Option<Duration>) {
        self.inner.write().await.set(key, value, ttl);
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.inner.write().await.invalidate(key)
    }

    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<usize> {
        self.inner.write().await.invalidate_pattern(pattern)
    }

    pub async fn invalidate_matching(&self, regex: &Regex) -> usize {
        self.inner.write().await.invalidate_matching(regex)
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.write().await.stats()
    }

    pub async fn purge_expired(&self) -> usize {
        self.inner.write().await.purge_expired()
    }

    /// Current invalidation epoch of the store.
    pub async fn generation(&self) -> u64 {
        self.inner.read().await.generation()
    }

    /// Stores `value` unless the store was invalidated since `generation`.
    pub async fn set_if_generation(
        &self,
        key: impl Into<String>,
        value: T,
        ttl: Option<Duration>,
        generation: u64,
    ) -> bool {
        self.inner
            .write()
            .await
            .set_if_generation(key, value, ttl, generation)
    }

    /// Checks for a live entry without sweeping or counting a lookup.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.inner.read().await.contains_key(key)
    }
}

impl<T: Clone> CacheHandle<T> {
    /// Returns the live value for `key`, sweeping expired entries first.
    pub async fn get(&self, key: &str) -> Option<T> {
        self.inner.write().await.get(key)
    }
}

impl<T> Clone for CacheHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for CacheHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheHandle").finish_non_exhaustive()
    }
}

// == Managed Cache ==
/// Value-type-agnostic operations on a cache store.
#[async_trait]
pub trait ManagedCache: Send + Sync {
    /// Removes one key; returns whether it was present.
    async fn invalidate(&self, key: &str) -> bool;

    /// Compiles `pattern` and removes every key it matches.
    async fn invalidate_pattern(&self, pattern: &str) -> Result<usize>;

    /// Removes every key matched by a compiled pattern.
    async fn invalidate_matching(&self, regex: &Regex) -> usize;

    /// Removes all entries.
    async fn clear(&self);

    /// Sweeps expired entries and reports statistics.
    async fn stats(&self) -> CacheStats;

    /// Sweeps expired entries; returns how many were removed.
    async fn purge_expired(&self) -> usize;
}

#[async_trait]
impl<T: Send + Sync + 'static> ManagedCache for CacheHandle<T> {
    async fn invalidate(&self, key: &str) -> bool {
        self.inner.write().await.invalidate(key)
    }

    async fn invalidate_pattern(&self, pattern: &str) -> Result<usize> {
        self.inner.write().await.invalidate_pattern(pattern)
    }

    async fn invalidate_matching(&self, regex: &Regex) -> usize {
        self.inner.write().await.invalidate_matching(regex)
    }

    async fn clear(&self) {
        self.inner.write().await.clear();
    }

    async fn stats(&self) -> CacheStats {
        self.inner.write().await.stats()
    }

    async fn purge_expired(&self) -> usize {
        self.inner.write().await.purge_expired()
    }
}

//! Read-through cached resource.
//!
//! Binds one cache store to backend fetches: hits are served from the
//! store, misses fetch, store and return. Concurrent misses on one key can
//! share a single in-flight fetch.
//!
//! Shared fetches run on their own task, so they complete and release their
//! registration even when every caller has gone away. A fetch only writes
//! back if it is still the newest fetch for its key and the store has not
//! been invalidated since it started; otherwise its result goes to its
//! waiters and nowhere else.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::CacheHandle;
use crate::error::{CacheError, Result};

use super::keys::ResourceKey;

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T>>>;

struct InFlight<T> {
    id: u64,
    /// Store generation the fetch started under
    generation: u64,
    fetch: SharedFetch<T>,
}

type InFlightMap<T> = Arc<Mutex<HashMap<String, InFlight<T>>>>;

// == Cached Resource ==
/// Cache store plus fetch coordination for one resource type.
pub struct CachedResource<T> {
    cache: CacheHandle<T>,
    in_flight: InFlightMap<T>,
    next_fetch_id: AtomicU64,
    dedupe: bool,
}

impl<T> CachedResource<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a resource over `cache`.
    ///
    /// With `dedupe` set, a miss that finds a fetch already running for the
    /// same key awaits that fetch instead of starting another.
    pub fn new(cache: CacheHandle<T>, dedupe: bool) -> Self {
        Self {
            cache,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_fetch_id: AtomicU64::new(0),
            dedupe,
        }
    }

    pub fn cache(&self) -> &CacheHandle<T> {
        &self.cache
    }

    // == Get Or Fetch ==
    /// Returns the cached value for `key`, fetching on a miss.
    ///
    /// `force_refresh` skips the cache read and never joins an in-flight
    /// fetch; the fresh result replaces the cached entry. A miss never joins
    /// a fetch that started before the store was last invalidated. Failed
    /// fetches are returned as [`CacheError::Fetch`] and never cached.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &ResourceKey,
        force_refresh: bool,
        fetch: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        key.validate()?;
        let cache_key = key.as_key();

        if !force_refresh {
            if let Some(value) = self.cache.get(&cache_key).await {
                debug!(key = %cache_key, "Cache hit");
                return Ok(value);
            }
            debug!(key = %cache_key, "Cache miss");
        } else {
            debug!(key = %cache_key, "Forced refresh");
        }

        if !self.dedupe {
            let generation = self.cache.generation().await;
            let result = fetch().await.map_err(CacheError::fetch);
            if let Ok(value) = &result {
                write_back(&self.cache, &cache_key, value, generation).await;
            }
            return result;
        }

        let shared = {
            // Generation is read under the map lock so a registration and its
            // generation are always consistent with each other.
            let mut in_flight = self.in_flight.lock().await;
            let generation = self.cache.generation().await;

            match in_flight.get(&cache_key) {
                Some(existing) if !force_refresh && existing.generation == generation => {
                    debug!(key = %cache_key, "Joining in-flight fetch");
                    existing.fetch.clone()
                }
                _ => {
                    let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                    let task = tokio::spawn(run_fetch(
                        self.cache.clone(),
                        Arc::clone(&self.in_flight),
                        cache_key.clone(),
                        id,
                        generation,
                        fetch(),
                    ));
                    let shared = async move {
                        match task.await {
                            Ok(result) => result,
                            Err(err) => Err(CacheError::fetch(anyhow::Error::new(err))),
                        }
                    }
                    .boxed()
                    .shared();
                    in_flight.insert(
                        cache_key,
                        InFlight {
                            id,
                            generation,
                            fetch: shared.clone(),
                        },
                    );
                    shared
                }
            }
        };

        shared.await
    }

    /// Fetches unconditionally and re-populates the entry.
    pub async fn refresh<F, Fut>(&self, key: &ResourceKey, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        self.get_or_fetch(key, true, fetch).await
    }

    /// Drops the cached entry for `key`.
    pub async fn invalidate(&self, key: &ResourceKey) -> bool {
        self.cache.invalidate(&key.as_key()).await
    }

    /// Number of fetches currently registered as in flight.
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}

async fn write_back<T>(cache: &CacheHandle<T>, cache_key: &str, value: &T, generation: u64)
where
    T: Clone,
{
    if !cache
        .set_if_generation(cache_key, value.clone(), None, generation)
        .await
    {
        debug!(key = %cache_key, "Store invalidated during fetch; result not cached");
    }
}

/// Body of a shared fetch task.
///
/// Holds the map lock while writing back, so a newer fetch for the key
/// cannot register and finish in between.
async fn run_fetch<T, Fut>(
    cache: CacheHandle<T>,
    in_flight: InFlightMap<T>,
    cache_key: String,
    id: u64,
    generation: u64,
    fetch: Fut,
) -> Result<T>
where
    T: Clone + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    let result = fetch.await.map_err(CacheError::fetch);

    let mut in_flight = in_flight.lock().await;
    let current = in_flight.get(&cache_key).is_some_and(|entry| entry.id == id);
    if current {
        in_flight.remove(&cache_key);
    }

    match &result {
        Ok(value) if current => write_back(&cache, &cache_key, value, generation).await,
        Ok(_) => debug!(key = %cache_key, "Fetch superseded; result not cached"),
        Err(err) => warn!(key = %cache_key, error = %err, "Backend fetch failed"),
    }
    drop(in_flight);

    result
}

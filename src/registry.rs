//! Cache registry
//!
//! Builds one store per portal namespace and indexes them by namespace for
//! code that works across stores (invalidation, sweeping, stats).

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::cache::{CacheHandle, CacheStats, CacheStore, Clock, ManagedCache, SystemClock};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::portal::models::{Advertisement, Video, VideoHistoryEntry, VideoPermission};
use crate::portal::Namespace;

// == Cache Registry ==
/// Type-erased stores keyed by namespace.
#[derive(Clone, Default)]
pub struct CacheRegistry {
    stores: BTreeMap<Namespace, Arc<dyn ManagedCache>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `cache` under `namespace`, replacing any previous store.
    pub fn register(&mut self, namespace: Namespace, cache: Arc<dyn ManagedCache>) {
        self.stores.insert(namespace, cache);
    }

    pub fn get(&self, namespace: Namespace) -> Result<&Arc<dyn ManagedCache>> {
        self.stores
            .get(&namespace)
            .ok_or_else(|| CacheError::UnknownNamespace(namespace.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Namespace, &Arc<dyn ManagedCache>)> {
        self.stores.iter().map(|(namespace, cache)| (*namespace, cache))
    }

    pub fn namespaces(&self) -> impl Iterator<Item = Namespace> + '_ {
        self.stores.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Statistics for every registered store.
    pub async fn stats(&self) -> BTreeMap<Namespace, CacheStats> {
        let mut all = BTreeMap::new();
        for (namespace, cache) in self.iter() {
            all.insert(namespace, cache.stats().await);
        }
        all
    }
}

// == Portal Caches ==
/// The typed stores backing the portal adapters.
#[derive(Clone, Debug)]
pub struct PortalCaches {
    pub client_videos: CacheHandle<Vec<Video>>,
    pub video_history: CacheHandle<Vec<VideoHistoryEntry>>,
    pub video_permissions: CacheHandle<Vec<VideoPermission>>,
    pub client_ads: CacheHandle<Vec<Advertisement>>,
}

impl PortalCaches {
    /// Creates every store from `config` on the system clock.
    pub fn from_config(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates every store from `config` reading time from `clock`.
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        fn store<T>(config: &Config, namespace: Namespace, clock: &Arc<dyn Clock>) -> CacheHandle<T> {
            let sizing = config.store(namespace);
            info!(
                namespace = %namespace,
                max_size = sizing.max_size,
                default_ttl_ms = sizing.default_ttl.as_millis() as u64,
                "Cache store initialized"
            );
            CacheHandle::new(CacheStore::with_clock(
                sizing.max_size,
                sizing.default_ttl,
                Arc::clone(clock),
            ))
        }

        Self {
            client_videos: store(config, Namespace::ClientVideos, &clock),
            video_history: store(config, Namespace::VideoHistory, &clock),
            video_permissions: store(config, Namespace::VideoPermissions, &clock),
            client_ads: store(config, Namespace::ClientAds, &clock),
        }
    }

    /// Registry view over the same stores.
    pub fn registry(&self) -> CacheRegistry {
        let mut registry = CacheRegistry::new();
        registry.register(Namespace::ClientVideos, Arc::new(self.client_videos.clone()));
        registry.register(Namespace::VideoHistory, Arc::new(self.video_history.clone()));
        registry.register(
            Namespace::VideoPermissions,
            Arc::new(self.video_permissions.clone()),
        );
        registry.register(Namespace::ClientAds, Arc::new(self.client_ads.clone()));
        registry
    }
}

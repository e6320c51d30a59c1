//! Per-resource consumer adapters.
//!
//! Each adapter pairs one cache store with one backend read, and routes its
//! own mutations through the invalidation dispatcher.

use std::sync::Arc;

use tracing::info;

use crate::cache::CacheHandle;
use crate::error::{CacheError, Result};
use crate::invalidation::{DispatchReport, InvalidationDispatcher, MutationEvent};
use crate::registry::{CacheRegistry, PortalCaches};

use super::backend::PortalBackend;
use super::keys::ResourceKey;
use super::models::{Advertisement, NewVideoView, Video, VideoHistoryEntry, VideoPermission};
use super::resource::CachedResource;

fn require_id(kind: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(CacheError::InvalidRequest(format!("{kind} cannot be empty")));
    }
    Ok(())
}

// == Client Videos ==
/// Videos each client may watch, keyed by client id.
pub struct ClientVideos {
    resource: CachedResource<Vec<Video>>,
    backend: Arc<dyn PortalBackend>,
}

impl ClientVideos {
    pub fn new(cache: CacheHandle<Vec<Video>>, backend: Arc<dyn PortalBackend>, dedupe: bool) -> Self {
        Self {
            resource: CachedResource::new(cache, dedupe),
            backend,
        }
    }

    pub async fn fetch(&self, client_id: &str, force_refresh: bool) -> Result<Vec<Video>> {
        let backend = Arc::clone(&self.backend);
        let id = client_id.to_string();
        self.resource
            .get_or_fetch(&ResourceKey::client_videos(client_id), force_refresh, move || async move {
                backend.client_videos(&id).await
            })
            .await
    }

    pub async fn refresh(&self, client_id: &str) -> Result<Vec<Video>> {
        self.fetch(client_id, true).await
    }

    pub fn resource(&self) -> &CachedResource<Vec<Video>> {
        &self.resource
    }
}

// == Video History ==
/// Viewing history, keyed by client id.
pub struct VideoHistory {
    resource: CachedResource<Vec<VideoHistoryEntry>>,
    backend: Arc<dyn PortalBackend>,
    dispatcher: InvalidationDispatcher,
}

impl VideoHistory {
    pub fn new(
        cache: CacheHandle<Vec<VideoHistoryEntry>>,
        backend: Arc<dyn PortalBackend>,
        dispatcher: InvalidationDispatcher,
        dedupe: bool,
    ) -> Self {
        Self {
            resource: CachedResource::new(cache, dedupe),
            backend,
            dispatcher,
        }
    }

    pub async fn fetch(&self, client_id: &str, force_refresh: bool) -> Result<Vec<VideoHistoryEntry>> {
        let backend = Arc::clone(&self.backend);
        let id = client_id.to_string();
        self.resource
            .get_or_fetch(&ResourceKey::video_history(client_id), force_refresh, move || async move {
                backend.video_history(&id).await
            })
            .await
    }

    pub async fn refresh(&self, client_id: &str) -> Result<Vec<VideoHistoryEntry>> {
        self.fetch(client_id, true).await
    }

    /// Records a view and invalidates the client's cached history.
    pub async fn record_view(&self, view: &NewVideoView) -> Result<VideoHistoryEntry> {
        require_id("client_id", &view.client_id)?;
        require_id("video_id", &view.video_id)?;

        let entry = self
            .backend
            .record_video_view(view)
            .await
            .map_err(CacheError::fetch)?;
        self.dispatcher
            .dispatch(&MutationEvent::VideoViewed {
                client_id: view.client_id.clone(),
                video_id: view.video_id.clone(),
            })
            .await?;
        Ok(entry)
    }

    pub fn resource(&self) -> &CachedResource<Vec<VideoHistoryEntry>> {
        &self.resource
    }
}

// == Video Permissions ==
/// Clients granted each video, keyed by video id.
pub struct VideoPermissions {
    resource: CachedResource<Vec<VideoPermission>>,
    backend: Arc<dyn PortalBackend>,
    dispatcher: InvalidationDispatcher,
}

impl VideoPermissions {
    pub fn new(
        cache: CacheHandle<Vec<VideoPermission>>,
        backend: Arc<dyn PortalBackend>,
        dispatcher: InvalidationDispatcher,
        dedupe: bool,
    ) -> Self {
        Self {
            resource: CachedResource::new(cache, dedupe),
            backend,
            dispatcher,
        }
    }

    pub async fn fetch(&self, video_id: &str, force_refresh: bool) -> Result<Vec<VideoPermission>> {
        let backend = Arc::clone(&self.backend);
        let id = video_id.to_string();
        self.resource
            .get_or_fetch(
                &ResourceKey::video_permissions(video_id),
                force_refresh,
                move || async move { backend.video_permissions(&id).await },
            )
            .await
    }

    pub async fn refresh(&self, video_id: &str) -> Result<Vec<VideoPermission>> {
        self.fetch(video_id, true).await
    }

    /// Grants access, then invalidates the client's video list and the
    /// video's permission list.
    pub async fn grant(&self, video_id: &str, client_id: &str) -> Result<VideoPermission> {
        require_id("video_id", video_id)?;
        require_id("client_id", client_id)?;

        let permission = self
            .backend
            .grant_video_permission(video_id, client_id)
            .await
            .map_err(CacheError::fetch)?;
        info!(video_id, client_id, "Video permission granted");
        self.dispatcher
            .dispatch(&MutationEvent::VideoPermissionGranted {
                video_id: video_id.to_string(),
                client_id: client_id.to_string(),
            })
            .await?;
        Ok(permission)
    }

    /// Revokes access, with the same invalidation as [`grant`](Self::grant).
    pub async fn revoke(&self, video_id: &str, client_id: &str) -> Result<()> {
        require_id("video_id", video_id)?;
        require_id("client_id", client_id)?;

        self.backend
            .revoke_video_permission(video_id, client_id)
            .await
            .map_err(CacheError::fetch)?;
        info!(video_id, client_id, "Video permission revoked");
        self.dispatcher
            .dispatch(&MutationEvent::VideoPermissionRevoked {
                video_id: video_id.to_string(),
                client_id: client_id.to_string(),
            })
            .await?;
        Ok(())
    }

    pub fn resource(&self) -> &CachedResource<Vec<VideoPermission>> {
        &self.resource
    }
}

// == Client Ads ==
/// Active advertisements, keyed by client id.
pub struct ClientAds {
    resource: CachedResource<Vec<Advertisement>>,
    backend: Arc<dyn PortalBackend>,
}

impl ClientAds {
    pub fn new(
        cache: CacheHandle<Vec<Advertisement>>,
        backend: Arc<dyn PortalBackend>,
        dedupe: bool,
    ) -> Self {
        Self {
            resource: CachedResource::new(cache, dedupe),
            backend,
        }
    }

    pub async fn fetch(&self, client_id: &str, force_refresh: bool) -> Result<Vec<Advertisement>> {
        let backend = Arc::clone(&self.backend);
        let id = client_id.to_string();
        self.resource
            .get_or_fetch(&ResourceKey::client_ads(client_id), force_refresh, move || async move {
                backend.client_advertisements(&id).await
            })
            .await
    }

    pub async fn refresh(&self, client_id: &str) -> Result<Vec<Advertisement>> {
        self.fetch(client_id, true).await
    }

    pub fn resource(&self) -> &CachedResource<Vec<Advertisement>> {
        &self.resource
    }
}

// == Portal ==
/// Every adapter over one shared set of stores, with the registry and
/// dispatcher that span them.
pub struct Portal {
    pub client_videos: ClientVideos,
    pub video_history: VideoHistory,
    pub video_permissions: VideoPermissions,
    pub client_ads: ClientAds,
    caches: PortalCaches,
    dispatcher: InvalidationDispatcher,
}

impl Portal {
    pub fn new(caches: PortalCaches, backend: Arc<dyn PortalBackend>, dedupe: bool) -> Self {
        let dispatcher = InvalidationDispatcher::new(Arc::new(caches.registry()));

        Self {
            client_videos: ClientVideos::new(
                caches.client_videos.clone(),
                Arc::clone(&backend),
                dedupe,
            ),
            video_history: VideoHistory::new(
                caches.video_history.clone(),
                Arc::clone(&backend),
                dispatcher.clone(),
                dedupe,
            ),
            video_permissions: VideoPermissions::new(
                caches.video_permissions.clone(),
                Arc::clone(&backend),
                dispatcher.clone(),
                dedupe,
            ),
            client_ads: ClientAds::new(caches.client_ads.clone(), backend, dedupe),
            caches,
            dispatcher,
        }
    }

    pub fn caches(&self) -> &PortalCaches {
        &self.caches
    }

    pub fn registry(&self) -> &CacheRegistry {
        self.dispatcher.registry()
    }

    pub fn dispatcher(&self) -> &InvalidationDispatcher {
        &self.dispatcher
    }

    /// Applies an externally reported mutation.
    pub async fn dispatch(&self, event: &MutationEvent) -> Result<DispatchReport> {
        self.dispatcher.dispatch(event).await
    }
}

//! Backend seam.
//!
//! The hosted backend owns storage, auth and row-level policy; the cache
//! only sees it through this trait.

use async_trait::async_trait;

use super::models::{Advertisement, NewVideoView, Video, VideoHistoryEntry, VideoPermission};

/// Fetches and mutations the portal issues against its backend.
///
/// Errors are opaque to the cache: they are passed to the caller and never
/// stored.
#[async_trait]
pub trait PortalBackend: Send + Sync {
    /// Videos the client has been granted.
    async fn client_videos(&self, client_id: &str) -> anyhow::Result<Vec<Video>>;

    /// The client's viewing history, newest first.
    async fn video_history(&self, client_id: &str) -> anyhow::Result<Vec<VideoHistoryEntry>>;

    /// Every permission row for the video.
    async fn video_permissions(&self, video_id: &str) -> anyhow::Result<Vec<VideoPermission>>;

    /// Active advertisements assigned to the client.
    async fn client_advertisements(&self, client_id: &str) -> anyhow::Result<Vec<Advertisement>>;

    async fn grant_video_permission(
        &self,
        video_id: &str,
        client_id: &str,
    ) -> anyhow::Result<VideoPermission>;

    async fn revoke_video_permission(&self, video_id: &str, client_id: &str) -> anyhow::Result<()>;

    async fn record_video_view(&self, view: &NewVideoView) -> anyhow::Result<VideoHistoryEntry>;
}

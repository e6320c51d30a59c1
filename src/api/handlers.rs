//! API Handlers
//!
//! HTTP request handlers for the cache control plane and the cached reads.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::invalidation::{DispatchReport, MutationEvent};
use crate::models::{
    ClearResponse, DeleteResponse, ForceRefreshQuery, HealthResponse, InvalidatePatternRequest,
    InvalidateResponse, RecordViewRequest, StatsResponse, StoreStatsResponse,
};
use crate::portal::models::{Advertisement, Video, VideoHistoryEntry, VideoPermission};
use crate::portal::{Namespace, Portal, PortalBackend};
use crate::registry::PortalCaches;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub portal: Arc<Portal>,
}

impl AppState {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal: Arc::new(portal),
        }
    }

    /// Builds the stores from `config` and binds them to `backend`.
    pub fn from_config(config: &Config, backend: Arc<dyn PortalBackend>) -> Self {
        let caches = PortalCaches::from_config(config);
        Self::new(Portal::new(caches, backend, config.dedupe_in_flight))
    }
}

// == Control Plane ==
/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let all = state.portal.registry().stats().await;
    Json(StatsResponse::new(all))
}

/// Handler for GET /stats/:namespace
pub async fn namespace_stats_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<StoreStatsResponse>> {
    let namespace: Namespace = namespace.parse()?;
    let stats = state.portal.registry().get(namespace)?.stats().await;
    Ok(Json(stats.into()))
}

/// Handler for DELETE /cache/:namespace
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<ClearResponse>> {
    let namespace: Namespace = namespace.parse()?;
    state.portal.registry().get(namespace)?.clear().await;
    Ok(Json(ClearResponse::new(namespace)))
}

/// Handler for DELETE /cache/:namespace/:key
pub async fn delete_key_handler(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    let namespace: Namespace = namespace.parse()?;
    let removed = state.portal.registry().get(namespace)?.invalidate(&key).await;
    Ok(Json(DeleteResponse {
        namespace,
        key,
        removed,
    }))
}

/// Handler for POST /cache/:namespace/invalidate
pub async fn invalidate_pattern_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    Json(req): Json<InvalidatePatternRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let namespace: Namespace = namespace.parse()?;
    let removed = state
        .portal
        .registry()
        .get(namespace)?
        .invalidate_pattern(&req.pattern)
        .await?;

    Ok(Json(InvalidateResponse {
        namespace,
        pattern: req.pattern,
        removed,
    }))
}

/// Handler for POST /events
///
/// Applies a mutation reported by another writer (admin tools, webhooks).
pub async fn events_handler(
    State(state): State<AppState>,
    Json(event): Json<MutationEvent>,
) -> Result<Json<DispatchReport>> {
    let report = state.portal.dispatch(&event).await?;
    Ok(Json(report))
}

// == Cached Reads ==
/// Handler for GET /clients/:client_id/videos
pub async fn client_videos_handler(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Query(query): Query<ForceRefreshQuery>,
) -> Result<Json<Vec<Video>>> {
    let videos = state
        .portal
        .client_videos
        .fetch(&client_id, query.force_refresh)
        .await?;
    Ok(Json(videos))
}

/// Handler for GET /clients/:client_id/history
pub async fn video_history_handler(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Query(query): Query<ForceRefreshQuery>,
) -> Result<Json<Vec<VideoHistoryEntry>>> {
    let history = state
        .portal
        .video_history
        .fetch(&client_id, query.force_refresh)
        .await?;
    Ok(Json(history))
}

/// Handler for GET /clients/:client_id/ads
pub async fn client_ads_handler(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Query(query): Query<ForceRefreshQuery>,
) -> Result<Json<Vec<Advertisement>>> {
    let ads = state
        .portal
        .client_ads
        .fetch(&client_id, query.force_refresh)
        .await?;
    Ok(Json(ads))
}

/// Handler for GET /videos/:video_id/permissions
pub async fn video_permissions_handler(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<ForceRefreshQuery>,
) -> Result<Json<Vec<VideoPermission>>> {
    let permissions = state
        .portal
        .video_permissions
        .fetch(&video_id, query.force_refresh)
        .await?;
    Ok(Json(permissions))
}

// == Mutations ==
/// Handler for PUT /videos/:video_id/permissions/:client_id
pub async fn grant_permission_handler(
    State(state): State<AppState>,
    Path((video_id, client_id)): Path<(String, String)>,
) -> Result<Json<VideoPermission>> {
    let permission = state
        .portal
        .video_permissions
        .grant(&video_id, &client_id)
        .await?;
    Ok(Json(permission))
}

/// Handler for DELETE /videos/:video_id/permissions/:client_id
pub async fn revoke_permission_handler(
    State(state): State<AppState>,
    Path((video_id, client_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    state
        .portal
        .video_permissions
        .revoke(&video_id, &client_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /clients/:client_id/history
pub async fn record_view_handler(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(req): Json<RecordViewRequest>,
) -> Result<(StatusCode, Json<VideoHistoryEntry>)> {
    let view = req.into_view(client_id);
    let entry = state.portal.video_history.record_view(&view).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

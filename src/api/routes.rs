//! API Routes
//!
//! Configures the Axum router with all portal cache endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, client_ads_handler, client_videos_handler, delete_key_handler,
    events_handler, grant_permission_handler, health_handler, invalidate_pattern_handler,
    namespace_stats_handler, record_view_handler, revoke_permission_handler, stats_handler,
    video_history_handler, video_permissions_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/stats/:namespace", get(namespace_stats_handler))
        .route("/cache/:namespace", delete(clear_handler))
        .route("/cache/:namespace/invalidate", post(invalidate_pattern_handler))
        .route("/cache/:namespace/:key", delete(delete_key_handler))
        .route("/events", post(events_handler))
        .route("/clients/:client_id/videos", get(client_videos_handler))
        .route(
            "/clients/:client_id/history",
            get(video_history_handler).post(record_view_handler),
        )
        .route("/clients/:client_id/ads", get(client_ads_handler))
        .route("/videos/:video_id/permissions", get(video_permissions_handler))
        .route(
            "/videos/:video_id/permissions/:client_id",
            put(grant_permission_handler).delete(revoke_permission_handler),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

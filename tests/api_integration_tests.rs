//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint against an in-memory
//! backend that counts calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use portal_cache::{
    api::create_router,
    config::Config,
    portal::models::{Advertisement, NewVideoView, Video, VideoHistoryEntry, VideoPermission},
    portal::PortalBackend,
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;

// == Fake Backend ==

#[derive(Default)]
struct FakeBackend {
    calls: Mutex<HashMap<&'static str, usize>>,
    down: bool,
}

impl FakeBackend {
    fn hit(&self, method: &'static str) -> anyhow::Result<()> {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;
        if self.down {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }

    fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }
}

#[async_trait]
impl PortalBackend for FakeBackend {
    async fn client_videos(&self, client_id: &str) -> anyhow::Result<Vec<Video>> {
        self.hit("client_videos")?;
        Ok(vec![Video {
            id: format!("{client_id}-v1"),
            title: "Getting started".to_string(),
            description: Some("First steps".to_string()),
            video_url: "https://cdn.example.com/v1.mp4".to_string(),
            thumbnail_url: None,
            duration_seconds: Some(300),
            created_at: Utc::now(),
        }])
    }

    async fn video_history(&self, _client_id: &str) -> anyhow::Result<Vec<VideoHistoryEntry>> {
        self.hit("video_history")?;
        Ok(Vec::new())
    }

    async fn video_permissions(&self, _video_id: &str) -> anyhow::Result<Vec<VideoPermission>> {
        self.hit("video_permissions")?;
        Ok(Vec::new())
    }

    async fn client_advertisements(&self, _client_id: &str) -> anyhow::Result<Vec<Advertisement>> {
        self.hit("client_advertisements")?;
        Ok(vec![Advertisement {
            id: "ad1".to_string(),
            title: "Spring promo".to_string(),
            image_url: "https://cdn.example.com/ad1.png".to_string(),
            link_url: None,
            active: true,
            created_at: Utc::now(),
        }])
    }

    async fn grant_video_permission(
        &self,
        video_id: &str,
        client_id: &str,
    ) -> anyhow::Result<VideoPermission> {
        self.hit("grant_video_permission")?;
        Ok(VideoPermission {
            id: "p1".to_string(),
            video_id: video_id.to_string(),
            client_id: client_id.to_string(),
            granted_at: Utc::now(),
        })
    }

    async fn revoke_video_permission(&self, _video_id: &str, _client_id: &str) -> anyhow::Result<()> {
        self.hit("revoke_video_permission")
    }

    async fn record_video_view(&self, view: &NewVideoView) -> anyhow::Result<VideoHistoryEntry> {
        self.hit("record_video_view")?;
        Ok(VideoHistoryEntry {
            id: "h1".to_string(),
            client_id: view.client_id.clone(),
            video_id: view.video_id.clone(),
            watched_at: Utc::now(),
            progress_seconds: view.progress_seconds,
            completed: view.completed,
        })
    }
}

// == Helper Functions ==

fn create_test_app() -> (Router, Arc<FakeBackend>) {
    create_app_with(FakeBackend::default())
}

fn create_app_with(backend: FakeBackend) -> (Router, Arc<FakeBackend>) {
    let backend = Arc::new(backend);
    let state = AppState::from_config(&Config::default(), backend.clone());
    (create_router(state), backend)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// == Health & Stats ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_stats_lists_every_store() {
    let (app, _) = create_test_app();

    let (status, json) = send(&app, "GET", "/stats", None).await;

    assert_eq!(status, StatusCode::OK);
    for namespace in ["client_videos", "video_history", "video_permissions", "client_ads"] {
        assert_eq!(json["stores"][namespace]["size"], 0, "{namespace}");
        assert_eq!(json["stores"][namespace]["max_size"], 100);
        assert_eq!(json["stores"][namespace]["default_ttl_ms"], 300_000);
    }
}

#[tokio::test]
async fn test_unknown_namespace_is_404() {
    let (app, _) = create_test_app();

    let (status, json) = send(&app, "GET", "/stats/comments", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("comments"));
}

// == Cached Reads ==

#[tokio::test]
async fn test_second_read_is_a_hit() {
    let (app, backend) = create_test_app();

    let (status, first) = send(&app, "GET", "/clients/c1/videos", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = send(&app, "GET", "/clients/c1/videos", None).await;

    assert_eq!(first, second);
    assert_eq!(first[0]["id"], "c1-v1");
    assert_eq!(backend.calls("client_videos"), 1);

    let (_, stats) = send(&app, "GET", "/stats/client_videos", None).await;
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["size"], 1);
    assert_eq!(stats["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_force_refresh_bypasses_cache() {
    let (app, backend) = create_test_app();

    send(&app, "GET", "/clients/c1/ads", None).await;
    let (status, json) = send(&app, "GET", "/clients/c1/ads?force_refresh=true", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["id"], "ad1");
    assert_eq!(backend.calls("client_advertisements"), 2);
}

#[tokio::test]
async fn test_backend_failure_is_502_and_not_cached() {
    let (app, backend) = create_app_with(FakeBackend {
        down: true,
        ..FakeBackend::default()
    });

    let (status, json) = send(&app, "GET", "/videos/v1/permissions", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("connection refused"));

    send(&app, "GET", "/videos/v1/permissions", None).await;
    assert_eq!(backend.calls("video_permissions"), 2);

    let (_, stats) = send(&app, "GET", "/stats/video_permissions", None).await;
    assert_eq!(stats["size"], 0);
}

// == Cache Control ==

#[tokio::test]
async fn test_invalidate_pattern_endpoint() {
    let (app, backend) = create_test_app();
    for client in ["c1", "c2", "c3"] {
        send(&app, "GET", &format!("/clients/{client}/history"), None).await;
    }

    let (status, json) = send(
        &app,
        "POST",
        "/cache/video_history/invalidate",
        Some(r#"{"pattern":"^video_history_c[12]$"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 2);
    assert_eq!(json["namespace"], "video_history");

    send(&app, "GET", "/clients/c3/history", None).await;
    assert_eq!(backend.calls("video_history"), 3);
}

#[tokio::test]
async fn test_invalid_pattern_is_400() {
    let (app, _) = create_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/cache/client_ads/invalidate",
        Some(r#"{"pattern":"(unclosed"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("(unclosed"));
}

#[tokio::test]
async fn test_delete_key_and_clear() {
    let (app, _) = create_test_app();
    send(&app, "GET", "/clients/c1/ads", None).await;
    send(&app, "GET", "/clients/c2/ads", None).await;

    let (status, json) = send(&app, "DELETE", "/cache/client_ads/client_ads_c1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], true);

    let (_, json) = send(&app, "DELETE", "/cache/client_ads/client_ads_c1", None).await;
    assert_eq!(json["removed"], false);

    let (status, _) = send(&app, "DELETE", "/cache/client_ads", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, stats) = send(&app, "GET", "/stats/client_ads", None).await;
    assert_eq!(stats["size"], 0);
}

// == Mutations & Events ==

#[tokio::test]
async fn test_grant_invalidates_affected_reads() {
    let (app, backend) = create_test_app();
    send(&app, "GET", "/clients/c1/videos", None).await;
    send(&app, "GET", "/clients/c2/videos", None).await;

    let (status, json) = send(&app, "PUT", "/videos/v9/permissions/c1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["client_id"], "c1");

    send(&app, "GET", "/clients/c1/videos", None).await;
    send(&app, "GET", "/clients/c2/videos", None).await;
    assert_eq!(backend.calls("client_videos"), 3);
}

#[tokio::test]
async fn test_revoke_returns_no_content() {
    let (app, backend) = create_test_app();

    let (status, json) = send(&app, "DELETE", "/videos/v1/permissions/c1", None).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(json, Value::Null);
    assert_eq!(backend.calls("revoke_video_permission"), 1);
}

#[tokio::test]
async fn test_record_view_refreshes_history() {
    let (app, backend) = create_test_app();
    send(&app, "GET", "/clients/c1/history", None).await;

    let (status, json) = send(
        &app,
        "POST",
        "/clients/c1/history",
        Some(r#"{"video_id":"v1","progress_seconds":42,"completed":false}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["progress_seconds"], 42);

    send(&app, "GET", "/clients/c1/history", None).await;
    assert_eq!(backend.calls("video_history"), 2);
}

#[tokio::test]
async fn test_events_endpoint_dispatches() {
    let (app, _) = create_test_app();
    send(&app, "GET", "/clients/c1/ads", None).await;
    send(&app, "GET", "/clients/c2/ads", None).await;

    let (status, json) = send(
        &app,
        "POST",
        "/events",
        Some(r#"{"type":"advertisement_updated","ad_id":"ad1"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["event"], "advertisement_updated");
    assert_eq!(json["removed"]["client_ads"], 2);
}

#[tokio::test]
async fn test_unknown_event_rejected() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/events")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"type":"video_liked","video_id":"v1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

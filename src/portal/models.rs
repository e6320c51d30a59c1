//! Portal resource models
//!
//! Rows served by the backend and cached per resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tutorial video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub video_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// One viewing record of a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoHistoryEntry {
    pub id: String,
    pub client_id: String,
    pub video_id: String,
    pub watched_at: DateTime<Utc>,
    #[serde(default)]
    pub progress_seconds: u32,
    #[serde(default)]
    pub completed: bool,
}

/// Grants one client access to one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoPermission {
    pub id: String,
    pub video_id: String,
    pub client_id: String,
    pub granted_at: DateTime<Utc>,
}

/// Promotional content shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advertisement {
    pub id: String,
    pub title: String,
    pub image_url: String,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// Payload for recording that a client watched a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVideoView {
    pub client_id: String,
    pub video_id: String,
    #[serde(default)]
    pub progress_seconds: u32,
    #[serde(default)]
    pub completed: bool,
}

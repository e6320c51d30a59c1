//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::portal::models::NewVideoView;

/// Request body for `POST /cache/:namespace/invalidate`
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidatePatternRequest {
    /// Regular expression matched against every key in the store
    pub pattern: String,
}

impl InvalidatePatternRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.pattern.is_empty() {
            return Some("Pattern cannot be empty".to_string());
        }
        None
    }
}

/// Request body for `POST /clients/:client_id/history`
#[derive(Debug, Clone, Deserialize)]
pub struct RecordViewRequest {
    pub video_id: String,
    #[serde(default)]
    pub progress_seconds: u32,
    #[serde(default)]
    pub completed: bool,
}

impl RecordViewRequest {
    /// Combines the body with the client id from the path.
    pub fn into_view(self, client_id: impl Into<String>) -> NewVideoView {
        NewVideoView {
            client_id: client_id.into(),
            video_id: self.video_id,
            progress_seconds: self.progress_seconds,
            completed: self.completed,
        }
    }
}

/// Query string accepted by every cached read.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ForceRefreshQuery {
    /// Skip the cache and re-fetch from the backend
    #[serde(default)]
    pub force_refresh: bool,
}

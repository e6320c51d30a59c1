//! Error types for the portal cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the portal cache.
///
/// A cache miss is never an error: stores report it as `None`.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Invalidation pattern failed to compile
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// No store is registered under the namespace
    #[error("Unknown cache namespace: {0}")]
    UnknownNamespace(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Backend fetch or mutation failed.
    ///
    /// Shared so that every waiter on a deduplicated fetch sees the same error.
    #[error("Backend request failed: {0}")]
    Fetch(Arc<anyhow::Error>),
}

impl CacheError {
    /// Wraps a backend error.
    pub fn fetch(err: anyhow::Error) -> Self {
        CacheError::Fetch(Arc::new(err))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidPattern { .. } => StatusCode::BAD_REQUEST,
            CacheError::UnknownNamespace(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Fetch(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the portal cache.
pub type Result<T> = std::result::Result<T, CacheError>;

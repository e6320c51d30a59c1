//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::CacheStats;
use crate::portal::Namespace;

/// Statistics for one store, as returned by `GET /stats/:namespace`
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// hits / (hits + misses), 0 when nothing was read yet
    pub hit_rate: f64,
}

impl From<CacheStats> for StoreStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for `GET /stats`, keyed by namespace
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub stores: BTreeMap<Namespace, StoreStatsResponse>,
    /// Sum of `size` over every store
    pub total_entries: usize,
}

impl StatsResponse {
    pub fn new(all: BTreeMap<Namespace, CacheStats>) -> Self {
        let total_entries = all.values().map(|stats| stats.size).sum();
        Self {
            stores: all
                .into_iter()
                .map(|(namespace, stats)| (namespace, stats.into()))
                .collect(),
            total_entries,
        }
    }
}

/// Response body for `POST /cache/:namespace/invalidate`
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub namespace: Namespace,
    pub pattern: String,
    /// Number of entries removed
    pub removed: usize,
}

/// Response body for `DELETE /cache/:namespace/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub namespace: Namespace,
    pub key: String,
    /// False when the key was not cached
    pub removed: bool,
}

/// Response body for `DELETE /cache/:namespace`
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub namespace: Namespace,
}

impl ClearResponse {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            message: format!("Cache '{}' cleared", namespace),
            namespace,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

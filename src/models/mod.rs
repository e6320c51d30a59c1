//! Request and Response models for the cache server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies. Backend rows
//! live in `portal::models`.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ForceRefreshQuery, InvalidatePatternRequest, RecordViewRequest};
pub use responses::{
    ClearResponse, DeleteResponse, HealthResponse, InvalidateResponse, StatsResponse,
    StoreStatsResponse,
};

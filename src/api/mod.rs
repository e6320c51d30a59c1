//! API Module
//!
//! HTTP handlers and routing for the portal cache.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats`, `GET /stats/:namespace` - Per-store statistics
//! - `DELETE /cache/:namespace` - Clear a store
//! - `DELETE /cache/:namespace/:key` - Drop one key
//! - `POST /cache/:namespace/invalidate` - Drop keys matching a pattern
//! - `POST /events` - Apply a mutation event
//! - `GET /clients/:client_id/{videos,history,ads}` - Cached reads
//! - `GET /videos/:video_id/permissions` - Cached read
//! - `PUT|DELETE /videos/:video_id/permissions/:client_id` - Grant / revoke
//! - `POST /clients/:client_id/history` - Record a view

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

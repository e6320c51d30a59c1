//! Portal Cache - in-memory TTL caching for the video tutorial portal
//!
//! Keeps backend reads (client videos, viewing history, video permissions,
//! client advertisements) in bounded TTL stores, and invalidates them by key
//! pattern when a mutation makes them stale.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod invalidation;
pub mod models;
pub mod portal;
pub mod registry;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::CacheError;
pub use portal::Portal;
pub use tasks::SweepTasks;

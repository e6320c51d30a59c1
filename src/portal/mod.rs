//! Portal Module
//!
//! The video portal's cached reads and the backend they read from.
//!
//! - `keys`: namespaces, resource keys and invalidation patterns
//! - `models`: rows returned by the backend
//! - `backend` / `rest`: the backend seam and its REST implementation
//! - `resource`: read-through caching with shared in-flight fetches
//! - `adapters`: one adapter per cached resource, plus the `Portal` facade

mod adapters;
pub mod backend;
mod keys;
pub mod models;
mod resource;
pub mod rest;

pub use adapters::{ClientAds, ClientVideos, Portal, VideoHistory, VideoPermissions};
pub use backend::PortalBackend;
pub use keys::{KeyPattern, Namespace, ResourceKey};
pub use resource::CachedResource;
pub use rest::RestBackend;

//! Cache Module
//!
//! Provides in-memory caching with lazy TTL expiration, oldest-first
//! capacity eviction and regex invalidation.

mod clock;
mod entry;
mod handle;
mod order;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, MockClock, SystemClock};
pub use entry::CacheEntry;
pub use handle::{CacheHandle, ManagedCache};
pub use order::InsertionOrder;
pub use stats::CacheStats;
pub use store::CacheStore;

use std::time::Duration;

// == Public Constants ==
/// Default TTL for entries set without an explicit one
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default capacity of a store
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Default interval between background sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

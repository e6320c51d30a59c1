//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cached value with its creation time and lifetime.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The stored value
    pub value: T,
    /// Creation instant, set once at insertion
    pub created_at: Instant,
    /// Lifetime of this entry
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry created at `now`.
    pub fn new(value: T, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            created_at: now,
            ttl,
        }
    }

    // == Liveness ==
    /// Returns true while `now - created_at < ttl`.
    pub fn is_live(&self, now: Instant) -> bool {
        self.age(now) < self.ttl
    }

    /// Checks if the entry has expired.
    ///
    /// Boundary condition: the entry is expired as soon as its full TTL has
    /// elapsed, so an entry with a zero TTL is never live.
    pub fn is_expired(&self, now: Instant) -> bool {
        !self.is_live(now)
    }

    // == Age ==
    /// Time since insertion.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    // == Time To Live ==
    /// Remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self, now: Instant) -> Duration {
        self.ttl.saturating_sub(self.age(now))
    }
}

//! Insertion Order Module
//!
//! Tracks key insertion order for oldest-first capacity eviction.

use std::collections::{HashMap, VecDeque};

/// Stale slots tolerated before the queue is compacted, relative to live keys.
const COMPACT_FACTOR: usize = 2;
const COMPACT_MIN: usize = 32;

// == Insertion Order ==
/// Keys in the order they were (re)inserted.
///
/// - Front = oldest insertion
/// - Back = newest insertion
///
/// Each insertion is stamped. Removing a key only drops its live stamp, so
/// the queue slot goes stale and is skipped when it reaches the front.
/// `record` and `remove` are O(1); `pop_oldest` is amortized O(1).
///
/// Reads never reorder keys; only `record` does. Because store timestamps
/// come from a monotonic clock, front-to-back order is ascending `created_at`.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    slots: VecDeque<(String, u64)>,
    live: HashMap<String, u64>,
    next_stamp: u64,
}

impl InsertionOrder {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record ==
    /// Marks a key as freshly inserted (moves it to the back).
    pub fn record(&mut self, key: &str) {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        self.live.insert(key.to_string(), stamp);
        self.slots.push_back((key.to_string(), stamp));
        self.maybe_compact();
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        if self.live.remove(key).is_some() {
            self.maybe_compact();
        }
    }

    // == Pop Oldest ==
    /// Returns and removes the oldest key, or None if empty.
    pub fn pop_oldest(&mut self) -> Option<String> {
        while let Some((key, stamp)) = self.slots.pop_front() {
            if self.live.get(&key) == Some(&stamp) {
                self.live.remove(&key);
                return Some(key);
            }
        }
        None
    }

    /// Drops every tracked key.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.live.clear();
    }

    /// Number of live keys.
    pub(crate) fn len(&self) -> usize {
        self.live.len()
    }

    fn maybe_compact(&mut self) {
        let limit = (self.live.len() * COMPACT_FACTOR).max(COMPACT_MIN);
        if self.slots.len() > limit {
            let live = &self.live;
            self.slots.retain(|(key, stamp)| live.get(key) == Some(stamp));
        }
    }
}

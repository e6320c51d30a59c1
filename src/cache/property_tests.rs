//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store's TTL, capacity and invalidation rules
//! over generated inputs. Time is driven by a mock clock, so no test sleeps.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStore, MockClock};

// == Test Configuration ==
const TEST_MAX_SIZE: usize = 100;
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);

fn store_with_clock(max_size: usize) -> (CacheStore<String>, MockClock) {
    let clock = MockClock::new();
    let store = CacheStore::with_clock(max_size, TEST_DEFAULT_TTL, Arc::new(clock.clone()));
    (store, clock)
}

// == Strategies ==
/// Generates cache keys in the `<resource>_<id>` shape
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}_[a-zA-Z0-9]{1,16}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,64}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Invalidate { key: String },
    Advance { millis: u64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Invalidate { key }),
        (0u64..200_000).prop_map(|millis| CacheOp::Advance { millis }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Storing then immediately reading returns the stored value.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy()) {
        let (mut store, _clock) = store_with_clock(TEST_MAX_SIZE);

        store.set(key.clone(), value.clone(), None);

        prop_assert_eq!(store.get(&key), Some(value));
    }

    // A value is visible for any elapsed time below its TTL and gone at or
    // beyond it.
    #[test]
    fn prop_ttl_correctness(
        key in key_strategy(),
        value in value_strategy(),
        ttl_ms in 1u64..10_000,
        elapsed_ms in 0u64..20_000,
    ) {
        let (mut store, clock) = store_with_clock(TEST_MAX_SIZE);

        store.set(key.clone(), value.clone(), Some(Duration::from_millis(ttl_ms)));
        clock.advance(Duration::from_millis(elapsed_ms));

        let got = store.get(&key);
        if elapsed_ms < ttl_ms {
            prop_assert_eq!(got, Some(value));
        } else {
            prop_assert_eq!(got, None);
        }
    }

    // After every set the live size stays within max_size.
    #[test]
    fn prop_size_bound(
        max_size in 1usize..20,
        keys in prop::collection::vec(key_strategy(), 1..100)
    ) {
        let (mut store, _clock) = store_with_clock(max_size);

        for key in keys {
            store.set(key, String::new(), None);
            prop_assert!(store.len() <= max_size);
            prop_assert!(store.stats().size <= max_size);
        }
    }

    // With no expirations, the survivors are exactly the max_size most
    // recently inserted distinct keys.
    #[test]
    fn prop_oldest_first_eviction(
        max_size in 1usize..10,
        keys in prop::collection::hash_set(key_strategy(), 1..40)
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let (mut store, clock) = store_with_clock(max_size);

        for key in &keys {
            store.set(key.clone(), key.clone(), None);
            clock.advance(Duration::from_millis(1));
        }

        let expected: HashSet<&String> = keys.iter().rev().take(max_size).collect();
        for key in &keys {
            prop_assert_eq!(store.contains_key(key), expected.contains(key));
        }
    }

    // Invalidating an absent key never changes the store.
    #[test]
    fn prop_idempotent_invalidation(
        present in prop::collection::hash_set(key_strategy(), 0..20),
        absent in key_strategy()
    ) {
        prop_assume!(!present.contains(&absent));
        let (mut store, _clock) = store_with_clock(TEST_MAX_SIZE);
        for key in &present {
            store.set(key.clone(), String::new(), None);
        }

        prop_assert!(!store.invalidate(&absent));
        prop_assert!(!store.invalidate(&absent));
        prop_assert_eq!(store.len(), present.len());
    }

    // A prefix pattern removes exactly the keys carrying the prefix.
    #[test]
    fn prop_prefix_pattern_invalidation(
        keys in prop::collection::hash_set(key_strategy(), 0..40),
        prefix in "[a-z]{1,8}"
    ) {
        let (mut store, _clock) = store_with_clock(TEST_MAX_SIZE);
        for key in &keys {
            store.set(key.clone(), String::new(), None);
        }

        let pattern = format!("^{}_", regex::escape(&prefix));
        let removed = store.invalidate_pattern(&pattern).unwrap();

        let marker = format!("{prefix}_");
        let expected_removed = keys.iter().filter(|k| k.starts_with(&marker)).count();
        prop_assert_eq!(removed, expected_removed);
        for key in &keys {
            prop_assert_eq!(store.contains_key(key), !key.starts_with(&marker));
        }
    }

    // Arbitrary operation sequences keep counters and capacity consistent.
    #[test]
    fn prop_operation_sequences(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let max_size = 16;
        let (mut store, clock) = store_with_clock(max_size);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value, None),
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Invalidate { key } => {
                    store.invalidate(&key);
                }
                CacheOp::Advance { millis } => clock.advance(Duration::from_millis(millis)),
            }
            prop_assert!(store.len() <= max_size);
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.size, store.len());
    }
}

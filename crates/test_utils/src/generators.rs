//! Property-Based Test Generators
//!
//! Proptest strategies for identifier lists and event timestamps.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

/// Strategy for one identifier with the given prefix, e.g. `MAEU123456`
pub fn identifier_strategy(prefix: &'static str) -> impl Strategy<Value = String> {
    (0u32..1_000_000u32).prop_map(move |n| format!("{}{:06}", prefix, n))
}

/// Strategy for a list of distinct identifiers
pub fn identifier_list_strategy(prefix: &'static str, max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(identifier_strategy(prefix), 0..=max)
        .prop_map(|set| set.into_iter().collect())
}

/// Strategy for a minute-aligned instant during 2015
pub fn instant_2015_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..365 * 24 * 60).prop_map(|minutes| {
        Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    })
}

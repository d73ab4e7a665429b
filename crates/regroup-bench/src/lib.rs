//! Benchmark profiles for regroup.
//!
//! - [`warm_profile`]: a registry whose pool has already seen the input,
//!   so the measured run is pure reuse.
//! - [`churn_frames`]: alternating frames whose key sets only partly
//!   overlap, exercising create, reuse and evict in one run.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use regroup_pool::PoolRegistry;
use regroup_test_utils::{population, Person};

/// Memo id used by every profile.
pub const MEMO: &str = "bench";

/// A registry primed with one run over `records`.
pub fn warm_profile(records: &[Person]) -> PoolRegistry<Person> {
    let mut registry = PoolRegistry::new();
    registry
        .group_by(records.iter().cloned(), "homeTown", Some(MEMO))
        .expect("bench profile groups by a fixed field");
    registry
}

/// Two frames of `count` people: the first spread over towns 0..8, the
/// second over towns 0..16, so half the second frame's groups are new.
pub fn churn_frames(count: usize, seed: u64) -> [Vec<Person>; 2] {
    [population(count, 8, seed), population(count, 16, seed ^ 0x9e37)]
}

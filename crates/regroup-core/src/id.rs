//! Strongly-typed identifiers.

use std::borrow::Borrow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counter for unique [`GroupId`] allocation.
static GROUP_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Stable opaque handle for a group.
///
/// Allocated from a monotonic atomic counter via [`GroupId::next`] when a
/// pool first creates a group. The id survives every run in which the
/// group's key is still present, so change-detection layers can compare
/// ids instead of contents. A group that is evicted and later recreated
/// gets a new id.
///
/// Ids are process-unique: two pools never hand out the same id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(u64);

impl GroupId {
    /// Allocate a fresh, unique group ID.
    ///
    /// Each call returns a new ID that has never been returned before
    /// within this process. Thread-safe.
    pub fn next() -> Self {
        Self(GROUP_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonically increasing run counter of a pool.
///
/// Generation 0 means "never run". Each completed run advances the
/// pool by one; groups touched by that run carry the new value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl Generation {
    /// The generation a pool starts in.
    pub const ZERO: Self = Self(0);

    /// The generation after this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Generation {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Memoization identifier naming one grouping context.
///
/// Callers pick one per logical grouping (e.g. `"peopleByTown"`). It must
/// be unique within the owning registry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoId(Arc<str>);

impl MemoId {
    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for MemoId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MemoId {
    fn from(v: &str) -> Self {
        Self(Arc::from(v))
    }
}

impl From<String> for MemoId {
    fn from(v: String) -> Self {
        Self(Arc::from(v))
    }
}

//! Error types for regroup.
//!
//! Absence of a grouping attribute is not an error by default; it groups
//! under [`KeyValue::Absent`](crate::KeyValue::Absent). The variants here
//! are programmer or configuration errors and are never recovered from
//! internally.

use std::error::Error;
use std::fmt;

/// Errors from resolving a pool or running a grouping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupError {
    /// A memoization identifier was reused with a different grouping
    /// than the one it was first registered with.
    ConfigurationConflict {
        /// The memo identifier being reused.
        memo_id: String,
        /// Grouping name the pool was registered with.
        registered: String,
        /// Grouping name requested by the failing call.
        requested: String,
    },
    /// A record lacks the grouping attribute and the pool is configured
    /// to reject such records.
    MissingKey {
        /// Grouping name that could not be read.
        key_name: String,
        /// Input position of the offending record.
        position: usize,
    },
    /// The registry already holds its configured maximum number of pools.
    RegistryFull {
        /// Configured pool limit.
        capacity: usize,
    },
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationConflict {
                memo_id,
                registered,
                requested,
            } => write!(
                f,
                "expected grouping '{memo_id}' to group by '{registered}' \
                 but asked to group by '{requested}' instead"
            ),
            Self::MissingKey { key_name, position } => {
                write!(f, "record {position} has no '{key_name}' attribute")
            }
            Self::RegistryFull { capacity } => {
                write!(f, "pool registry full: capacity {capacity}")
            }
        }
    }
}

impl Error for GroupError {}

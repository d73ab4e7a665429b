//! regroup: identity-stable group-by for repeated recomputation.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the regroup sub-crates. For most users, adding `regroup` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use regroup::prelude::*;
//!
//! struct Person {
//!     name: &'static str,
//!     home_town: &'static str,
//! }
//!
//! impl Record for Person {
//!     fn field(&self, name: &str) -> Option<KeyValue> {
//!         match name {
//!             "name" => Some(self.name.into()),
//!             "homeTown" => Some(self.home_town.into()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut registry = PoolRegistry::new();
//!
//! let people = vec![
//!     Person { name: "Bob", home_town: "NYC" },
//!     Person { name: "Sam", home_town: "London" },
//!     Person { name: "Alice", home_town: "NYC" },
//! ];
//! let towns = group_by(&mut registry, people, "homeTown", Some("peopleByTown")).unwrap();
//! assert_eq!(towns.len(), 2);
//! let nyc = towns[0].id();
//!
//! // Re-running with NYC still present hands back the same group.
//! let people = vec![Person { name: "Carol", home_town: "NYC" }];
//! let towns = group_by(&mut registry, people, "homeTown", Some("peopleByTown")).unwrap();
//! assert_eq!(towns[0].id(), nyc);
//! assert_eq!(towns[0].items()[0].name, "Carol");
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `regroup-core` | Ids, key values, `Record`, accessors, errors |
//! | [`pool`] | `regroup-pool` | `GroupPool`, `PoolRegistry`, `group_by`, config |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`regroup-core`).
///
/// Contains [`types::KeyValue`], the [`types::Record`] trait,
/// [`types::KeyAccessor`] and [`types::GroupError`].
pub use regroup_core as types;

/// Group pools and the registry (`regroup-pool`).
///
/// [`pool::GroupPool`] for caller-owned pools, [`pool::PoolRegistry`] for
/// memoized pools keyed by id.
pub use regroup_pool as pool;

pub use regroup_pool::group_by;

/// Common imports for typical regroup usage.
///
/// ```rust
/// use regroup::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use regroup_core::{Generation, GroupId, KeyAccessor, KeyValue, MemoId, Record};

    // Errors
    pub use regroup_core::GroupError;

    // Pools
    pub use regroup_pool::{
        group_by, Group, GroupPool, Grouping, MissingKeyPolicy, PoolConfig, PoolRegistry,
        RegistryConfig,
    };
}

//! Generation-tagged group pools for regroup.
//!
//! Groups records by a key while keeping group identity stable across
//! repeated runs on changing input, so a caller that re-groups on every
//! change (a render loop, say) can tell "same bucket, new contents" from
//! "new bucket" by comparing [`GroupId`](regroup_core::GroupId)s.
//!
//! # Architecture
//!
//! ```text
//! PoolRegistry (owned by the application)
//! ├── IndexMap<MemoId, GroupPool>   one pool per memoized grouping
//! │   └── GroupPool
//! │       ├── KeyAccessor           how keys are read (fixed at creation)
//! │       ├── Generation            bumped once per run
//! │       └── IndexMap<KeyValue, Group>   kept in last-run output order
//! └── scratch GroupPool             throwaway pool for unmemoized calls
//! ```
//!
//! # Run lifecycle
//!
//! Each [`GroupPool::run`] produces generation `g + 1`. Groups are created
//! on a key's first sighting, reused (members replaced, id kept) when the
//! key survives from generation `g`, and evicted when the key is gone.
//!
//! # Concurrency
//!
//! Runs take `&mut self`. A host sharing a registry across threads wraps
//! it in a mutex held for the whole call.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod group;
pub mod group_by;
pub mod pool;
pub mod registry;

// Public re-exports for the primary API surface.
pub use config::{MissingKeyPolicy, PoolConfig, RegistryConfig};
pub use group::Group;
pub use group_by::group_by;
pub use pool::{GroupPool, Grouping};
pub use registry::PoolRegistry;

//! Core types and traits for regroup.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the rest of the workspace: identifiers,
//! key values, the [`Record`] trait, key accessors, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod accessor;
pub mod error;
pub mod id;
pub mod key;

pub use accessor::KeyAccessor;
pub use error::GroupError;
pub use id::{Generation, GroupId, MemoId};
pub use key::{FloatKey, KeyValue, Record};

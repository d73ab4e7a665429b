//! Test fixtures for regroup development.
//!
//! Provides a [`Person`] record type implementing [`Record`] and the
//! canned people lists used across the workspace's tests and benches.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{men, names, people, person, population, women, Person};

pub use regroup_core::Record;

//! Key extraction.
//!
//! A [`KeyAccessor`] decides, once at configuration time, how a record's
//! grouping key is obtained: either by reading a named attribute through
//! [`Record::field`], or by calling an explicit function. Extraction
//! never fails; a missing attribute becomes [`KeyValue::Absent`].

use std::fmt;
use std::sync::Arc;

use crate::key::{KeyValue, Record};

/// Shared key function used by [`KeyAccessor::Computed`].
pub type KeyFn<R> = Arc<dyn Fn(&R) -> KeyValue + Send + Sync>;

/// How to obtain the grouping key of a record of type `R`.
///
/// Groups expose their key under the accessor's [`name`](Self::name).
/// Registries use [`same_grouping`](Self::same_grouping) to detect a memo
/// slot being reused for a different grouping.
pub enum KeyAccessor<R> {
    /// Read the attribute `name` via [`Record::field`].
    Field(Arc<str>),
    /// Derive the key with a function.
    Computed {
        /// Name the derived key is exposed under.
        name: Arc<str>,
        /// The key function.
        compute: KeyFn<R>,
    },
}

impl<R> KeyAccessor<R> {
    /// Accessor reading a plain attribute.
    pub fn field(name: impl Into<Arc<str>>) -> Self {
        Self::Field(name.into())
    }

    /// Accessor deriving the key with `compute`.
    pub fn computed<F>(name: impl Into<Arc<str>>, compute: F) -> Self
    where
        F: Fn(&R) -> KeyValue + Send + Sync + 'static,
    {
        Self::Computed {
            name: name.into(),
            compute: Arc::new(compute),
        }
    }

    /// The grouping name.
    pub fn name(&self) -> &str {
        match self {
            Self::Field(name) => name,
            Self::Computed { name, .. } => name,
        }
    }

    /// Shared handle to the grouping name.
    pub fn name_arc(&self) -> Arc<str> {
        match self {
            Self::Field(name) => Arc::clone(name),
            Self::Computed { name, .. } => Arc::clone(name),
        }
    }

    /// Whether this accessor calls a key function.
    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Computed { .. })
    }

    /// Whether `self` and `other` produce the same grouping.
    ///
    /// Fields match by name. Computed accessors match only when they share
    /// the same key function allocation, i.e. one is a clone of the other.
    pub fn same_grouping(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Field(a), Self::Field(b)) => a == b,
            (
                Self::Computed { name: a, compute: f },
                Self::Computed { name: b, compute: g },
            ) => a == b && Arc::ptr_eq(f, g),
            _ => false,
        }
    }
}

impl<R> fmt::Display for KeyAccessor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Computed { name, compute } => {
                write!(f, "{name} (computed by {:p})", Arc::as_ptr(compute))
            }
        }
    }
}

impl<R: Record> KeyAccessor<R> {
    /// Extract the grouping key of `record`.
    ///
    /// Returns [`KeyValue::Absent`] when a [`Field`](Self::Field)
    /// accessor names an attribute the record does not have.
    pub fn extract(&self, record: &R) -> KeyValue {
        match self {
            Self::Field(name) => record.field(name).unwrap_or(KeyValue::Absent),
            Self::Computed { compute, .. } => compute(record),
        }
    }
}

impl<R> Clone for KeyAccessor<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Field(name) => Self::Field(Arc::clone(name)),
            Self::Computed { name, compute } => Self::Computed {
                name: Arc::clone(name),
                compute: Arc::clone(compute),
            },
        }
    }
}

impl<R> fmt::Debug for KeyAccessor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Self::Computed { name, .. } => f
                .debug_struct("Computed")
                .field("name", name)
                .finish_non_exhaustive(),
        }
    }
}

impl<R> From<&str> for KeyAccessor<R> {
    fn from(name: &str) -> Self {
        Self::field(name)
    }
}

impl<R> From<String> for KeyAccessor<R> {
    fn from(name: String) -> Self {
        Self::field(name)
    }
}

impl<R> From<&KeyAccessor<R>> for KeyAccessor<R> {
    fn from(accessor: &KeyAccessor<R>) -> Self {
        accessor.clone()
    }
}

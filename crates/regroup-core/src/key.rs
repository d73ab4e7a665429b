//! Key values and the [`Record`] trait.
//!
//! A [`KeyValue`] is what records are bucketed by. Two records land in the
//! same group exactly when their extracted key values compare equal, so
//! every variant is hashable and compared by value.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

/// Extracted grouping key of a record.
///
/// [`KeyValue::Absent`] is the absence sentinel: a record without the
/// grouping attribute maps to it, so a misspelled field name collapses
/// every record into one `Absent` bucket instead of failing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    /// The record has no such attribute.
    #[default]
    Absent,
    /// The attribute exists but holds an explicit null.
    Null,
    /// Boolean key.
    Bool(bool),
    /// Integer key. Integral floats within `i64` range are folded in here.
    Int(i64),
    /// Non-integral (or out of `i64` range) floating-point key.
    Float(FloatKey),
    /// String key.
    Str(Arc<str>),
    /// Composite JSON value, keyed by its compact encoding. Never equal to
    /// a [`Str`](Self::Str) holding the same text.
    Json(Arc<str>),
}

/// A float usable as a hash key.
///
/// `-0.0` is stored as `0.0` and every NaN as one canonical NaN, so
/// equality and hashing follow the stored bits. Ordering is IEEE total
/// order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FloatKey(u64);

impl FloatKey {
    /// Normalise `value` into a key.
    pub fn new(value: f64) -> Self {
        let value = if value.is_nan() {
            f64::NAN
        } else if value == 0.0 {
            0.0
        } else {
            value
        };
        Self(value.to_bits())
    }

    /// The stored value.
    pub fn get(self) -> f64 {
        f64::from_bits(self.0)
    }
}

impl PartialOrd for FloatKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.get().total_cmp(&other.get())
    }
}

impl fmt::Display for FloatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl KeyValue {
    /// Float key. Integral values that fit `i64` become [`KeyValue::Int`],
    /// so `2.0` and `2` group together.
    pub fn float(value: f64) -> Self {
        // i64::MAX as f64 rounds up to 2^63, hence the strict bound.
        if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            Self::Int(value as i64)
        } else {
            Self::Float(FloatKey::new(value))
        }
    }

    /// Whether this is the absence sentinel.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The string payload, if this is a string key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer payload, if this is an integer key.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The numeric payload of an integer or float key.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(v.get()),
            _ => None,
        }
    }

    /// The boolean payload, if this is a boolean key.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("<absent>"),
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) | Self::Json(s) => f.write_str(s),
        }
    }
}

impl From<&str> for KeyValue {
    fn from(v: &str) -> Self {
        Self::Str(Arc::from(v))
    }
}

impl From<String> for KeyValue {
    fn from(v: String) -> Self {
        Self::Str(Arc::from(v))
    }
}

impl From<Arc<str>> for KeyValue {
    fn from(v: Arc<str>) -> Self {
        Self::Str(v)
    }
}

impl From<i64> for KeyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for KeyValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for KeyValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for KeyValue {
    fn from(v: f64) -> Self {
        Self::float(v)
    }
}

impl From<f32> for KeyValue {
    fn from(v: f32) -> Self {
        Self::float(f64::from(v))
    }
}

impl From<bool> for KeyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl<T: Into<KeyValue>> From<Option<T>> for KeyValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Absent, Into::into)
    }
}

#[cfg(feature = "json")]
impl From<&serde_json::Value> for KeyValue {
    fn from(v: &serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Self::Int(i),
                (None, Some(f)) => Self::float(f),
                (None, None) => Self::Json(Arc::from(n.to_string())),
            },
            Value::String(s) => Self::from(s.as_str()),
            Value::Array(_) | Value::Object(_) => Self::Json(Arc::from(v.to_string())),
        }
    }
}

/// A value that can be grouped.
///
/// The pool only ever asks a record for one named attribute. Returning
/// `None` means the attribute does not exist, which the accessor turns
/// into [`KeyValue::Absent`].
///
/// Implementations are free to compute attributes on demand; a record
/// type can expose derived keys (e.g. an upper-cased town) alongside its
/// stored ones.
pub trait Record {
    /// Read the attribute called `name`.
    fn field(&self, name: &str) -> Option<KeyValue>;
}

impl<T: Record + ?Sized> Record for &T {
    fn field(&self, name: &str) -> Option<KeyValue> {
        (**self).field(name)
    }
}

impl<T: Record + ?Sized> Record for Box<T> {
    fn field(&self, name: &str) -> Option<KeyValue> {
        (**self).field(name)
    }
}

impl<T: Record + ?Sized> Record for Rc<T> {
    fn field(&self, name: &str) -> Option<KeyValue> {
        (**self).field(name)
    }
}

impl<T: Record + ?Sized> Record for Arc<T> {
    fn field(&self, name: &str) -> Option<KeyValue> {
        (**self).field(name)
    }
}

impl<V, S> Record for HashMap<String, V, S>
where
    V: Clone + Into<KeyValue>,
    S: BuildHasher,
{
    fn field(&self, name: &str) -> Option<KeyValue> {
        self.get(name).map(|v| v.clone().into())
    }
}

impl<V> Record for BTreeMap<String, V>
where
    V: Clone + Into<KeyValue>,
{
    fn field(&self, name: &str) -> Option<KeyValue> {
        self.get(name).map(|v| v.clone().into())
    }
}

impl<V, S> Record for IndexMap<String, V, S>
where
    V: Clone + Into<KeyValue>,
    S: BuildHasher,
{
    fn field(&self, name: &str) -> Option<KeyValue> {
        self.get(name).map(|v| v.clone().into())
    }
}

/// JSON objects expose their members; any other JSON value has no fields.
#[cfg(feature = "json")]
impl Record for serde_json::Value {
    fn field(&self, name: &str) -> Option<KeyValue> {
        self.as_object()?.get(name).map(KeyValue::from)
    }
}

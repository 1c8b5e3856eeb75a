//! Scalar values stored in records and bound as statement parameters.

use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::{Serialize, Serializer};
use sha2::{Digest, Sha256};

/// A single column value.
///
/// The set is closed on purpose: executors translate it to and from their driver's
/// native types, and the fingerprint encoding below must stay stable.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,
    /// BOOLEAN
    Bool(bool),
    /// Any integer column (SMALLINT, INTEGER, BIGINT)
    Integer(i64),
    /// REAL / DOUBLE PRECISION
    Real(f64),
    /// TEXT, VARCHAR, CHAR
    Text(String),
    /// BYTEA / BLOB
    Blob(Vec<u8>),
    /// DATE
    Date(NaiveDate),
    /// TIMESTAMP / TIMESTAMPTZ, normalized to UTC
    Timestamp(DateTime<Utc>),
    /// Integer array, only used as a bound parameter (`= ANY($n)`)
    IntegerList(Vec<i64>),
}

impl Value {
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            // SQLite has no boolean storage class
            Value::Integer(0) => Some(false),
            Value::Integer(1) => Some(true),
            _ => None,
        }
    }

    /// Feeds a tagged, unambiguous encoding of this value into `hasher`.
    pub(crate) fn digest_into(&self, hasher: &mut Sha256) {
        match self {
            Value::Null => hasher.update([0u8]),
            Value::Bool(b) => hasher.update([1u8, *b as u8]),
            Value::Integer(i) => {
                hasher.update([2u8]);
                hasher.update(i.to_le_bytes());
            }
            Value::Real(f) => {
                hasher.update([3u8]);
                hasher.update(f.to_bits().to_le_bytes());
            }
            Value::Text(s) => {
                hasher.update([4u8]);
                hasher.update((s.len() as u64).to_le_bytes());
                hasher.update(s.as_bytes());
            }
            Value::Blob(b) => {
                hasher.update([5u8]);
                hasher.update((b.len() as u64).to_le_bytes());
                hasher.update(b);
            }
            Value::Date(d) => {
                hasher.update([6u8]);
                hasher.update(d.to_string().as_bytes());
            }
            Value::Timestamp(t) => {
                hasher.update([7u8]);
                hasher.update(t.timestamp_micros().to_le_bytes());
            }
            Value::IntegerList(list) => {
                hasher.update([8u8]);
                hasher.update((list.len() as u64).to_le_bytes());
                for i in list {
                    hasher.update(i.to_le_bytes());
                }
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Real(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Blob(b) => serializer.serialize_bytes(b),
            Value::Date(d) => serializer.collect_str(d),
            Value::Timestamp(t) => serializer.serialize_str(&t.to_rfc3339()),
            Value::IntegerList(list) => serializer.collect_seq(list),
        }
    }
}

//------------------------------------------------------------------------------
// Conversions
//------------------------------------------------------------------------------

macro_rules! impl_from_integer {
    ($($ty:ty),*) => { $(
        impl From<$ty> for Value {
            #[inline]
            fn from(value: $ty) -> Self {
                Value::Integer(i64::from(value))
            }
        }
    )* }
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    #[inline]
    fn from(value: f32) -> Self {
        Value::Real(f64::from(value))
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<Vec<i64>> for Value {
    #[inline]
    fn from(value: Vec<i64>) -> Self {
        Value::IntegerList(value)
    }
}

impl From<NaiveDate> for Value {
    #[inline]
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<DateTime<Utc>> for Value {
    #[inline]
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

//! Conversions between [`Value`] and rusqlite's storage classes.

use bindery_core::Value;
use rusqlite::types::{ToSqlOutput, ValueRef};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    #[error("integer lists cannot be bound as a single SQLite parameter")]
    UnsupportedList,
}

/// Borrowed [`Value`] bound as a rusqlite parameter.
#[derive(Debug, Clone, Copy)]
pub struct SqliteParam<'a>(pub &'a Value);

impl rusqlite::ToSql for SqliteParam<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use rusqlite::types::Value as Owned;

        Ok(match self.0 {
            Value::Null => ToSqlOutput::Owned(Owned::Null),
            Value::Bool(b) => ToSqlOutput::Owned(Owned::Integer(i64::from(*b))),
            Value::Integer(i) => ToSqlOutput::Owned(Owned::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Owned(Owned::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            // SQLite has no date storage class; text sorts chronologically
            Value::Date(d) => ToSqlOutput::Owned(Owned::Text(d.format(DATE_FORMAT).to_string())),
            Value::Timestamp(t) => {
                ToSqlOutput::Owned(Owned::Text(t.format(TIMESTAMP_FORMAT).to_string()))
            }
            Value::IntegerList(_) => {
                return Err(rusqlite::Error::ToSqlConversionFailure(Box::new(
                    ValueError::UnsupportedList,
                )));
            }
        })
    }
}

/// Decodes one column of a row.
pub fn decode(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

//! Conversions between [`Value`] and the PostgreSQL wire types.

use bindery_core::{Error, Result, Value};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use postgres_types::{IsNull, ToSql, Type};
use tokio_postgres::Row;

type BoxError = Box<dyn std::error::Error + Sync + Send>;

#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    #[error("integer {value} does not fit in a {ty} parameter")]
    OutOfRange { value: i64, ty: Type },
}

fn narrow<T: TryFrom<i64>>(value: i64, ty: &Type) -> std::result::Result<T, BoxError> {
    T::try_from(value).map_err(|_| {
        Box::new(ValueError::OutOfRange {
            value,
            ty: ty.clone(),
        }) as BoxError
    })
}

/// Borrowed [`Value`] bound as a tokio-postgres parameter.
///
/// Integers are narrowed to whatever width the server inferred for the placeholder,
/// so an `i64` id list can be compared against an `INT4` column with `= ANY($1)`.
#[derive(Debug, Clone, Copy)]
pub struct PgParam<'a>(pub &'a Value);

impl ToSql for PgParam<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
        match self.0 {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql(ty, out),
            Value::Integer(i) => match *ty {
                Type::INT2 => narrow::<i16>(*i, ty)?.to_sql(ty, out),
                Type::INT4 => narrow::<i32>(*i, ty)?.to_sql(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                _ => i.to_sql(ty, out),
            },
            Value::Real(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                _ => f.to_sql(ty, out),
            },
            Value::Text(s) => s.as_str().to_sql(ty, out),
            Value::Blob(b) => b.as_slice().to_sql(ty, out),
            Value::Date(d) => d.to_sql(ty, out),
            Value::Timestamp(t) => match *ty {
                Type::TIMESTAMP => t.naive_utc().to_sql(ty, out),
                _ => t.to_sql(ty, out),
            },
            Value::IntegerList(ids) => match *ty {
                Type::INT2_ARRAY => ids
                    .iter()
                    .map(|&i| narrow::<i16>(i, &Type::INT2))
                    .collect::<std::result::Result<Vec<_>, _>>()?
                    .to_sql(ty, out),
                Type::INT4_ARRAY => ids
                    .iter()
                    .map(|&i| narrow::<i32>(i, &Type::INT4))
                    .collect::<std::result::Result<Vec<_>, _>>()?
                    .to_sql(ty, out),
                _ => ids.to_sql(ty, out),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // Mismatches surface from the per-variant impls above
        true
    }

    postgres_types::to_sql_checked!();
}

fn get<'a, T>(row: &'a Row, idx: usize) -> Result<Option<T>>
where
    T: postgres_types::FromSql<'a>,
{
    row.try_get::<_, Option<T>>(idx)
        .map_err(|e| Error::Mapping(e.to_string()))
}

/// Decodes column `idx` of a row according to its declared type.
pub fn decode(row: &Row, idx: usize) -> Result<Value> {
    let column = &row.columns()[idx];
    let value = match *column.type_() {
        Type::BOOL => get::<bool>(row, idx)?.map(Value::Bool),
        Type::INT2 => get::<i16>(row, idx)?.map(Value::from),
        Type::INT4 => get::<i32>(row, idx)?.map(Value::from),
        Type::INT8 => get::<i64>(row, idx)?.map(Value::Integer),
        Type::FLOAT4 => get::<f32>(row, idx)?.map(Value::from),
        Type::FLOAT8 => get::<f64>(row, idx)?.map(Value::Real),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            get::<String>(row, idx)?.map(Value::Text)
        }
        Type::BYTEA => get::<Vec<u8>>(row, idx)?.map(Value::Blob),
        Type::DATE => get::<NaiveDate>(row, idx)?.map(Value::Date),
        Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, idx)?.map(Value::Timestamp),
        Type::TIMESTAMP => get::<NaiveDateTime>(row, idx)?.map(|t| Value::Timestamp(t.and_utc())),
        Type::INT8_ARRAY => get::<Vec<i64>>(row, idx)?.map(Value::IntegerList),
        ref other => {
            return Err(Error::Mapping(format!(
                "unsupported column type {other} for \"{}\"",
                column.name()
            )));
        }
    };
    Ok(value.unwrap_or(Value::Null))
}

//! Column name → value rows returned by executors.

use compact_str::CompactString;
use heck::ToLowerCamelCase;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::Value;

/// Column holding the primary identifier of every mapped table.
pub const PRIMARY_KEY: &str = "id";

/// A single row, columns kept in the order the store returned them.
///
/// Records are snapshots: mutating one never touches the store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(CompactString, Value)>,
}

impl Record {
    #[inline]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Sets `column`, replacing the previous value in place if present.
    pub fn insert(&mut self, column: &str, value: impl Into<Value>) -> Option<Value> {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| name.as_str() == column) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((CompactString::from(column), value));
                None
            }
        }
    }

    /// Appends without checking for an existing column. Used by row decoders.
    #[inline]
    pub fn push(&mut self, column: impl Into<CompactString>, value: Value) {
        self.fields.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name.as_str() == column)
            .map(|(_, value)| value)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        let pos = self.fields.iter().position(|(name, _)| name.as_str() == column)?;
        Some(self.fields.remove(pos).1)
    }

    /// The integer primary key, if the row carries one.
    #[inline]
    pub fn id(&self) -> Option<i64> {
        self.get(PRIMARY_KEY).and_then(Value::as_i64)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns a copy with `snake_case` column names rewritten to `camelCase`,
    /// the shape the wire layer exposes (`date_parution` → `dateParution`).
    pub fn to_camel_case(&self) -> Record {
        self.fields
            .iter()
            .map(|(name, value)| (name.to_lower_camel_case(), value.clone()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<CompactString>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            let column: CompactString = column.into();
            record.insert(&column, value);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (CompactString, Value);
    type IntoIter = std::vec::IntoIter<(CompactString, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name.as_str(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut record = Record::new().with("id", 1).with("titre", "A");
        let previous = record.insert("titre", "B");

        assert_eq!(previous, Some(Value::Text("A".into())));
        assert_eq!(record.columns().collect::<Vec<_>>(), ["id", "titre"]);
        assert_eq!(record.get("titre").and_then(Value::as_str), Some("B"));
    }

    #[test]
    fn camel_case_keeps_values_and_order() {
        let record = Record::new()
            .with("id", 4)
            .with("date_parution", "1999")
            .with("nb_page", 120);
        let camel = record.to_camel_case();

        assert_eq!(
            camel.columns().collect::<Vec<_>>(),
            ["id", "dateParution", "nbPage"]
        );
        assert_eq!(camel.id(), Some(4));
    }

    #[test]
    fn remove_detaches_column() {
        let mut record = Record::new().with("id", 1).with("__parent", 9);
        assert_eq!(record.remove("__parent"), Some(Value::Integer(9)));
        assert_eq!(record.len(), 1);
        assert_eq!(record.remove("missing"), None);
    }
}

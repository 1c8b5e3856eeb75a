//! Grouping of a flat, ordered row set by parent id.

use bindery_core::Record;
use hashbrown::HashMap;

/// `parent id → rows` for one flush, in the order the rows arrived.
#[derive(Debug, Default)]
pub struct RelationIndex {
    groups: HashMap<i64, Vec<Record>>,
}

impl RelationIndex {
    /// Groups `rows` on the integer column `key_column`.
    ///
    /// The key column is removed from each row. Rows whose key is missing or not an
    /// integer cannot belong to any parent and are skipped.
    pub fn build(rows: impl IntoIterator<Item = Record>, key_column: &str) -> Self {
        let mut groups: HashMap<i64, Vec<Record>> = HashMap::new();
        for mut row in rows {
            let Some(key) = row.remove(key_column).and_then(|v| v.as_i64()) else {
                continue;
            };
            groups.entry(key).or_default().push(row);
        }
        Self { groups }
    }

    /// Rows of `parent_id`; empty when it had none.
    #[inline]
    pub fn get(&self, parent_id: i64) -> &[Record] {
        self.groups.get(&parent_id).map_or(&[], Vec::as_slice)
    }

    /// Number of parents with at least one row.
    #[inline]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

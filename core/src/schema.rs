//! Static per-entity and per-relation configuration.
//!
//! Every identifier that ends up in rendered SQL comes from these tables, never from
//! caller input: caller-supplied column names are only ever used to *look up* one of
//! the configured names.

use crate::error::{Error, Result};
use crate::record::PRIMARY_KEY;

/// A foreign key held by an entity's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: &'static str,
}

/// Mapping metadata for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityConfig {
    /// Human-facing name, used in not-found messages.
    pub name: &'static str,
    pub table: &'static str,
    pub default_order_by: &'static str,
    /// Every column of the table, primary key first.
    pub columns: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
}

impl EntityConfig {
    /// Resolves a caller-supplied column name to the configured identifier.
    pub fn column(&self, name: &str) -> Result<&'static str> {
        self.columns
            .iter()
            .copied()
            .find(|column| *column == name)
            .ok_or_else(|| Error::UnknownColumn {
                table: self.table,
                column: name.to_owned(),
            })
    }

    #[inline]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(&name)
    }

    #[inline]
    pub const fn primary_key(&self) -> &'static str {
        PRIMARY_KEY
    }

    pub fn foreign_key(&self, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }
}

/// Where the parent id of a relation lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationSource {
    /// The child table holds the parent id in `parent_column`.
    Direct { parent_column: &'static str },
    /// Many-to-many through a join table.
    Junction {
        table: &'static str,
        parent_column: &'static str,
        child_column: &'static str,
    },
}

/// A parent → children relation served by a batch loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationConfig {
    pub name: &'static str,
    pub child: &'static EntityConfig,
    pub source: RelationSource,
}

impl RelationConfig {
    /// Column the relation partitions and filters on.
    #[inline]
    pub const fn parent_column(&self) -> &'static str {
        match self.source {
            RelationSource::Direct { parent_column }
            | RelationSource::Junction { parent_column, .. } => parent_column,
        }
    }

    #[inline]
    pub const fn is_junction(&self) -> bool {
        matches!(self.source, RelationSource::Junction { .. })
    }
}

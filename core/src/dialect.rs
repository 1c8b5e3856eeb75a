//! SQL dialects understood by the statement renderer.

use std::borrow::Cow;

/// SQL dialect for database-specific rendering.
///
/// Each dialect has its own placeholder syntax and its own way of matching a column
/// against a set of ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// SQLite - uses `?1, ?2, ...` numbered placeholders
    ///
    /// Compatible with: rusqlite
    #[default]
    #[serde(alias = "sqlite3")]
    SQLite,

    /// PostgreSQL - uses `$1, $2, ...` numbered placeholders
    ///
    /// Compatible with: tokio-postgres
    #[serde(alias = "postgres", alias = "pg")]
    PostgreSQL,
}

impl Dialect {
    /// Renders a placeholder for this dialect with the given 1-based index.
    ///
    /// # Examples
    /// - PostgreSQL: `$1`, `$2`, `$3`
    /// - SQLite: `?1`, `?2`, `?3`
    #[inline]
    pub fn render_placeholder(&self, index: usize) -> Cow<'static, str> {
        match self {
            Dialect::PostgreSQL => Cow::Owned(format!("${index}")),
            Dialect::SQLite => Cow::Owned(format!("?{index}")),
        }
    }

    /// Returns `true` if a set of ids can be bound as a single array parameter.
    ///
    /// PostgreSQL matches with `= ANY($n)`. SQLite gets the ids as one JSON text
    /// parameter, so a batch never runs into its bound-variable limit.
    #[inline]
    #[must_use]
    pub const fn supports_array_params(&self) -> bool {
        matches!(self, Dialect::PostgreSQL)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Dialect::SQLite => "sqlite",
            Dialect::PostgreSQL => "postgresql",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

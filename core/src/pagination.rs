//! Permissive pagination normalization.
//!
//! Raw input is never rejected: out-of-range numbers are clamped, unknown
//! directions fall back to ascending, and missing fields take their defaults.

use serde::Deserialize;

/// Sort direction of a paginated read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Only a case-insensitive `"DESC"` maps to [`Direction::Desc`].
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }

    #[inline]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Pagination as it arrives from the request layer, every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInput {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order_by: Option<String>,
    pub direction: Option<String>,
}

impl PaginationInput {
    #[must_use]
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    #[must_use]
    pub fn direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }
}

/// Page-size policy shared by every entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    /// Limit used when the request carries none.
    pub default_items_per_request: u32,
    /// Ceiling applied to every requested limit.
    pub max_items_per_request: u32,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_items_per_request: 10,
            max_items_per_request: 100,
        }
    }
}

/// Canonical, validated pagination.
///
/// Invariants: `limit <= max_items_per_request`, `offset >= 0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaginationSpec {
    pub limit: u32,
    pub offset: u64,
    pub order_by: String,
    pub direction: Direction,
}

impl PaginationSpec {
    /// Inclusive 1-based rank window `[offset + 1, offset + limit]`.
    ///
    /// A zero limit yields an empty window (`hi < lo`).
    pub fn rank_window(&self) -> (i64, i64) {
        let offset = i64::try_from(self.offset).unwrap_or(i64::MAX);
        (
            offset.saturating_add(1),
            offset.saturating_add(i64::from(self.limit)),
        )
    }
}

impl PaginationSettings {
    /// Normalizes raw input into a [`PaginationSpec`].
    ///
    /// An absent limit takes the configured default; a present one is clamped to
    /// `[0, max_items_per_request]`, so a negative limit becomes `0`, not the default.
    pub fn normalize(&self, raw: Option<&PaginationInput>, default_order_by: &str) -> PaginationSpec {
        let max = i64::from(self.max_items_per_request);
        let default_limit = self.default_items_per_request.min(self.max_items_per_request);

        let Some(raw) = raw else {
            return PaginationSpec {
                limit: default_limit,
                offset: 0,
                order_by: default_order_by.to_owned(),
                direction: Direction::Asc,
            };
        };

        let limit = match raw.limit {
            // clamped into [0, max], always fits u32
            Some(limit) => limit.clamp(0, max) as u32,
            None => default_limit,
        };

        PaginationSpec {
            limit,
            offset: raw.offset.unwrap_or(0).max(0) as u64,
            order_by: raw
                .order_by
                .as_deref()
                .map(str::trim)
                .filter(|column| !column.is_empty())
                .unwrap_or(default_order_by)
                .to_owned(),
            direction: raw
                .direction
                .as_deref()
                .map_or(Direction::Asc, Direction::parse),
        }
    }
}

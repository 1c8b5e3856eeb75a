//! Tracing utilities for statement and batch observability.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event with the SQL text and parameter count.
///
/// ```ignore
/// bindery_trace_query!(&stmt.sql, stmt.params.len());
/// ```
#[macro_export]
macro_rules! bindery_trace_query {
    ($sql:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %$sql, params = $param_count, "bindery.query");
    };
}

/// Emit a debug-level tracing event when a coalesced batch is flushed.
///
/// ```ignore
/// bindery_trace_batch!("books_by_author", keys.len(), parent_ids.len());
/// ```
#[macro_export]
macro_rules! bindery_trace_batch {
    ($relation:expr, $keys:expr, $parents:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            relation = $relation,
            keys = $keys,
            parents = $parents,
            "bindery.batch"
        );
    };
}

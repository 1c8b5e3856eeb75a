//! The executor capability every backing store provides.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::dialect::Dialect;
use crate::error::Result;
use crate::record::Record;
use crate::statement::Statement;

/// Runs rendered statements against a backing store.
///
/// Implementations must be shareable across tasks; the mapper and every batch loader
/// hold the same executor behind an `Arc`.
pub trait Executor: Send + Sync + 'static {
    /// Dialect statements must be rendered in for this executor.
    const DIALECT: Dialect;

    /// Runs a row-returning statement.
    fn query(&self, stmt: &Statement) -> impl Future<Output = Result<Vec<Record>>> + Send;

    /// Runs a statement and returns the number of affected rows.
    fn execute(&self, stmt: &Statement) -> impl Future<Output = Result<u64>> + Send;
}

/// Executor wrapper that numbers and traces every statement it forwards.
#[derive(Debug, Default)]
pub struct Instrumented<E> {
    inner: E,
    statements: AtomicU64,
}

impl<E> Instrumented<E> {
    pub const fn new(inner: E) -> Self {
        Self {
            inner,
            statements: AtomicU64::new(0),
        }
    }

    /// Number of statements forwarded so far.
    #[inline]
    pub fn statement_count(&self) -> u64 {
        self.statements.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    fn record(&self, stmt: &Statement) {
        let _n = self.statements.fetch_add(1, Ordering::Relaxed) + 1;
        crate::bindery_trace_query!(stmt.sql, stmt.params.len());
        #[cfg(feature = "tracing")]
        tracing::trace!(statement = _n, "bindery.executor");
    }
}

impl<E: Executor> Executor for Instrumented<E> {
    const DIALECT: Dialect = E::DIALECT;

    fn query(&self, stmt: &Statement) -> impl Future<Output = Result<Vec<Record>>> + Send {
        self.record(stmt);
        self.inner.query(stmt)
    }

    fn execute(&self, stmt: &Statement) -> impl Future<Output = Result<u64>> + Send {
        self.record(stmt);
        self.inner.execute(stmt)
    }
}

//! PostgreSQL executor for bindery, backed by [`tokio_postgres`].
//!
//! ```no_run
//! # async fn connect() -> bindery_core::Result<()> {
//! use bindery_postgres::PgExecutor;
//!
//! let executor = PgExecutor::connect("host=localhost user=postgres dbname=livres").await?;
//! # Ok(())
//! # }
//! ```

pub mod values;

use std::future::Future;

use bindery_core::{Dialect, Error, Executor, Record, Result, Statement};
use compact_str::CompactString;
use postgres_types::ToSql;
use tokio_postgres::{Client, NoTls};

use crate::values::{PgParam, decode};

fn execution(e: tokio_postgres::Error) -> Error {
    Error::Execution(e.to_string())
}

/// Executor over a single [`tokio_postgres::Client`].
pub struct PgExecutor {
    client: Client,
}

impl std::fmt::Debug for PgExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgExecutor").finish_non_exhaustive()
    }
}

impl PgExecutor {
    #[inline]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connects without TLS and drives the connection on a spawned task.
    pub async fn connect(config: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(config, NoTls)
            .await
            .map_err(execution)?;
        tokio::spawn(async move {
            if let Err(_e) = connection.await {
                #[cfg(feature = "tracing")]
                tracing::error!(error = %_e, "bindery.postgres.connection");
            }
        });
        Ok(Self::new(client))
    }

    #[inline]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Runs several `;`-separated statements without parameters, e.g. schema DDL.
    pub async fn execute_batch(&self, sql: &str) -> Result<()> {
        self.client.batch_execute(sql).await.map_err(execution)
    }

    async fn run_query(&self, stmt: &Statement) -> Result<Vec<Record>> {
        let params: Vec<PgParam<'_>> = stmt.params.iter().map(PgParam).collect();
        let refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        let prepared = self.client.prepare(&stmt.sql).await.map_err(execution)?;
        let rows = self.client.query(&prepared, &refs).await.map_err(execution)?;

        let names: Vec<CompactString> = prepared
            .columns()
            .iter()
            .map(|c| CompactString::from(c.name()))
            .collect();

        rows.iter()
            .map(|row| {
                let mut record = Record::with_capacity(names.len());
                for (idx, name) in names.iter().enumerate() {
                    record.push(name.clone(), decode(row, idx)?);
                }
                Ok(record)
            })
            .collect()
    }

    async fn run_execute(&self, stmt: &Statement) -> Result<u64> {
        let params: Vec<PgParam<'_>> = stmt.params.iter().map(PgParam).collect();
        let refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        self.client
            .execute(stmt.sql.as_str(), &refs)
            .await
            .map_err(execution)
    }
}

impl Executor for PgExecutor {
    const DIALECT: Dialect = Dialect::PostgreSQL;

    fn query(&self, stmt: &Statement) -> impl Future<Output = Result<Vec<Record>>> + Send {
        self.run_query(stmt)
    }

    fn execute(&self, stmt: &Statement) -> impl Future<Output = Result<u64>> + Send {
        self.run_execute(stmt)
    }
}

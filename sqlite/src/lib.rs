//! SQLite executor for bindery, backed by [`rusqlite`].
//!
//! # Example
//!
//! ```no_run
//! use bindery_sqlite::SqliteExecutor;
//!
//! let executor = SqliteExecutor::open_in_memory()?;
//! executor.execute_batch("CREATE TABLE auteur (id INTEGER PRIMARY KEY, nom TEXT)")?;
//! # Ok::<(), bindery_core::Error>(())
//! ```

pub mod values;

use std::future::Future;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bindery_core::{Dialect, Error, Executor, Record, Result, Statement};
use compact_str::CompactString;
use rusqlite::{Connection, params_from_iter};

use crate::values::{SqliteParam, decode};

fn execution(e: rusqlite::Error) -> Error {
    Error::Execution(e.to_string())
}

/// Executor over a single rusqlite [`Connection`].
///
/// Statements are serialized behind a mutex; each one runs to completion before the
/// returned future is first polled.
#[derive(Debug)]
pub struct SqliteExecutor {
    conn: Mutex<Connection>,
}

impl SqliteExecutor {
    #[inline]
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open_in_memory() -> Result<Self> {
        Connection::open_in_memory().map(Self::new).map_err(execution)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Connection::open(path).map(Self::new).map_err(execution)
    }

    /// Runs several `;`-separated statements without parameters, e.g. schema DDL.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.lock().execute_batch(sql).map_err(execution)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_query(&self, stmt: &Statement) -> Result<Vec<Record>> {
        let conn = self.lock();
        let mut prepared = conn.prepare_cached(&stmt.sql).map_err(execution)?;
        let names: Vec<CompactString> = prepared
            .column_names()
            .into_iter()
            .map(CompactString::from)
            .collect();

        let mut rows = prepared
            .query(params_from_iter(stmt.params.iter().map(SqliteParam)))
            .map_err(execution)?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().map_err(execution)? {
            let mut record = Record::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                let value = row
                    .get_ref(i)
                    .map_err(|e| Error::Mapping(e.to_string()))?;
                record.push(name.clone(), decode(value));
            }
            records.push(record);
        }
        Ok(records)
    }

    fn run_execute(&self, stmt: &Statement) -> Result<u64> {
        let conn = self.lock();
        let mut prepared = conn.prepare_cached(&stmt.sql).map_err(execution)?;
        let affected = prepared
            .execute(params_from_iter(stmt.params.iter().map(SqliteParam)))
            .map_err(execution)?;
        Ok(affected as u64)
    }
}

impl Executor for SqliteExecutor {
    const DIALECT: Dialect = Dialect::SQLite;

    fn query(&self, stmt: &Statement) -> impl Future<Output = Result<Vec<Record>>> + Send {
        std::future::ready(self.run_query(stmt))
    }

    fn execute(&self, stmt: &Statement) -> impl Future<Output = Result<u64>> + Send {
        std::future::ready(self.run_execute(stmt))
    }
}

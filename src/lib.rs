//! # bindery
//!
//! Batched relational data access: generic per-table CRUD plus per-relation loaders
//! that coalesce concurrent child reads into one windowed query.
//!
//! ```ignore
//! use bindery::{Config, Database, Entity, Relation};
//! use bindery::sqlite::SqliteExecutor;
//!
//! # async fn run() -> bindery::Result<()> {
//! let db = Database::new(SqliteExecutor::open("livres.db")?, Config::default());
//!
//! let author = db.mapper(Entity::Author).find_by_key(1).await?;
//!
//! let session = db.session();
//! let (a, b) = futures_util::future::join(
//!     session.load_children(Relation::BooksByAuthor, 1, None),
//!     session.load_children(Relation::BooksByAuthor, 2, None),
//! )
//! .await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Drivers
//!
//! | Database   | Driver         | Feature Flag     |
//! |------------|----------------|------------------|
//! | SQLite     | rusqlite       | `rusqlite`       |
//! | PostgreSQL | tokio-postgres | `tokio-postgres` |

pub mod cache;
pub mod catalog;
pub mod database;
pub mod index;
pub mod loader;
pub mod mapper;

pub use bindery_core::{config, sql};
pub use bindery_core::{
    Config, Dialect, Direction, DispatchMode, EntityConfig, Error, Executor, Fingerprint,
    Instrumented, PaginationInput, PaginationSettings, PaginationSpec, Record, RelationConfig,
    RelationSource, Result, Statement, Value,
};

pub use cache::QueryCache;
pub use catalog::{Entity, Relation};
pub use database::{Database, Session, ensure_found};
pub use index::RelationIndex;
pub use loader::{BatchKey, BatchLoader};
pub use mapper::RecordMapper;

#[cfg(feature = "rusqlite")]
pub use bindery_sqlite as sqlite;

#[cfg(feature = "tokio-postgres")]
pub use bindery_postgres as postgres;

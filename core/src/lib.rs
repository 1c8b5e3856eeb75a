//! Core types shared by the bindery data-access layer and its drivers.

pub mod config;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod pagination;
pub mod record;
pub mod schema;
pub mod sql;
pub mod statement;
pub mod tracing;
pub mod value;

// Re-export key types and traits
pub use config::{Config, DispatchMode};
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use executor::{Executor, Instrumented};
pub use pagination::{Direction, PaginationInput, PaginationSettings, PaginationSpec};
pub use record::Record;
pub use schema::{EntityConfig, ForeignKey, RelationConfig, RelationSource};
pub use statement::{Fingerprint, Statement};
pub use value::Value;

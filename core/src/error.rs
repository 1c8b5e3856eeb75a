use thiserror::Error;

/// Errors raised by the data-access layer.
///
/// `Clone` so a single batch failure can be handed to every waiter of that batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Error executing a statement against the backing store
    #[error("Execution error: {0}")]
    Execution(String),

    /// Error decoding a row or encoding a parameter
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// A caller-supplied identifier is not a known column of the table
    #[error("Unknown column \"{column}\" for table \"{table}\"")]
    UnknownColumn { table: &'static str, column: String },

    /// An insert or update was issued without any column
    #[error("No fields supplied for table \"{0}\"")]
    EmptyFields(&'static str),

    /// Absent record turned into an error by the caller
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// The batch a waiter was registered in was dropped before it resolved
    #[error("Batch was dropped before it resolved")]
    Canceled,
}

/// Result type for data-access operations
pub type Result<T> = std::result::Result<T, Error>;

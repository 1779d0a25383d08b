//! Error types for the SQLite connection.

/// Errors raised by the SQLite driver.
#[derive(Debug, thiserror::Error)]
pub enum SqliteError {
    /// Database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The private runtime could not be started.
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),

    /// A previous statement panicked while holding the connection.
    #[error("Connection lock poisoned")]
    Poisoned,
}

impl From<SqliteError> for oxide_query::Error {
    fn from(err: SqliteError) -> Self {
        Self::connection(err)
    }
}

/// Result type for SQLite operations.
pub type Result<T> = std::result::Result<T, SqliteError>;

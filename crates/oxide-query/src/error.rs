//! Error types for column resolution, row decoding and execution.

use thiserror::Error;

/// Recoverable failures raised while resolving or decoding columns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A namespaced wildcard (`"t".*`) names no table in the query.
    #[error("no such table: {name}")]
    NoSuchTable {
        /// The namespace that failed to match.
        name: String,
    },

    /// A column matches neither exactly nor by suffix.
    #[error("no such column `{name}` in columns {columns:?}")]
    NoSuchColumn {
        /// The requested column template.
        name: String,
        /// Every column name known to the row, sorted.
        columns: Vec<String>,
    },

    /// A bare column name matches more than one qualified column.
    #[error("ambiguous column `{name}` (please disambiguate: {similar:?})")]
    AmbiguousColumn {
        /// The requested column template.
        name: String,
        /// The qualified names that matched, sorted.
        similar: Vec<String>,
    },

    /// A non-optional accessor found no usable value.
    #[error("unexpected null value for column `{name}`")]
    UnexpectedNullValue {
        /// The requested column template.
        name: String,
    },
}

/// Errors returned by execution against a [`Connection`](crate::Connection).
#[derive(Debug, Error)]
pub enum Error {
    /// Column resolution or row decoding failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The connection collaborator failed (bad SQL, I/O, driver errors).
    #[error("connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps a collaborator error.
    pub fn connection<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection(Box::new(err))
    }

    /// Returns the query error, if this is one.
    #[must_use]
    pub const fn as_query(&self) -> Option<&QueryError> {
        match self {
            Self::Query(err) => Some(err),
            Self::Connection(_) => None,
        }
    }
}

/// Result type alias for execution.
pub type Result<T> = std::result::Result<T, Error>;

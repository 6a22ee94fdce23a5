use thiserror::Error;

/// Errors returned by every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Prepare, execute or fetch failure from the bundled SQLite handle.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failure reported by a foreign [`Handle`](crate::handle::Handle) implementation.
    #[error("driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("cannot convert index {index} column {column} to text")]
    Decode { index: usize, column: String },

    /// No column survived projection, so there is nothing to write.
    #[error("no columns to write for table {table}")]
    EmptyProjection { table: String },

    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),

    #[error("statement has {expected} placeholders but {actual} values were supplied")]
    PlaceholderMismatch { expected: usize, actual: usize },

    #[error("required form field `{0}` is missing")]
    MissingField(&'static str),

    #[error("unknown action {0:?}, expected `insert` or `update`")]
    UnknownAction(String),

    #[error("unknown dialect {0:?}")]
    UnknownDialect(String),
}

impl Error {
    /// Wraps an arbitrary driver error for handles not backed by rusqlite.
    pub fn driver(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Driver(err.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

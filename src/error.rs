use thiserror::Error;

/// Unified error type for the crate.
///
/// Driver and I/O failures pass through unchanged; this layer adds no
/// translation, retry, or recovery on top of them.
#[derive(Debug, Error)]
pub enum SqlValetError {
    /// No environment label was supplied and the `ENV` process variable is
    /// not set either.
    #[error("no environment given and the ENV environment variable is not set")]
    MissingEnvironment,

    #[error(transparent)]
    PostgresError(#[from] postgres::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    ArrowError(#[from] arrow::error::ArrowError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

impl SqlValetError {
    /// True when the underlying cause is a missing file (SQL resource or
    /// bulk-copy dump).
    #[must_use]
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, SqlValetError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

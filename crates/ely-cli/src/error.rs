//! CLI error types.

use ely_security::SecurityError;
use ely_store::StoreError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Security configuration failed; the message is shown as is.
    #[error(transparent)]
    Security(#[from] SecurityError),

    /// The store client could not be created.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

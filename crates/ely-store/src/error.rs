//! Store error types.

use thiserror::Error;

/// Errors raised while talking to the resource store.
///
/// A `failed` outcome is not an error at this level: it is returned as a
/// [`Response`](ely_model::Response) so callers can decide how to treat it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Body could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store answered with something that is not a response envelope.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Non-success HTTP status without a response envelope.
    #[error("management endpoint returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Credentials were missing or rejected.
    #[error("authentication required: the management endpoint rejected the credentials")]
    Unauthorized,
}

impl StoreError {
    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

//! Security configuration errors.

use ely_store::StoreError;
use thiserror::Error;

/// Errors raised while reconciling security configuration.
///
/// Messages are shown to the operator as they are.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// Contradictory or insufficient options; raised before the store is
    /// contacted.
    #[error("{0}")]
    Validation(String),

    /// A referenced resource is missing or the target is already in the
    /// requested state.
    #[error("{0}")]
    Precondition(String),

    /// The change would leave a factory without usable mechanisms.
    #[error("{0}")]
    Safety(String),

    /// The store could not be reached or answered garbage.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The store rejected the request; the description is the store's.
    #[error("{0}")]
    Failed(String),

    /// The operator declined to continue.
    #[error("Command aborted.")]
    Aborted,

    /// The request failed and undoing earlier changes failed too.
    #[error("{error} (rollback failed: {rollback})")]
    RollbackFailed {
        /// The original failure.
        #[source]
        error: Box<SecurityError>,
        /// The failure of the compensating action.
        rollback: Box<SecurityError>,
    },
}

impl SecurityError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a precondition error.
    #[must_use]
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Creates a safety error.
    #[must_use]
    pub fn safety(message: impl Into<String>) -> Self {
        Self::Safety(message.into())
    }

    /// Creates a failed-outcome error.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Attaches the failure of a compensating action.
    #[must_use]
    pub fn with_rollback_failure(self, rollback: Self) -> Self {
        Self::RollbackFailed {
            error: Box::new(self),
            rollback: Box::new(rollback),
        }
    }

    /// Checks if the operator aborted.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// The original failure, looking through a failed rollback.
    #[must_use]
    pub fn primary(&self) -> &Self {
        match self {
            Self::RollbackFailed { error, .. } => error.primary(),
            other => other,
        }
    }
}

/// Result type for security operations.
pub type SecurityResult<T> = Result<T, SecurityError>;

//! Model error types.

use thiserror::Error;

/// Errors raised while decoding management model values.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Malformed resource address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Unknown resource type name.
    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),

    /// Attribute value with an unexpected shape.
    #[error("invalid value for '{attribute}': {message}")]
    InvalidValue {
        /// Attribute name.
        attribute: String,
        /// What was wrong with it.
        message: String,
    },
}

impl ModelError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            attribute: attribute.into(),
            message: message.into(),
        }
    }
}

//! Operation responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The operation was applied.
    Success,
    /// The operation was rejected; nothing was applied.
    Failed,
}

/// Response envelope returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Outcome.
    pub outcome: Outcome,
    /// Result payload, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure description, usually a string.
    #[serde(
        rename = "failure-description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub failure_description: Option<Value>,
}

impl Response {
    /// A successful response carrying `result`.
    #[must_use]
    pub fn success(result: Value) -> Self {
        Self {
            outcome: Outcome::Success,
            result: if result.is_null() { None } else { Some(result) },
            failure_description: None,
        }
    }

    /// A failed response with the given description.
    #[must_use]
    pub fn failed(description: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failed,
            result: None,
            failure_description: Some(Value::String(description.into())),
        }
    }

    /// Whether the outcome is success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    /// The failure description as text.
    #[must_use]
    pub fn failure_message(&self) -> String {
        match &self.failure_description {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "Operation failed".to_string(),
        }
    }

    /// The result payload, or `Null` when absent.
    #[must_use]
    pub fn result_or_null(&self) -> &Value {
        self.result.as_ref().unwrap_or(&Value::Null)
    }

    /// Converts into the result payload, or the failure message.
    ///
    /// # Errors
    ///
    /// Returns the failure description when the outcome is `failed`.
    pub fn into_result(self) -> Result<Value, String> {
        if self.is_success() {
            Ok(self.result.unwrap_or(Value::Null))
        } else {
            Err(self.failure_message())
        }
    }
}

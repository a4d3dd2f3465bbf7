//! HTTP management endpoint client.

use std::time::Duration;

use async_trait::async_trait;
use ely_model::{Operation, Response};
use reqwest::StatusCode;

use crate::error::{StoreError, StoreResult};
use crate::store::ResourceStore;

/// Path of the JSON management endpoint.
const MANAGEMENT_PATH: &str = "/management";

/// Connection settings for [`HttpStore`].
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Controller base URL, for example `http://localhost:9990`.
    pub controller_url: String,
    /// Management user.
    pub username: Option<String>,
    /// Management password.
    pub password: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpStoreConfig {
    /// Creates settings for `controller_url` without credentials.
    #[must_use]
    pub fn new(controller_url: impl Into<String>) -> Self {
        Self {
            controller_url: controller_url.into(),
            username: None,
            password: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the credentials.
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.username = Some(username.into());
        self.password = password;
        self
    }
}

/// Store client posting operations to the management endpoint as JSON.
pub struct HttpStore {
    client: reqwest::Client,
    endpoint: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpStore {
    /// Creates a new client.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: HttpStoreConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            endpoint: management_endpoint(&config.controller_url),
            username: config.username,
            password: config.password,
        })
    }

    /// Full URL operations are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ResourceStore for HttpStore {
    async fn execute(&self, operation: &Operation) -> StoreResult<Response> {
        tracing::debug!(operation = %operation.name, address = %operation.address, "posting operation");

        let mut request = self.client.post(&self.endpoint).json(operation);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                StoreError::connection(e.to_string())
            } else {
                StoreError::Http(e)
            }
        })?;

        handle_response(response).await
    }
}

/// Decodes the response envelope.
///
/// The endpoint answers a rejected operation with an error status and a
/// `failed` envelope, so the body is decoded before the status is checked.
async fn handle_response(response: reqwest::Response) -> StoreResult<Response> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        return Err(StoreError::Unauthorized);
    }

    let body = response.text().await?;
    match serde_json::from_str::<Response>(&body) {
        Ok(envelope) => Ok(envelope),
        Err(e) if status.is_success() => Err(StoreError::protocol(format!(
            "invalid response envelope: {e}"
        ))),
        Err(_) => Err(StoreError::Status {
            status: status.as_u16(),
            message: body,
        }),
    }
}

fn management_endpoint(controller_url: &str) -> String {
    let base = controller_url.trim_end_matches('/');
    if base.ends_with(MANAGEMENT_PATH) {
        base.to_string()
    } else {
        format!("{base}{MANAGEMENT_PATH}")
    }
}

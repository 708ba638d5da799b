//! HTTP client for a running provisioning server.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors talking to the provisioning server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status.
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
}

/// Client for the provisioning server's REST endpoints.
pub struct ServerClient {
    inner: reqwest::Client,
    base_url: String,
}

impl ServerClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Submit a provisioning run and wait for its response.
    pub async fn create_cis(&self, request: &Value) -> Result<Value, ClientError> {
        let url = format!("{}/create-cis", self.base_url);
        debug!(url = %url, "POST request");

        let response = self.inner.post(&url).json(request).send().await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    /// Fetch a log file as text.
    pub async fn view_log(&self, file: &str) -> Result<String, ClientError> {
        let url = format!("{}/logs", self.base_url);
        debug!(url = %url, file = %file, "GET request");

        let response = self.inner.get(&url).query(&[("file", file)]).send().await?;
        let response = check(response).await?;
        Ok(response.text().await?)
    }

    /// Fetch a log file as raw bytes.
    pub async fn download_log(&self, file: &str) -> Result<Vec<u8>, ClientError> {
        let url = format!("{}/logs/download", self.base_url);
        debug!(url = %url, file = %file, "GET request");

        let response = self.inner.get(&url).query(&[("file", file)]).send().await?;
        let response = check(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Turn an error status into [`ClientError::Server`], using the `error` field
/// of the JSON body when there is one.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(text);

    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

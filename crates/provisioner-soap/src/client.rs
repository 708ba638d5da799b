//! HTTP transport for SOAP requests.

use std::time::Duration;

use async_trait::async_trait;
use provisioner_dispatcher::{RemoteClient, TransportError};
use reqwest::header::CONTENT_TYPE;
use tracing::trace;

use crate::error::SoapError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts payloads as `text/xml` and returns the response body.
///
/// Any non-2xx status is a transport failure. The client is cheap to clone
/// and shares its connection pool across every worker.
#[derive(Debug, Clone)]
pub struct HttpRemoteClient {
    inner: reqwest::Client,
}

impl HttpRemoteClient {
    /// Create a client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, SoapError> {
        let inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { inner })
    }

    /// Wrap an existing reqwest client.
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn send(&self, endpoint: &str, payload: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        trace!(endpoint = %endpoint, bytes = payload.len(), "POST");

        let response = self
            .inner
            .post(endpoint)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(payload)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Body(e.to_string())
            }
        })?;
        Ok(body.to_vec())
    }
}

fn request_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RESULT: &str = "<Envelope><Body><R><ResultHeader><ResultCode>0000</ResultCode>\
                          </ResultHeader></R></Body></Envelope>";

    async fn server_with(template: ResponseTemplate) -> (MockServer, String) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/BcServices"))
            .and(header("content-type", "text/xml; charset=utf-8"))
            .respond_with(template)
            .mount(&server)
            .await;
        let endpoint = format!("{}/services/BcServices", server.uri());
        (server, endpoint)
    }

    #[tokio::test]
    async fn test_posts_payload_and_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/BcServices"))
            .and(body_string_contains("<CustKey>628100001</CustKey>"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RESULT))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpRemoteClient::new(DEFAULT_TIMEOUT).unwrap();
        let body = client
            .send(
                &format!("{}/services/BcServices", server.uri()),
                b"<CustKey>628100001</CustKey>".to_vec(),
            )
            .await
            .unwrap();

        assert_eq!(body, RESULT.as_bytes());
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let (_server, endpoint) =
            server_with(ResponseTemplate::new(500).set_body_string(RESULT)).await;

        let client = HttpRemoteClient::new(DEFAULT_TIMEOUT).unwrap();
        let err = client.send(&endpoint, b"<x/>".to_vec()).await.unwrap_err();

        assert_eq!(err, TransportError::Status { status: 500 });
    }

    #[tokio::test]
    async fn test_timeout() {
        let (_server, endpoint) = server_with(
            ResponseTemplate::new(200)
                .set_body_string(RESULT)
                .set_delay(Duration::from_millis(500)),
        )
        .await;

        let client = HttpRemoteClient::new(Duration::from_millis(50)).unwrap();
        let err = client.send(&endpoint, b"<x/>".to_vec()).await.unwrap_err();

        assert_eq!(err, TransportError::Timeout);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let client = HttpRemoteClient::new(Duration::from_secs(2)).unwrap();
        let err = client
            .send("http://127.0.0.1:1/services/BcServices", b"<x/>".to_vec())
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Request(_)));
    }
}

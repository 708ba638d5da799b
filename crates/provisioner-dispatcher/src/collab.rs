//! Collaborator seams.
//!
//! The dispatcher knows nothing about the remote protocol. Everything
//! protocol-specific is injected through these traits.

use std::sync::Arc;

use async_trait::async_trait;
use provisioner_core::{Outcome, RunConfig, Task};
use thiserror::Error;

/// The payload cannot be rendered from the task and configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A required protocol parameter is absent.
    #[error("Missing protocol parameter: {0}")]
    MissingParam(&'static str),

    /// A protocol parameter has an unusable value.
    #[error("Invalid value for protocol parameter '{name}': {value}")]
    InvalidParam { name: &'static str, value: String },
}

/// Transport-level failure of a single request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be sent (connection refused, DNS, TLS...).
    #[error("Request failed: {0}")]
    Request(String),

    /// The request did not complete in time.
    #[error("Request timed out")]
    Timeout,

    /// The remote answered with a non-success HTTP status.
    #[error("Remote returned HTTP {status}")]
    Status { status: u16 },

    /// The response body could not be read.
    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// The response bytes could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The response body was empty.
    #[error("Empty response body")]
    Empty,

    /// The response is not well-formed.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The document root is not what the protocol expects.
    #[error("Unexpected document root <{0}>")]
    UnexpectedRoot(String),

    /// The remote answered with a protocol-level fault.
    #[error("Remote fault: {0}")]
    Fault(String),
}

/// Writing one outcome failed. Fatal to that write only.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Business result extracted from a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedResponse {
    /// Business result code. Empty when the response had none.
    pub code: String,

    /// Human-readable result description.
    pub description: String,
}

impl DecodedResponse {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

/// Renders the outbound request for one task.
pub trait PayloadBuilder: Send + Sync {
    /// Check once, before any task runs, that `config` carries everything
    /// [`build`](Self::build) needs.
    fn validate(&self, config: &RunConfig) -> Result<(), TemplateError>;

    /// Build the request body for `task`. No I/O.
    fn build(&self, task: &Task, config: &RunConfig) -> Result<Vec<u8>, TemplateError>;
}

/// Sends one payload and returns the raw response body.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn send(&self, endpoint: &str, payload: Vec<u8>) -> Result<Vec<u8>, TransportError>;
}

/// Extracts the business result from a raw response body.
pub trait ResponseDecoder: Send + Sync {
    fn decode(&self, body: &[u8]) -> Result<DecodedResponse, DecodeError>;
}

/// Append-only destination for outcomes.
///
/// Called concurrently from every worker; implementations serialize their own
/// writes so records never interleave.
#[async_trait]
pub trait OutcomeSink: Send + Sync {
    async fn append(&self, outcome: &Outcome) -> Result<(), SinkError>;

    /// Flush buffered records. Called once after the pool has drained.
    async fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Everything the dispatcher needs from the outside world.
#[derive(Clone)]
pub struct Collaborators {
    pub payload: Arc<dyn PayloadBuilder>,
    pub client: Arc<dyn RemoteClient>,
    pub decoder: Arc<dyn ResponseDecoder>,
    pub sink: Arc<dyn OutcomeSink>,
}

impl Collaborators {
    /// Bundle the four collaborators.
    pub fn new(
        payload: Arc<dyn PayloadBuilder>,
        client: Arc<dyn RemoteClient>,
        decoder: Arc<dyn ResponseDecoder>,
        sink: Arc<dyn OutcomeSink>,
    ) -> Self {
        Self {
            payload,
            client,
            decoder,
            sink,
        }
    }

    /// Same collaborators, different sink.
    pub fn with_sink(mut self, sink: Arc<dyn OutcomeSink>) -> Self {
        self.sink = sink;
        self
    }
}

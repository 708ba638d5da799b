//! Error types for the SOAP adapters.

use thiserror::Error;

/// Errors raised while setting up the adapters.
///
/// Per-request failures are reported through the dispatcher's
/// `TransportError` and `DecodeError` instead.
#[derive(Debug, Error)]
pub enum SoapError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

//! Per-identifier outcome records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal classification of one identifier's processing attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    /// The remote system returned the success sentinel.
    Success,
    /// The remote system answered with a non-success result code.
    BusinessFailure,
    /// The request could not be delivered or the response could not be read.
    TransportError,
    /// The response could not be decoded.
    DecodeError,
    /// Unexpected fault while processing the task (recovered panic, payload
    /// build failure).
    InternalFault,
}

impl OutcomeStatus {
    /// Every status, in reporting order.
    pub const ALL: [OutcomeStatus; 5] = [
        Self::Success,
        Self::BusinessFailure,
        Self::TransportError,
        Self::DecodeError,
        Self::InternalFault,
    ];

    /// Stable upper-case label used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::BusinessFailure => "BUSINESS_FAILURE",
            Self::TransportError => "TRANSPORT_ERROR",
            Self::DecodeError => "DECODE_ERROR",
            Self::InternalFault => "INTERNAL_FAULT",
        }
    }

    /// Returns true for [`OutcomeStatus::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of what happened to one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Identifier that was processed.
    pub identifier: u64,

    /// Classification of the attempt.
    pub status: OutcomeStatus,

    /// Business result code returned by the remote system, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Result description or error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Index of the worker that produced this outcome.
    pub worker: usize,

    /// When the outcome was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl Outcome {
    fn new(
        identifier: u64,
        worker: usize,
        status: OutcomeStatus,
        code: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            identifier,
            status,
            code,
            description,
            worker,
            recorded_at: Utc::now(),
        }
    }

    /// The remote system accepted the request.
    pub fn success(
        identifier: u64,
        worker: usize,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(
            identifier,
            worker,
            OutcomeStatus::Success,
            Some(code.into()),
            non_empty(description.into()),
        )
    }

    /// The remote system rejected the request with a business result code.
    pub fn business_failure(
        identifier: u64,
        worker: usize,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(
            identifier,
            worker,
            OutcomeStatus::BusinessFailure,
            Some(code.into()),
            non_empty(description.into()),
        )
    }

    /// The request never produced a readable response.
    pub fn transport_error(identifier: u64, worker: usize, error: impl fmt::Display) -> Self {
        Self::new(
            identifier,
            worker,
            OutcomeStatus::TransportError,
            None,
            Some(error.to_string()),
        )
    }

    /// The response was received but could not be decoded.
    pub fn decode_error(identifier: u64, worker: usize, error: impl fmt::Display) -> Self {
        Self::new(
            identifier,
            worker,
            OutcomeStatus::DecodeError,
            None,
            Some(error.to_string()),
        )
    }

    /// Processing the task faulted.
    pub fn internal_fault(identifier: u64, worker: usize, reason: impl fmt::Display) -> Self {
        Self::new(
            identifier,
            worker,
            OutcomeStatus::InternalFault,
            None,
            Some(reason.to_string()),
        )
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

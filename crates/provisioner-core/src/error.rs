//! Configuration-time errors.
//!
//! These are the only errors that escape a run. Everything that goes wrong
//! while a single identifier is being processed becomes an [`Outcome`]
//! instead.
//!
//! [`Outcome`]: crate::Outcome

use thiserror::Error;

use crate::config::MAX_WORKER_COUNT;

/// The identifier range is empty because `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Start range cannot be greater than end range ({start} > {end})")]
pub struct RangeError {
    pub start: u64,
    pub end: u64,
}

/// Errors that prevent a run from starting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Invalid identifier range.
    #[error(transparent)]
    Range(#[from] RangeError),

    /// Worker count outside `1..=MAX_WORKER_COUNT`.
    #[error("Worker count must be between 1 and {MAX_WORKER_COUNT}, got {0}")]
    InvalidWorkerCount(usize),

    /// No remote endpoint configured.
    #[error("Remote endpoint is empty, check the end-point")]
    MissingEndpoint,

    /// The payload template cannot be rendered with this configuration.
    #[error("Payload template error: {0}")]
    Template(String),
}

impl ConfigError {
    /// Returns true if this is a range error.
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Range(_))
    }
}

//! The unit of work handed to a worker.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single identifier drawn from the run's range.
///
/// Tasks are created lazily by the task source and moved through the queue to
/// exactly one worker; they are never shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Task {
    identifier: u64,
}

impl Task {
    /// Create a task for the given identifier.
    pub const fn new(identifier: u64) -> Self {
        Self { identifier }
    }

    /// The identifier (MSISDN) to provision.
    pub const fn identifier(&self) -> u64 {
        self.identifier
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)
    }
}

impl From<u64> for Task {
    fn from(identifier: u64) -> Self {
        Self::new(identifier)
    }
}

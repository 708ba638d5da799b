//! Run identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies one provisioning run across its log lines, its outcome log file
/// name and the summary handed back to the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Wrap an id chosen by the caller, e.g. one echoed back to a client.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh v4 UUID for a run started without a caller-chosen id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters. Used as the run span field and as the suffix
    /// that keeps outcome logs of runs started in the same second apart.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

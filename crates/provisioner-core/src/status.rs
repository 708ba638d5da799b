//! Lifecycle of a single run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a run.
///
/// `Idle → Dispatching → Draining → Completed`, or `Cancelled` from either
/// active state once the cancellation signal fires. `Aborted` ends a run in
/// which a worker died, leaving identifiers unattempted without a cancel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    /// Configuration accepted, nothing started yet.
    #[default]
    Idle,
    /// Workers running and the queue is being fed.
    Dispatching,
    /// Queue closed, workers finishing in-flight tasks.
    Draining,
    /// Every identifier was attempted.
    Completed,
    /// The run was cancelled before it finished.
    Cancelled,
    /// A worker terminated abnormally and the range was not fully attempted.
    Aborted,
}

impl RunState {
    /// Returns true if the run is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Aborted)
    }

    /// Returns true if `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Dispatching)
                | (Self::Dispatching, Self::Draining)
                | (Self::Dispatching, Self::Cancelled)
                | (Self::Draining, Self::Completed)
                | (Self::Draining, Self::Cancelled)
                | (Self::Dispatching, Self::Aborted)
                | (Self::Draining, Self::Aborted)
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Dispatching => "dispatching",
            Self::Draining => "draining",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

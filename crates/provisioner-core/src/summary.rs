//! Aggregate result of a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OutcomeStatus, RunId, RunState};

/// Number of outcomes recorded per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub success: u64,
    pub business_failure: u64,
    pub transport_error: u64,
    pub decode_error: u64,
    pub internal_fault: u64,
}

impl StatusCounts {
    /// Count one more outcome with the given status.
    pub fn record(&mut self, status: OutcomeStatus) {
        *self.slot(status) += 1;
    }

    /// Count `n` more outcomes with the given status.
    pub fn record_n(&mut self, status: OutcomeStatus, n: u64) {
        *self.slot(status) += n;
    }

    /// Count for a single status.
    pub fn get(&self, status: OutcomeStatus) -> u64 {
        match status {
            OutcomeStatus::Success => self.success,
            OutcomeStatus::BusinessFailure => self.business_failure,
            OutcomeStatus::TransportError => self.transport_error,
            OutcomeStatus::DecodeError => self.decode_error,
            OutcomeStatus::InternalFault => self.internal_fault,
        }
    }

    /// Sum over all statuses.
    pub fn total(&self) -> u64 {
        OutcomeStatus::ALL.iter().map(|s| self.get(*s)).sum()
    }

    /// Everything that was not a success.
    pub fn failures(&self) -> u64 {
        self.total() - self.success
    }

    fn slot(&mut self, status: OutcomeStatus) -> &mut u64 {
        match status {
            OutcomeStatus::Success => &mut self.success,
            OutcomeStatus::BusinessFailure => &mut self.business_failure,
            OutcomeStatus::TransportError => &mut self.transport_error,
            OutcomeStatus::DecodeError => &mut self.decode_error,
            OutcomeStatus::InternalFault => &mut self.internal_fault,
        }
    }
}

/// What a run did, returned to the caller once every worker has exited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run identifier.
    pub run_id: RunId,

    /// Terminal state: `Completed`, `Cancelled` or `Aborted`.
    pub state: RunState,

    /// Outcomes per status.
    pub counts: StatusCounts,

    /// Identifiers for which an outcome was produced.
    pub attempted: u64,

    /// Size of the configured range.
    pub expected: u64,

    /// Outcomes the sink failed to persist. They are still counted above.
    pub sink_failures: u64,

    /// When dispatching started.
    pub started_at: DateTime<Utc>,

    /// When the last worker exited.
    pub finished_at: DateTime<Utc>,

    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u64,
}

impl RunSummary {
    /// Returns true if the run was cancelled before finishing.
    pub fn is_cancelled(&self) -> bool {
        self.state == RunState::Cancelled
    }

    /// Returns true if every identifier in the range was attempted.
    pub fn is_complete(&self) -> bool {
        self.state == RunState::Completed && self.attempted == self.expected
    }

    /// Returns true if a worker died and the run stopped short.
    pub fn is_aborted(&self) -> bool {
        self.state == RunState::Aborted
    }

    /// Identifiers that were never attempted (non-zero only after cancellation
    /// or an aborted run).
    pub fn not_attempted(&self) -> u64 {
        self.expected.saturating_sub(self.attempted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_record_and_total() {
        let mut counts = StatusCounts::default();
        counts.record(OutcomeStatus::Success);
        counts.record(OutcomeStatus::Success);
        counts.record(OutcomeStatus::TransportError);
        counts.record(OutcomeStatus::InternalFault);

        assert_eq!(counts.success, 2);
        assert_eq!(counts.get(OutcomeStatus::TransportError), 1);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.failures(), 2);
    }

    #[test]
    fn test_summary_completion() {
        let now = Utc::now();
        let mut summary = RunSummary {
            run_id: RunId::new("r"),
            state: RunState::Completed,
            counts: StatusCounts::default(),
            attempted: 3,
            expected: 3,
            sink_failures: 0,
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        };
        assert!(summary.is_complete());
        assert_eq!(summary.not_attempted(), 0);

        summary.state = RunState::Cancelled;
        summary.attempted = 1;
        assert!(summary.is_cancelled());
        assert!(!summary.is_complete());
        assert_eq!(summary.not_attempted(), 2);
    }
}

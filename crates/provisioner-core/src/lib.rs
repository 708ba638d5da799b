//! Provisioner Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Async runtimes
//! - Remote protocol specifics
//!
//! Everything here describes one bulk-provisioning run: its configuration,
//! the tasks it is made of, the outcome recorded per identifier, and the
//! summary handed back to the caller.

pub mod config;
pub mod error;
pub mod ids;
pub mod outcome;
pub mod status;
pub mod summary;
pub mod task;

// Re-export commonly used types
pub use config::{
    Credentials, RunConfig, DEFAULT_ISSUE_INTERVAL, DEFAULT_WORKER_COUNT, MAX_WORKER_COUNT,
};
pub use error::{ConfigError, RangeError};
pub use ids::RunId;
pub use outcome::{Outcome, OutcomeStatus};
pub use status::RunState;
pub use summary::{RunSummary, StatusCounts};
pub use task::Task;

//! Run configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Worker count used when the trigger does not specify one.
pub const DEFAULT_WORKER_COUNT: usize = 50;

/// Upper bound on concurrent workers for a single run.
pub const MAX_WORKER_COUNT: usize = 1024;

/// Minimum time between two requests issued by the same worker.
pub const DEFAULT_ISSUE_INTERVAL: Duration = Duration::from_millis(500);

/// Credentials presented to the remote system on every request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Login system code.
    pub login: String,

    /// Password for the login system code.
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Immutable description of a single run.
///
/// Built once by the trigger layer and shared read-only with every worker.
/// Validation happens when the run starts, not here, so a `RunConfig` can be
/// assembled field by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// First identifier of the range (inclusive).
    pub start: u64,

    /// Last identifier of the range (inclusive).
    pub end: u64,

    /// Number of concurrent workers.
    pub worker_count: usize,

    /// Minimum interval between two requests from the same worker.
    /// Zero disables throttling.
    pub issue_interval: Duration,

    /// Remote endpoint every request is sent to.
    pub endpoint: String,

    /// Credentials for the remote system.
    pub credentials: Credentials,

    /// Protocol-specific parameters, opaque to the dispatcher.
    pub params: BTreeMap<String, String>,
}

impl RunConfig {
    /// Create a config for `[start, end]` against `endpoint` with default
    /// worker count and issue interval.
    pub fn new(start: u64, end: u64, endpoint: impl Into<String>) -> Self {
        Self {
            start,
            end,
            worker_count: DEFAULT_WORKER_COUNT,
            issue_interval: DEFAULT_ISSUE_INTERVAL,
            endpoint: endpoint.into(),
            credentials: Credentials::default(),
            params: BTreeMap::new(),
        }
    }

    /// Builder method to set the worker count.
    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Builder method to set the per-worker issue interval.
    pub fn with_issue_interval(mut self, interval: Duration) -> Self {
        self.issue_interval = interval;
        self
    }

    /// Builder method to set credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Builder method to add a protocol parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Look up a protocol parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Number of identifiers in the range, or zero if the range is inverted.
    ///
    /// Saturates at `u64::MAX` for the full `0..=u64::MAX` range.
    pub fn expected_total(&self) -> u64 {
        if self.start > self.end {
            0
        } else {
            (self.end - self.start).saturating_add(1)
        }
    }
}

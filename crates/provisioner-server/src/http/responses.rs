//! HTTP request and response types.

use std::time::Duration;

use provisioner_core::{Credentials, RunConfig, RunSummary, DEFAULT_WORKER_COUNT};
use provisioner_soap::params;
use serde::{Deserialize, Serialize};

// ============================================================================
// Provisioning types
// ============================================================================

/// Request body for `POST /create-cis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCisRequest {
    /// Login system code.
    pub login: String,

    pub password: String,

    #[serde(rename = "startRange")]
    pub start_range: u64,

    #[serde(rename = "endRange")]
    pub end_range: u64,

    /// CreateSubscriber endpoint URL.
    #[serde(rename = "endPoint", default)]
    pub end_point: String,

    #[serde(rename = "offeringId", default)]
    pub offering_id: Option<u64>,

    #[serde(rename = "BillCycleType", default)]
    pub bill_cycle_type: Option<u64>,

    /// Worker count; missing or zero means the default.
    #[serde(rename = "numWorkers", default)]
    pub num_workers: Option<usize>,

    /// Minimum delay between two requests of one worker.
    #[serde(rename = "intervalMs", default)]
    pub interval_ms: Option<u64>,
}

impl CreateCisRequest {
    /// Map the request onto a run configuration.
    pub fn into_run_config(self) -> RunConfig {
        let workers = match self.num_workers {
            Some(n) if n > 0 => n,
            _ => DEFAULT_WORKER_COUNT,
        };

        let mut config = RunConfig::new(self.start_range, self.end_range, self.end_point)
            .with_workers(workers)
            .with_credentials(Credentials::new(self.login, self.password));

        if let Some(ms) = self.interval_ms {
            config = config.with_issue_interval(Duration::from_millis(ms));
        }
        if let Some(id) = self.offering_id {
            config = config.with_param(params::OFFERING_ID, id.to_string());
        }
        if let Some(kind) = self.bill_cycle_type {
            config = config.with_param(params::BILL_CYCLE_TYPE, kind.to_string());
        }
        config
    }
}

/// Response body for `POST /create-cis`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCisResponse {
    pub message: String,

    /// Log file name, usable with `/logs?file=`.
    #[serde(rename = "logFile")]
    pub log_file: String,

    /// Relative download URL of the log file.
    #[serde(rename = "logUrl")]
    pub log_url: String,

    pub summary: RunSummary,
}

// ============================================================================
// Log types
// ============================================================================

/// Query string of the log endpoints.
#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub file: Option<String>,
}

// ============================================================================
// Error types
// ============================================================================

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

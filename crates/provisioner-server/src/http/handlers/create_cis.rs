//! Provisioning run handler.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use chrono::{DateTime, Local};
use provisioner_core::{RunId, RunState};
use provisioner_dispatcher::{validate_config, Dispatcher, FileOutcomeSink};
use tracing::{error, info, warn};

use crate::http::responses::{CreateCisRequest, CreateCisResponse};
use crate::http::ApiError;
use crate::state::AppState;

/// Outcome log name for a run started at `now`.
fn log_file_name(now: DateTime<Local>, run_id: &RunId) -> String {
    format!("createCI-{}-{}.log", now.format("%Y%m%d-%H%M%S"), run_id.short())
}

/// Run a provisioning range to completion.
///
/// Responds once every identifier has been attempted, with the run summary
/// and the location of its outcome log.
pub async fn create_cis(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateCisRequest>, JsonRejection>,
) -> Result<Json<CreateCisResponse>, ApiError> {
    let Json(req) = body.map_err(|e| {
        warn!(error = %e, "Rejected request body");
        ApiError::BadRequest(format!("Invalid request body: {}", e.body_text()))
    })?;

    let config = req.into_run_config();
    validate_config(&config, state.payload.as_ref())?;

    let run_id = RunId::generate();
    let file_name = log_file_name(Local::now(), &run_id);
    let path = state.config.log_dir.join(&file_name);

    let sink = FileOutcomeSink::create(&path, state.config.log_format.into())
        .await
        .map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to open outcome log");
            ApiError::Internal("failed to open log file".to_string())
        })?;

    info!(
        run_id = %run_id,
        log_file = %file_name,
        start = config.start,
        end = config.end,
        workers = config.worker_count,
        login = %config.credentials.login,
        "Accepted provisioning request"
    );

    let dispatcher = Dispatcher::new(state.collaborators(Arc::new(sink)));
    let summary = dispatcher
        .run_as(run_id, config, state.shutdown.child_token())
        .await?;

    let message = match summary.state {
        RunState::Cancelled => "Request cancelled before completion",
        RunState::Aborted => "Request aborted, some identifiers were not attempted",
        _ => "Request processed successfully",
    };

    Ok(Json(CreateCisResponse {
        message: message.to_string(),
        log_url: format!("/logs/download?file={file_name}"),
        log_file: file_name,
        summary,
    }))
}

//! Outcome log handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::http::responses::LogQuery;
use crate::http::ApiError;
use crate::state::AppState;

/// Log file contents as plain text.
pub async fn view_log(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogQuery>,
) -> Result<Response, ApiError> {
    let (_, data) = read_log(&state, query).await?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], data).into_response())
}

/// Log file contents as an attachment.
pub async fn download_log(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogQuery>,
) -> Result<Response, ApiError> {
    let (name, data) = read_log(&state, query).await?;
    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{name}\""),
        ),
    ];
    Ok((headers, data).into_response())
}

async fn read_log(state: &AppState, query: LogQuery) -> Result<(String, Vec<u8>), ApiError> {
    let name = query
        .file
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::BadRequest("log file not specified".to_string()))?;

    if !is_plain_file_name(&name) {
        warn!(file = %name, "Rejected log file name");
        return Err(ApiError::BadRequest("invalid log file name".to_string()));
    }

    let path = state.config.log_dir.join(&name);
    match tokio::fs::read(&path).await {
        Ok(data) => Ok((name, data)),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Log file unavailable");
            Err(ApiError::NotFound("log file not found".to_string()))
        }
    }
}

/// A bare file name: no separators, no parent references.
fn is_plain_file_name(name: &str) -> bool {
    !name.contains(['/', '\\', '\0']) && !name.contains("..")
}

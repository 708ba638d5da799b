//! Run orchestration.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use provisioner_core::{ConfigError, RunConfig, RunId, RunState, RunSummary, MAX_WORKER_COUNT};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};

use crate::collab::{Collaborators, PayloadBuilder};
use crate::source::TaskSource;
use crate::worker::{worker_loop, Tally, WorkerContext};

/// Drives one provisioning run over a bounded worker pool.
///
/// A `Dispatcher` holds no per-run state and can be reused for any number of
/// sequential or concurrent runs.
#[derive(Clone)]
pub struct Dispatcher {
    collaborators: Collaborators,
}

impl Dispatcher {
    pub fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Check `config` without starting anything. See [`validate_config`].
    pub fn validate(&self, config: &RunConfig) -> Result<(), ConfigError> {
        validate_config(config, self.collaborators.payload.as_ref())
    }

    /// Run to completion.
    pub async fn run(&self, config: RunConfig) -> Result<RunSummary, ConfigError> {
        self.run_with_cancel(config, CancellationToken::new()).await
    }

    /// Run until completion or until `cancel` fires.
    ///
    /// On cancellation, in-flight requests are abandoned, queued identifiers
    /// are never attempted and the returned summary is in the
    /// [`RunState::Cancelled`] state. Dropping the returned future also stops
    /// the workers.
    pub async fn run_with_cancel(
        &self,
        config: RunConfig,
        cancel: CancellationToken,
    ) -> Result<RunSummary, ConfigError> {
        self.run_as(RunId::generate(), config, cancel).await
    }

    /// Like [`run_with_cancel`](Self::run_with_cancel) with a caller-chosen id.
    pub async fn run_as(
        &self,
        run_id: RunId,
        config: RunConfig,
        cancel: CancellationToken,
    ) -> Result<RunSummary, ConfigError> {
        let source = match open_source(&config, self.collaborators.payload.as_ref()) {
            Ok(source) => source,
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "Rejected run configuration");
                return Err(e);
            }
        };

        let span = info_span!("run", run_id = %run_id.short());
        self.dispatch(run_id, config, source, cancel)
            .instrument(span)
            .await
    }

    async fn dispatch(
        &self,
        run_id: RunId,
        config: RunConfig,
        source: TaskSource,
        cancel: CancellationToken,
    ) -> Result<RunSummary, ConfigError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let expected = source.remaining();
        let worker_count = config.worker_count;

        let cancel = cancel.child_token();
        let _stop_workers = cancel.clone().drop_guard();

        let mut state = RunState::Idle;
        info!(
            start = config.start,
            end = config.end,
            expected,
            workers = worker_count,
            interval_ms = u64::try_from(config.issue_interval.as_millis()).unwrap_or(u64::MAX),
            endpoint = %config.endpoint,
            "Starting run"
        );

        let (tx, rx) = mpsc::channel(worker_count);
        let tally = Arc::new(Tally::default());
        let ctx = Arc::new(WorkerContext {
            config: Arc::new(config),
            collaborators: self.collaborators.clone(),
            queue: Arc::new(Mutex::new(rx)),
            tally: tally.clone(),
            cancel: cancel.clone(),
        });

        advance(&mut state, RunState::Dispatching);
        let handles: Vec<_> = (0..worker_count)
            .map(|index| tokio::spawn(worker_loop(index, ctx.clone())))
            .collect();
        drop(ctx);

        for task in source {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                sent = tx.send(task) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }
        drop(tx);

        if !cancel.is_cancelled() {
            advance(&mut state, RunState::Draining);
        }

        let mut dead_workers = 0usize;
        for (index, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                error!(worker = index, error = %e, "Worker terminated abnormally");
                dead_workers += 1;
            }
        }

        let cancelled = cancel.is_cancelled();

        if let Err(e) = self.collaborators.sink.flush().await {
            warn!(error = %e, "Failed to flush outcome sink");
        }

        let counts = tally.counts();
        let attempted = counts.total();
        advance(
            &mut state,
            final_state(cancelled, dead_workers, attempted, expected),
        );

        let summary = RunSummary {
            run_id,
            state,
            counts,
            attempted,
            expected,
            sink_failures: tally.sink_failures(),
            started_at,
            finished_at: Utc::now(),
            duration_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        info!(
            state = %summary.state,
            attempted = summary.attempted,
            success = summary.counts.success,
            failures = summary.counts.failures(),
            sink_failures = summary.sink_failures,
            duration_ms = summary.duration_ms,
            "Run finished"
        );

        Ok(summary)
    }
}

/// Check a run configuration before any task starts.
///
/// Checks run in order: range, worker count, endpoint, payload template.
pub fn validate_config(config: &RunConfig, payload: &dyn PayloadBuilder) -> Result<(), ConfigError> {
    open_source(config, payload).map(|_| ())
}

fn open_source(config: &RunConfig, payload: &dyn PayloadBuilder) -> Result<TaskSource, ConfigError> {
    let source = TaskSource::new(config.start, config.end)?;
    if config.worker_count == 0 || config.worker_count > MAX_WORKER_COUNT {
        return Err(ConfigError::InvalidWorkerCount(config.worker_count));
    }
    if config.endpoint.trim().is_empty() {
        return Err(ConfigError::MissingEndpoint);
    }
    payload
        .validate(config)
        .map_err(|e| ConfigError::Template(e.to_string()))?;
    Ok(source)
}

/// Terminal state once every worker has been joined.
///
/// A run that was not cancelled only completes if every worker exited
/// normally and every identifier produced an outcome.
fn final_state(cancelled: bool, dead_workers: usize, attempted: u64, expected: u64) -> RunState {
    if cancelled {
        RunState::Cancelled
    } else if dead_workers > 0 || attempted != expected {
        RunState::Aborted
    } else {
        RunState::Completed
    }
}

fn advance(state: &mut RunState, next: RunState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal run transition {state} -> {next}"
    );
    info!(from = %state, to = %next, "Run state changed");
    *state = next;
}

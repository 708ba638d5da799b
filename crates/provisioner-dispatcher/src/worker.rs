//! Worker pool internals.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::FutureExt;
use provisioner_core::{Outcome, OutcomeStatus, RunConfig, StatusCounts, Task};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::collab::Collaborators;
use crate::limiter::RateLimiter;

/// Receiving half of the task queue, shared by every worker.
pub(crate) type SharedQueue = Arc<Mutex<mpsc::Receiver<Task>>>;

/// Per-run counters, updated by workers as outcomes are written.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    by_status: [AtomicU64; OutcomeStatus::ALL.len()],
    sink_failures: AtomicU64,
}

impl Tally {
    fn record(&self, status: OutcomeStatus) {
        self.by_status[slot(status)].fetch_add(1, Ordering::Relaxed);
    }

    fn sink_failure(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for status in OutcomeStatus::ALL {
            counts.record_n(status, self.by_status[slot(status)].load(Ordering::Relaxed));
        }
        counts
    }

    pub(crate) fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }
}

fn slot(status: OutcomeStatus) -> usize {
    match status {
        OutcomeStatus::Success => 0,
        OutcomeStatus::BusinessFailure => 1,
        OutcomeStatus::TransportError => 2,
        OutcomeStatus::DecodeError => 3,
        OutcomeStatus::InternalFault => 4,
    }
}

/// Everything a worker needs, shared across the pool.
pub(crate) struct WorkerContext {
    pub(crate) config: Arc<RunConfig>,
    pub(crate) collaborators: Collaborators,
    pub(crate) queue: SharedQueue,
    pub(crate) tally: Arc<Tally>,
    pub(crate) cancel: CancellationToken,
}

impl WorkerContext {
    /// Next task, or `None` once the queue is closed and empty or the run
    /// is cancelled.
    async fn next_task(&self) -> Option<Task> {
        let mut queue = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return None,
            guard = self.queue.lock() => guard,
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            task = queue.recv() => task,
        }
    }

    /// Tally `outcome` and hand it to the sink. A sink error or panic is
    /// counted as a sink failure and never takes the worker down.
    async fn record(&self, outcome: Outcome) {
        self.tally.record(outcome.status);
        let appended = AssertUnwindSafe(self.collaborators.sink.append(&outcome))
            .catch_unwind()
            .await;
        let reason = match appended {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(panic) => format!("sink panicked: {}", panic_message(panic.as_ref())),
        };
        warn!(
            identifier = outcome.identifier,
            worker = outcome.worker,
            error = %reason,
            "Failed to write outcome"
        );
        self.tally.sink_failure();
    }
}

/// Pull tasks until the queue is drained or the run is cancelled.
pub(crate) async fn worker_loop(index: usize, ctx: Arc<WorkerContext>) {
    let mut limiter = RateLimiter::new(ctx.config.issue_interval);
    let mut processed = 0u64;

    while let Some(task) = ctx.next_task().await {
        if !limiter.acquire_or_cancel(&ctx.cancel).await {
            break;
        }

        let outcome = match AssertUnwindSafe(process(index, task, &ctx))
            .catch_unwind()
            .await
        {
            Ok(Some(outcome)) => outcome,
            // interrupted mid-request: not attempted
            Ok(None) => break,
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                warn!(identifier = %task, worker = index, reason = %reason, "Task panicked");
                Outcome::internal_fault(task.identifier(), index, format!("panic: {reason}"))
            }
        };

        ctx.record(outcome).await;
        processed += 1;
    }

    debug!(worker = index, processed, "Worker exited");
}

/// Run one task through build, send, decode and classify.
///
/// Returns `None` if the run was cancelled while the request was in flight.
async fn process(index: usize, task: Task, ctx: &WorkerContext) -> Option<Outcome> {
    let id = task.identifier();
    let collaborators = &ctx.collaborators;

    let payload = match collaborators.payload.build(&task, &ctx.config) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(identifier = id, worker = index, error = %e, "Failed to build payload");
            return Some(Outcome::internal_fault(
                id,
                index,
                format!("payload build failed: {e}"),
            ));
        }
    };

    let sent = tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => return None,
        sent = collaborators.client.send(&ctx.config.endpoint, payload) => sent,
    };

    let body = match sent {
        Ok(body) => body,
        Err(e) => {
            warn!(identifier = id, worker = index, error = %e, "Request failed");
            return Some(Outcome::transport_error(id, index, e));
        }
    };

    let decoded = match collaborators.decoder.decode(&body) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(identifier = id, worker = index, error = %e, "Failed to decode response");
            return Some(Outcome::decode_error(id, index, e));
        }
    };

    let classification = classify(&decoded.code, &decoded.description);
    let outcome = match classification.status {
        OutcomeStatus::Success => {
            debug!(identifier = id, worker = index, "Provisioned");
            Outcome::success(id, index, classification.code, classification.description)
        }
        OutcomeStatus::BusinessFailure => {
            debug!(
                identifier = id,
                worker = index,
                code = %classification.code,
                description = %classification.description,
                "Rejected by remote"
            );
            Outcome::business_failure(id, index, classification.code, classification.description)
        }
        _ => {
            warn!(identifier = id, worker = index, "Response carried no result code");
            Outcome::decode_error(id, index, "response carried no result code")
        }
    };
    Some(outcome)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

//! Deterministic collaborators for dispatcher tests.
//!
//! Payloads are the identifier in decimal; responses are `code|description`.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use provisioner_core::{Outcome, RunConfig, Task};

use crate::collab::{
    Collaborators, DecodeError, DecodedResponse, OutcomeSink, PayloadBuilder, RemoteClient,
    ResponseDecoder, SinkError, TemplateError, TransportError,
};
use crate::sink::MemoryOutcomeSink;

pub(crate) const ENDPOINT: &str = "http://stub.local/services/BcServices";

pub(crate) fn config(start: u64, end: u64, workers: usize) -> RunConfig {
    RunConfig::new(start, end, ENDPOINT)
        .with_workers(workers)
        .with_issue_interval(Duration::ZERO)
}

#[derive(Default)]
pub(crate) struct StubBuilder {
    pub(crate) panic_on: HashSet<u64>,
    pub(crate) fail_on: HashSet<u64>,
    pub(crate) reject_config: bool,
}

impl PayloadBuilder for StubBuilder {
    fn validate(&self, _config: &RunConfig) -> Result<(), TemplateError> {
        if self.reject_config {
            return Err(TemplateError::MissingParam("offering_id"));
        }
        Ok(())
    }

    fn build(&self, task: &Task, _config: &RunConfig) -> Result<Vec<u8>, TemplateError> {
        let id = task.identifier();
        if self.panic_on.contains(&id) {
            panic!("template exploded for {id}");
        }
        if self.fail_on.contains(&id) {
            return Err(TemplateError::InvalidParam {
                name: "bill_cycle_type",
                value: "x".into(),
            });
        }
        Ok(id.to_string().into_bytes())
    }
}

#[derive(Default)]
pub(crate) struct StubClient {
    pub(crate) codes: HashMap<u64, String>,
    pub(crate) fail_on: HashSet<u64>,
    pub(crate) garbage_on: HashSet<u64>,
    pub(crate) latency: Duration,
    pub(crate) in_flight: AtomicUsize,
    pub(crate) max_in_flight: AtomicUsize,
    pub(crate) calls: AtomicUsize,
}

impl StubClient {
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteClient for StubClient {
    async fn send(&self, endpoint: &str, payload: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        assert_eq!(endpoint, ENDPOINT);
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let id: u64 = String::from_utf8(payload)
            .map_err(|e| TransportError::Body(e.to_string()))?
            .parse()
            .map_err(|_| TransportError::Body("bad payload".into()))?;

        if self.fail_on.contains(&id) {
            return Err(TransportError::Request("connection refused".into()));
        }
        if self.garbage_on.contains(&id) {
            return Ok(b"<html>502</html>".to_vec());
        }
        let code = self.codes.get(&id).map(String::as_str).unwrap_or("0000");
        Ok(format!("{code}|result for {id}").into_bytes())
    }
}

pub(crate) struct StubDecoder;

impl ResponseDecoder for StubDecoder {
    fn decode(&self, body: &[u8]) -> Result<DecodedResponse, DecodeError> {
        let text = std::str::from_utf8(body).map_err(|e| DecodeError::Malformed(e.to_string()))?;
        let (code, description) = text
            .split_once('|')
            .ok_or_else(|| DecodeError::Malformed(text.to_string()))?;
        Ok(DecodedResponse::new(code, description))
    }
}

pub(crate) struct BrokenSink;

#[async_trait]
impl OutcomeSink for BrokenSink {
    async fn append(&self, _outcome: &Outcome) -> Result<(), SinkError> {
        Err(SinkError::Io(std::io::Error::other("disk full")))
    }
}

/// Stores outcomes in memory but panics when asked to write `panic_on`.
pub(crate) struct PanickingSink {
    pub(crate) panic_on: u64,
    pub(crate) inner: MemoryOutcomeSink,
}

#[async_trait]
impl OutcomeSink for PanickingSink {
    async fn append(&self, outcome: &Outcome) -> Result<(), SinkError> {
        if outcome.identifier == self.panic_on {
            panic!("sink exploded for {}", outcome.identifier);
        }
        self.inner.append(outcome).await
    }
}

pub(crate) fn collaborators(
    builder: StubBuilder,
    client: Arc<StubClient>,
    sink: Arc<MemoryOutcomeSink>,
) -> Collaborators {
    Collaborators::new(Arc::new(builder), client, Arc::new(StubDecoder), sink)
}

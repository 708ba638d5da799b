//! Bounded concurrent dispatcher.
//!
//! Turns an identifier range into a stream of tasks, fans them out across a
//! fixed-size worker pool, throttles issuance per worker, classifies every
//! remote response and records exactly one [`Outcome`] per attempted
//! identifier.
//!
//! The remote protocol is not known here. Callers inject a
//! [`Collaborators`] bundle: a [`PayloadBuilder`], a [`RemoteClient`], a
//! [`ResponseDecoder`] and an [`OutcomeSink`].
//!
//! # Example
//!
//! ```rust,no_run
//! use provisioner_core::RunConfig;
//! use provisioner_dispatcher::{Collaborators, Dispatcher};
//!
//! async fn provision(collaborators: Collaborators) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig::new(628100000, 628100999, "http://cbs.local/services/BcServices")
//!         .with_workers(20);
//!
//!     let summary = Dispatcher::new(collaborators).run(config).await?;
//!     println!("{} succeeded, {} failed", summary.counts.success, summary.counts.failures());
//!     Ok(())
//! }
//! ```
//!
//! [`Outcome`]: provisioner_core::Outcome

mod classify;
mod collab;
mod dispatcher;
mod limiter;
mod sink;
mod source;
mod worker;

#[cfg(test)]
mod testing;

pub use classify::{classify, Classification, SUCCESS_CODE};
pub use collab::{
    Collaborators, DecodeError, DecodedResponse, OutcomeSink, PayloadBuilder, RemoteClient,
    ResponseDecoder, SinkError, TemplateError, TransportError,
};
pub use dispatcher::{validate_config, Dispatcher};
pub use limiter::RateLimiter;
pub use sink::{FileOutcomeSink, LogFormat, MemoryOutcomeSink};
pub use source::TaskSource;

// Re-export so callers can cancel runs without depending on tokio-util directly.
pub use tokio_util::sync::CancellationToken;

//! CBS CreateSubscriber adapters
//!
//! Implements the dispatcher's collaborator traits for the BSS
//! `CreateSubscriber` SOAP operation: the request envelope, an HTTP transport
//! and a response decoder.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use provisioner_core::{Credentials, RunConfig};
//! use provisioner_dispatcher::{Collaborators, Dispatcher, MemoryOutcomeSink};
//! use provisioner_soap::{params, CreateSubscriberPayload, HttpRemoteClient, SoapResponseDecoder};
//!
//! async fn provision() -> Result<(), Box<dyn std::error::Error>> {
//!     let collaborators = Collaborators::new(
//!         Arc::new(CreateSubscriberPayload::default()),
//!         Arc::new(HttpRemoteClient::new(Duration::from_secs(30))?),
//!         Arc::new(SoapResponseDecoder),
//!         Arc::new(MemoryOutcomeSink::new()),
//!     );
//!
//!     let config = RunConfig::new(628100000, 628100099, "http://10.0.0.1:8080/services/BcServices")
//!         .with_credentials(Credentials::new("102", "secret"))
//!         .with_param(params::OFFERING_ID, "28032865")
//!         .with_param(params::BILL_CYCLE_TYPE, "1");
//!
//!     let summary = Dispatcher::new(collaborators).run(config).await?;
//!     println!("{:?}", summary.counts);
//!     Ok(())
//! }
//! ```

mod client;
mod decoder;
mod error;
mod payload;

pub use client::{HttpRemoteClient, DEFAULT_TIMEOUT};
pub use decoder::SoapResponseDecoder;
pub use error::SoapError;
pub use payload::{params, CreateSubscriberPayload, SubscriberParams};

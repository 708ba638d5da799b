//! Provisioning trigger server library.
//!
//! Accepts provisioning requests over HTTP, runs them through the dispatcher
//! with the CreateSubscriber adapters and serves the resulting outcome logs.

pub mod config;
pub mod http;
pub mod state;

pub use config::{OutcomeFormat, ServerConfig};
pub use http::create_router;
pub use state::AppState;

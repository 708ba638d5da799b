//! HTTP request handlers.

mod create_cis;
mod health;
mod logs;

pub use create_cis::create_cis;
pub use health::health_check;
pub use logs::{download_log, view_log};

//! Server configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use provisioner_dispatcher::LogFormat;

/// Outcome log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutcomeFormat {
    #[default]
    Text,
    Json,
}

impl From<OutcomeFormat> for LogFormat {
    fn from(format: OutcomeFormat) -> Self {
        match format {
            OutcomeFormat::Text => LogFormat::Text,
            OutcomeFormat::Json => LogFormat::Json,
        }
    }
}

/// Provisioning trigger server.
#[derive(Parser, Debug, Clone)]
#[command(name = "provisioner-server", about = "HTTP trigger for bulk subscriber provisioning")]
pub struct ServerConfig {
    /// HTTP bind address
    #[arg(long, env = "PROVISIONER_BIND", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,

    /// Directory where outcome logs are written
    #[arg(long, env = "PROVISIONER_LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// Outcome log format
    #[arg(long, env = "PROVISIONER_LOG_FORMAT", value_enum, default_value_t = OutcomeFormat::Text)]
    pub log_format: OutcomeFormat,

    /// Origin allowed by CORS ("*" for any)
    #[arg(long, env = "PROVISIONER_CORS_ORIGIN", default_value = "http://localhost:3000")]
    pub cors_origin: String,

    /// Timeout for each CreateSubscriber request, in seconds
    #[arg(long, env = "PROVISIONER_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            log_dir: PathBuf::from("logs"),
            log_format: OutcomeFormat::Text,
            cors_origin: "http://localhost:3000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let config = ServerConfig::try_parse_from(["provisioner-server"]).unwrap();
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.log_format, OutcomeFormat::Text);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_flags() {
        let config = ServerConfig::try_parse_from([
            "provisioner-server",
            "--bind-addr",
            "127.0.0.1:9000",
            "--log-dir",
            "/var/log/provisioner",
            "--log-format",
            "json",
            "--cors-origin",
            "*",
        ])
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(LogFormat::from(config.log_format), LogFormat::Json);
        assert_eq!(config.cors_origin, "*");
    }
}

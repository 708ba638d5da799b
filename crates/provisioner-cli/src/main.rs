//! Provisioner CLI - bulk subscriber provisioning from the command line.

mod client;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use provisioner_core::{Credentials, RunConfig, RunSummary, DEFAULT_WORKER_COUNT};
use provisioner_dispatcher::{
    validate_config, CancellationToken, Collaborators, Dispatcher, FileOutcomeSink, LogFormat,
};
use provisioner_soap::{params, CreateSubscriberPayload, HttpRemoteClient, SoapResponseDecoder};

use client::ServerClient;

/// Provisioner CLI - bulk CreateSubscriber runs
#[derive(Parser)]
#[command(name = "provisioner")]
#[command(about = "Bulk subscriber provisioning against a CBS endpoint", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision a range locally
    Run {
        #[command(flatten)]
        range: RangeArgs,

        /// Per-request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,

        /// Outcome log path (default: logs/createCI-<timestamp>.log)
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Outcome log format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Submit a range to a running server
    Submit {
        /// Server address
        #[arg(short, long, env = "PROVISIONER_SERVER", default_value = "http://localhost:8080")]
        server: String,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Fetch an outcome log from a server
    Logs {
        /// Server address
        #[arg(short, long, env = "PROVISIONER_SERVER", default_value = "http://localhost:8080")]
        server: String,

        /// Log file name
        file: String,

        /// Save to this path instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Range and protocol arguments shared by `run` and `submit`.
#[derive(Args, Debug, Clone)]
struct RangeArgs {
    /// First identifier (inclusive)
    #[arg(long)]
    start: u64,

    /// Last identifier (inclusive)
    #[arg(long)]
    end: u64,

    /// CreateSubscriber endpoint URL
    #[arg(long, env = "PROVISIONER_ENDPOINT")]
    endpoint: String,

    /// Login system code
    #[arg(long, env = "PROVISIONER_LOGIN")]
    login: String,

    /// Password
    #[arg(long, env = "PROVISIONER_PASSWORD", hide_env_values = true)]
    password: String,

    /// Primary offering ID
    #[arg(long)]
    offering_id: u64,

    /// Account bill cycle type
    #[arg(long)]
    bill_cycle_type: u64,

    /// Concurrent workers
    #[arg(short, long, default_value_t = DEFAULT_WORKER_COUNT)]
    workers: usize,

    /// Minimum delay between two requests of one worker, in milliseconds
    #[arg(long, default_value = "500")]
    interval_ms: u64,
}

impl RangeArgs {
    fn run_config(&self) -> RunConfig {
        RunConfig::new(self.start, self.end, self.endpoint.clone())
            .with_workers(self.workers)
            .with_issue_interval(Duration::from_millis(self.interval_ms))
            .with_credentials(Credentials::new(self.login.clone(), self.password.clone()))
            .with_param(params::OFFERING_ID, self.offering_id.to_string())
            .with_param(params::BILL_CYCLE_TYPE, self.bill_cycle_type.to_string())
    }

    fn request_body(&self) -> serde_json::Value {
        json!({
            "login": self.login,
            "password": self.password,
            "startRange": self.start,
            "endRange": self.end,
            "endPoint": self.endpoint,
            "offeringId": self.offering_id,
            "BillCycleType": self.bill_cycle_type,
            "numWorkers": self.workers,
            "intervalMs": self.interval_ms,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for LogFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => LogFormat::Text,
            Format::Json => LogFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("provisioner=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            range,
            timeout_secs,
            log_file,
            format,
            json,
        } => {
            run(range, timeout_secs, log_file, format, json).await?;
        }
        Commands::Submit { server, range } => {
            submit(&server, &range).await?;
        }
        Commands::Logs {
            server,
            file,
            output,
        } => {
            logs(&server, &file, output).await?;
        }
    }

    Ok(())
}

async fn run(
    range: RangeArgs,
    timeout_secs: u64,
    log_file: Option<PathBuf>,
    format: Format,
    as_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = range.run_config();
    let payload = Arc::new(CreateSubscriberPayload::default());
    validate_config(&config, payload.as_ref())?;

    let path = log_file.unwrap_or_else(|| {
        PathBuf::from("logs").join(format!(
            "createCI-{}.log",
            Local::now().format("%Y%m%d-%H%M%S")
        ))
    });

    let client = HttpRemoteClient::new(Duration::from_secs(timeout_secs))?;
    let sink = FileOutcomeSink::create(&path, format.into()).await?;
    let collaborators = Collaborators::new(
        payload,
        Arc::new(client),
        Arc::new(SoapResponseDecoder),
        Arc::new(sink),
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling run");
            on_interrupt.cancel();
        }
    });

    info!(log_file = %path.display(), "Writing outcomes");
    let summary = Dispatcher::new(collaborators)
        .run_with_cancel(config, cancel)
        .await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
        println!("  Log:        {}", path.display());
    }

    Ok(())
}

async fn submit(server: &str, range: &RangeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = ServerClient::new(server);
    let response = client.create_cis(&range.request_body()).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn logs(
    server: &str,
    file: &str,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = ServerClient::new(server);
    match output {
        Some(path) => {
            let bytes = client.download_log(file).await?;
            tokio::fs::write(&path, &bytes).await?;
            println!("Saved {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            print!("{}", client.view_log(file).await?);
        }
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("Run {}:", summary.run_id);
    println!("  State:      {}", summary.state);
    println!("  Attempted:  {}/{}", summary.attempted, summary.expected);
    println!("  Duration:   {} ms", summary.duration_ms);
    println!("  {:<18}  {}", "STATUS", "COUNT");
    println!("  {}", "-".repeat(28));
    for status in provisioner_core::OutcomeStatus::ALL {
        println!("  {:<18}  {}", status.as_str(), summary.counts.get(status));
    }
    if summary.sink_failures > 0 {
        println!("  Unwritten:  {}", summary.sink_failures);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args() {
        let cli = Cli::try_parse_from([
            "provisioner",
            "run",
            "--start",
            "628100000",
            "--end",
            "628100009",
            "--endpoint",
            "http://cbs.local/services/BcServices",
            "--login",
            "102",
            "--password",
            "secret",
            "--offering-id",
            "28032865",
            "--bill-cycle-type",
            "1",
            "-w",
            "4",
        ])
        .unwrap();

        let Commands::Run { range, format, json, .. } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(format, Format::Text);
        assert!(!json);

        let config = range.run_config();
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.issue_interval, Duration::from_millis(500));
        assert_eq!(config.param(params::OFFERING_ID), Some("28032865"));
    }

    fn range_args(start: u64, end: u64, workers: usize) -> RangeArgs {
        RangeArgs {
            start,
            end,
            endpoint: "http://127.0.0.1:1/services/BcServices".to_string(),
            login: "102".to_string(),
            password: "secret".to_string(),
            offering_id: 28032865,
            bill_cycle_type: 1,
            workers,
            interval_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_invalid_run_leaves_no_log_file() {
        let dir = tempfile::tempdir().unwrap();

        for (args, expected) in [
            (range_args(9, 1, 4), "Start range cannot be greater than end range"),
            (range_args(1, 9, 0), "Worker count must be between 1 and"),
        ] {
            let path = dir.path().join("run.log");
            let err = run(args, 5, Some(path.clone()), Format::Text, false)
                .await
                .unwrap_err();

            assert!(err.to_string().contains(expected), "{err}");
            assert!(!path.exists());
        }
    }

    #[test]
    fn test_submit_body_uses_wire_names() {
        let cli = Cli::try_parse_from([
            "provisioner",
            "submit",
            "--server",
            "http://10.0.0.5:8080",
            "--start",
            "1",
            "--end",
            "2",
            "--endpoint",
            "http://cbs.local/x",
            "--login",
            "102",
            "--password",
            "secret",
            "--offering-id",
            "7",
            "--bill-cycle-type",
            "1",
        ])
        .unwrap();

        let Commands::Submit { server, range } = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(server, "http://10.0.0.5:8080");

        let body = range.request_body();
        assert_eq!(body["startRange"], 1);
        assert_eq!(body["endPoint"], "http://cbs.local/x");
        assert_eq!(body["BillCycleType"], 1);
        assert_eq!(body["numWorkers"], DEFAULT_WORKER_COUNT);
    }
}

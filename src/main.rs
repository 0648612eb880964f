//! Subseek main entry point
//!
//! This is the command-line interface for the Subseek path discovery tool.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use subseek::config::{load_config, validate, ConfigFile, DelayMode, ScanConfig};
use subseek::dispatch::{run_scan, Shutdown};
use subseek::output::{print_summary, save_results};
use subseek::target::{load_wordlist, PathEnumerator};
use subseek::SubseekError;
use tracing_subscriber::EnvFilter;

/// Subseek: a concurrent path discovery tool
///
/// Subseek appends every entry of a wordlist to a base URL, requests the
/// resulting URLs concurrently and reports the ones whose status code is in
/// the status filter.
#[derive(Parser, Debug)]
#[command(name = "subseek")]
#[command(version = "1.0.0")]
#[command(about = "Path Fuzzer", long_about = None)]
struct Cli {
    /// Target URL (e.g., https://example.com)
    #[arg(short, long)]
    url: String,

    /// Path to wordlist file
    #[arg(short, long)]
    wordlist: PathBuf,

    /// Request timeout in seconds [default: 5]
    #[arg(short, long)]
    timeout: Option<f64>,

    /// Enable verbose output (show every attempted URL)
    #[arg(short, long)]
    verbose: bool,

    /// Number of threads to use [default: 10]
    #[arg(short = 'T', long)]
    threads: Option<usize>,

    /// Delay between requests in seconds [default: 0]
    #[arg(short, long)]
    delay: Option<f64>,

    /// Apply the delay per worker or across all workers [default: per-worker]
    #[arg(long, value_enum)]
    delay_mode: Option<DelayMode>,

    /// Save results to a file
    #[arg(short, long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Status codes to consider as valid [default: 200 301 302 403]
    #[arg(long, num_args = 1..)]
    status: Option<Vec<u16>>,

    /// Optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the User-Agent header
    #[arg(long)]
    user_agent: Option<String>,

    /// Verify TLS certificates (disabled by default)
    #[arg(long)]
    verify_tls: bool,

    /// Follow redirects instead of reporting 3xx responses
    #[arg(long)]
    follow_redirects: bool,

    /// Maximum retries for transient failures [default: 3]
    #[arg(long)]
    retries: Option<u32>,

    /// Exponential backoff factor in seconds [default: 1]
    #[arg(long)]
    backoff: Option<f64>,

    /// Stop dispatching new requests after this many seconds
    #[arg(long, value_name = "SECONDS")]
    max_time: Option<f64>,

    /// Increase logging verbosity (-D, -DD, -DDD)
    #[arg(short = 'D', long, action = clap::ArgAction::Count)]
    debug: u8,

    /// Suppress non-error log output
    #[arg(short, long, conflicts_with = "debug")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.debug, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<SubseekError>() {
            Some(err) if matches!(err, SubseekError::WordlistNotFound { .. }) => {
                println!("{}", err);
                ExitCode::from(1)
            }
            _ => {
                println!("An error occurred: {:#}", e);
                ExitCode::from(2)
            }
        },
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(debug: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| match debug {
            0 => EnvFilter::new("subseek=info,warn"),
            1 => EnvFilter::new("subseek=debug,info"),
            2 => EnvFilter::new("subseek=trace,debug"),
            _ => EnvFilter::new("trace"),
        })
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the configuration from the optional file and the command line
fn build_config(cli: &Cli) -> anyhow::Result<ScanConfig> {
    let file = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ConfigFile::default(),
    };

    let mut config = ScanConfig::new(cli.url.clone(), file);

    if let Some(timeout) = cli.timeout {
        config.scan.timeout = timeout;
    }
    if let Some(threads) = cli.threads {
        config.scan.threads = threads;
    }
    if let Some(delay) = cli.delay {
        config.scan.delay = delay;
    }
    if let Some(delay_mode) = cli.delay_mode {
        config.scan.delay_mode = delay_mode;
    }
    if let Some(status) = &cli.status {
        config.scan.status = status.clone();
    }
    if let Some(user_agent) = &cli.user_agent {
        config.scan.user_agent = user_agent.clone();
    }
    if let Some(max_time) = cli.max_time {
        config.scan.run_timeout = Some(max_time);
    }
    if let Some(retries) = cli.retries {
        config.retry.max_retries = retries;
    }
    if let Some(backoff) = cli.backoff {
        config.retry.backoff_factor = backoff;
    }
    config.scan.verbose |= cli.verbose;
    config.scan.verify_tls |= cli.verify_tls;
    config.scan.follow_redirects |= cli.follow_redirects;

    validate(&config).map_err(SubseekError::from)?;
    Ok(config)
}

/// Handles the scan: load inputs, dispatch, print and save results
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = build_config(&cli)?;

    let lines = load_wordlist(&cli.wordlist)?;
    let enumerator = PathEnumerator::new(&config.base_url, &lines);
    if enumerator.is_empty() {
        tracing::warn!("Wordlist {} contains no paths", cli.wordlist.display());
    }

    tracing::info!(
        "Scanning {} with {} paths, {} threads, {:?} timeout",
        enumerator.base_url(),
        enumerator.len(),
        config.scan.threads,
        config.timeout()
    );

    let shutdown = Shutdown::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, finishing in-flight requests");
                ctrl_c.trigger();
            }
            Err(e) => tracing::error!("Unable to listen for shutdown signal: {}", e),
        }
    });

    let report = run_scan(&config, &enumerator, shutdown).await?;
    print_summary(&report.summary);

    if let Some(path) = &cli.save {
        save_results(path, &report.records)?;
        println!("Results saved to {}", path.display());
    }

    Ok(())
}

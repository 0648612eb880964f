//! Request dispatch
//!
//! This module contains the concurrency core of the scanner:
//! - A fixed-size worker pool draining a shared target iterator
//! - Per-worker or pool-wide pacing between requests
//! - Cooperative cancellation and an optional run deadline

mod dispatcher;
mod pacing;
mod shutdown;

pub use dispatcher::{DispatchOptions, Dispatcher};
pub use pacing::Pacer;
pub use shutdown::Shutdown;

use crate::config::ScanConfig;
use crate::output::{ResultRecord, ScanSummary};
use crate::probe::HttpProber;
use crate::target::PathEnumerator;
use crate::Result;

/// Outcome of a complete scan
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Run statistics
    pub summary: ScanSummary,

    /// Matching results in completion order
    pub records: Vec<ResultRecord>,
}

/// Runs a complete scan
///
/// This is the main entry point. It will:
/// 1. Build the shared HTTP client from the configuration
/// 2. Dispatch every target of `enumerator` across the worker pool
/// 3. Return the statistics and the collected matches
///
/// The configuration is expected to be validated already.
///
/// # Example
///
/// ```no_run
/// use subseek::config::{ConfigFile, ScanConfig};
/// use subseek::dispatch::{run_scan, Shutdown};
/// use subseek::target::PathEnumerator;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ScanConfig::new("https://example.com", ConfigFile::default());
/// let targets = PathEnumerator::new(&config.base_url, ["admin", "login"]);
/// let report = run_scan(&config, &targets, Shutdown::new()).await?;
/// println!("{} paths found", report.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_scan(
    config: &ScanConfig,
    enumerator: &PathEnumerator,
    shutdown: Shutdown,
) -> Result<ScanReport> {
    let prober = HttpProber::from_config(config)?.with_shutdown(shutdown.clone());
    let dispatcher = Dispatcher::new(
        prober,
        config.status_filter(),
        DispatchOptions::from_config(config),
    )
    .with_shutdown(shutdown);

    let summary = dispatcher.run(enumerator).await;
    let records = dispatcher.collector().snapshot();

    Ok(ScanReport { summary, records })
}

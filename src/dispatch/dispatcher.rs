//! Worker pool that drains a target sequence
//!
//! A fixed number of workers share one iterator of targets. Each worker pulls
//! the next unconsumed target, probes it, applies pacing, classifies the
//! outcome and records matches, until the iterator is exhausted or shutdown is
//! requested. The caller is blocked until every worker has finished.

use crate::classify::{classify, StatusFilter};
use crate::config::{DelayMode, ScanConfig};
use crate::dispatch::pacing::Pacer;
use crate::dispatch::Shutdown;
use crate::output::{ResultCollector, ResultRecord, ScanStats, ScanSummary};
use crate::probe::{OutcomeKind, Probe, ProbeOutcome};
use crate::target::Target;
use std::fmt::Display;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Scheduling settings for one run
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Number of workers
    pub concurrency: usize,

    /// Per-request timeout handed to the prober
    pub timeout: Duration,

    /// Pacing delay after each probe
    pub delay: Duration,

    /// Whether the delay applies per worker or across the pool
    pub delay_mode: DelayMode,

    /// Print every URL before it is requested
    pub verbose: bool,

    /// Stop dispatching after this long
    pub run_timeout: Option<Duration>,

    /// Log progress every this many completed targets (0 disables)
    pub progress_interval: u64,
}

impl DispatchOptions {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            concurrency: config.scan.threads,
            timeout: config.timeout(),
            delay: config.delay(),
            delay_mode: config.scan.delay_mode,
            verbose: config.scan.verbose,
            run_timeout: config.run_timeout(),
            progress_interval: config.scan.progress_interval as u64,
        }
    }
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 10,
            timeout: Duration::from_secs(5),
            delay: Duration::ZERO,
            delay_mode: DelayMode::PerWorker,
            verbose: false,
            run_timeout: None,
            progress_interval: 100,
        }
    }
}

/// Fans targets out to a bounded pool of workers
pub struct Dispatcher<P: Probe> {
    prober: Arc<P>,
    filter: Arc<StatusFilter>,
    collector: Arc<ResultCollector>,
    options: DispatchOptions,
    shutdown: Shutdown,
}

impl<P: Probe> Dispatcher<P> {
    pub fn new(prober: P, filter: StatusFilter, options: DispatchOptions) -> Self {
        Self {
            prober: Arc::new(prober),
            filter: Arc::new(filter),
            collector: Arc::new(ResultCollector::new()),
            options,
            shutdown: Shutdown::new(),
        }
    }

    /// Uses an existing shutdown signal instead of a private one
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Handle that stops the run when triggered
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn collector(&self) -> &Arc<ResultCollector> {
        &self.collector
    }

    /// Probes every target and waits for all workers to finish
    ///
    /// Individual failures never end the run early; only the shutdown signal
    /// (or the run timeout) stops dispatching before the targets run out.
    pub async fn run<I>(&self, targets: I) -> ScanSummary
    where
        I: IntoIterator<Item = Target>,
        I::IntoIter: Send + 'static,
    {
        let targets = targets.into_iter();
        let total = targets.size_hint().1;
        let workers = match total {
            Some(total) => self.options.concurrency.min(total).max(1),
            None => self.options.concurrency.max(1),
        };

        tracing::info!(
            "Dispatching {} targets across {} workers",
            total.map_or_else(|| "?".to_string(), |t| t.to_string()),
            workers
        );

        let queue: Arc<Mutex<I::IntoIter>> = Arc::new(Mutex::new(targets));
        let stats = Arc::new(ScanStats::new());
        let pacer = Arc::new(Pacer::new(self.options.delay, self.options.delay_mode));

        let timer = self.options.run_timeout.map(|limit| {
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move {
                if shutdown.sleep(limit).await {
                    tracing::warn!("Run timeout of {:?} reached, stopping dispatch", limit);
                    shutdown.trigger();
                }
            })
        });

        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let worker = Worker {
                id,
                prober: Arc::clone(&self.prober),
                queue: Arc::clone(&queue),
                filter: Arc::clone(&self.filter),
                collector: Arc::clone(&self.collector),
                stats: Arc::clone(&stats),
                pacer: Arc::clone(&pacer),
                shutdown: self.shutdown.clone(),
                options: self.options.clone(),
                total,
            };
            handles.push(tokio::spawn(worker.run()));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Worker task failed: {}", e);
            }
        }

        if let Some(timer) = timer {
            timer.abort();
        }

        let remaining = queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next()
            .is_some();
        let summary = stats.summary(remaining);

        tracing::info!(
            "Scan finished: {} targets probed, {} found in {:?}",
            summary.completed,
            summary.matched,
            summary.elapsed
        );
        summary
    }
}

/// One member of the pool
struct Worker<P: Probe, I> {
    id: usize,
    prober: Arc<P>,
    queue: Arc<Mutex<I>>,
    filter: Arc<StatusFilter>,
    collector: Arc<ResultCollector>,
    stats: Arc<ScanStats>,
    pacer: Arc<Pacer>,
    shutdown: Shutdown,
    options: DispatchOptions,
    total: Option<usize>,
}

impl<P, I> Worker<P, I>
where
    P: Probe,
    I: Iterator<Item = Target> + Send + 'static,
{
    async fn run(self) {
        loop {
            if self.shutdown.is_triggered() {
                tracing::debug!("Worker {} stopping: shutdown requested", self.id);
                break;
            }

            let Some(target) = self.next_target() else {
                break;
            };
            self.stats.record_dispatched();

            if self.options.verbose {
                emit(format_args!("Trying URL: {}", target));
            }

            // The probe runs in its own task so a panic is contained to this target
            let prober = Arc::clone(&self.prober);
            let timeout = self.options.timeout;
            let probed = target.clone();
            let result =
                tokio::spawn(async move { prober.probe(&probed, timeout).await }).await;

            self.pacer.pace(&self.shutdown).await;

            match result {
                Ok(outcome) => self.handle_outcome(outcome),
                Err(e) => {
                    self.stats.record_unexpected_error();
                    tracing::error!("Unexpected error while probing {}: {}", target, e);
                }
            }

            self.report_progress(self.stats.record_completed());
        }
    }

    fn next_target(&self) -> Option<Target> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next()
    }

    fn handle_outcome(&self, outcome: ProbeOutcome) {
        match &outcome.kind {
            OutcomeKind::Success { status_code } => {
                let classification = classify(*status_code, &self.filter);
                self.stats.record_status(classification.category);

                if !classification.is_match {
                    tracing::trace!("{} -> {}", outcome.target, status_code);
                    return;
                }

                if let Some(record) = ResultRecord::from_outcome(&outcome) {
                    emit(&record);
                    self.collector.append(record);
                    self.stats.record_match();
                }
            }
            OutcomeKind::NetworkError { message } => {
                self.stats.record_network_error();
                tracing::warn!(
                    "Error connecting to {} after {} attempt(s): {}",
                    outcome.target,
                    outcome.attempts,
                    message
                );
            }
        }
    }

    fn report_progress(&self, completed: u64) {
        let interval = self.options.progress_interval;
        if interval == 0 || completed % interval != 0 {
            return;
        }

        let total = self
            .total
            .map_or_else(|| "?".to_string(), |t| t.to_string());
        tracing::info!(
            "Progress: {}/{} targets probed, {} found, {:.2} req/sec",
            completed,
            total,
            self.stats.matched(),
            self.stats.rate()
        );
    }
}

/// Writes one line to stdout; a closed pipe is logged, not fatal
fn emit(line: impl Display) {
    write_line(&mut std::io::stdout().lock(), line);
}

fn write_line(out: &mut impl Write, line: impl Display) {
    if let Err(e) = writeln!(out, "{}", line) {
        tracing::debug!("Failed to write to stdout: {}", e);
    }
}

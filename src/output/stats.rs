//! Run statistics
//!
//! Workers update [`ScanStats`] with lock-free counters while the scan runs;
//! the dispatcher freezes them into a [`ScanSummary`] at the end.

use crate::classify::StatusCategory;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const CATEGORIES: [StatusCategory; 4] = [
    StatusCategory::Success,
    StatusCategory::Redirect,
    StatusCategory::ClientError,
    StatusCategory::ServerError,
];

/// Live counters shared by all workers
#[derive(Debug)]
pub struct ScanStats {
    started: Instant,
    dispatched: AtomicU64,
    completed: AtomicU64,
    matched: AtomicU64,
    network_errors: AtomicU64,
    unexpected_errors: AtomicU64,
    by_category: [AtomicU64; 4],
}

impl ScanStats {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            dispatched: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            matched: AtomicU64::new(0),
            network_errors: AtomicU64::new(0),
            unexpected_errors: AtomicU64::new(0),
            by_category: Default::default(),
        }
    }

    pub fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a finished target and returns the new completed total
    pub fn record_completed(&self) -> u64 {
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_status(&self, category: StatusCategory) {
        self.by_category[category_index(category)].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_match(&self) {
        self.matched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_network_error(&self) {
        self.network_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unexpected_error(&self) {
        self.unexpected_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn matched(&self) -> u64 {
        self.matched.load(Ordering::Relaxed)
    }

    /// Completed targets per second since the stats were created
    pub fn rate(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.completed.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Freezes the counters
    pub fn summary(&self, cancelled: bool) -> ScanSummary {
        let by_category = CATEGORIES
            .iter()
            .map(|category| {
                let count = self.by_category[category_index(*category)].load(Ordering::Relaxed);
                (*category, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();

        ScanSummary {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            matched: self.matched.load(Ordering::Relaxed),
            network_errors: self.network_errors.load(Ordering::Relaxed),
            unexpected_errors: self.unexpected_errors.load(Ordering::Relaxed),
            by_category,
            cancelled,
            elapsed: self.started.elapsed(),
        }
    }
}

impl Default for ScanStats {
    fn default() -> Self {
        Self::new()
    }
}

fn category_index(category: StatusCategory) -> usize {
    match category {
        StatusCategory::Success => 0,
        StatusCategory::Redirect => 1,
        StatusCategory::ClientError => 2,
        StatusCategory::ServerError => 3,
    }
}

/// Final statistics of a scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSummary {
    /// Targets handed to a worker
    pub dispatched: u64,

    /// Targets whose processing finished, successfully or not
    pub completed: u64,

    /// Targets that passed the status filter
    pub matched: u64,

    /// Targets that got no response after all retries
    pub network_errors: u64,

    /// Targets whose processing failed unexpectedly
    pub unexpected_errors: u64,

    /// Responses per status category
    pub by_category: BTreeMap<StatusCategory, u64>,

    /// Whether the run stopped before every target was dispatched
    pub cancelled: bool,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// Prints a summary to stdout
pub fn print_summary(summary: &ScanSummary) {
    println!();
    println!("=== Scan Summary ===");
    println!("  Targets probed: {}", summary.completed);
    println!("  Paths found: {}", summary.matched);

    for (category, count) in &summary.by_category {
        println!("  {}: {}", category, count);
    }

    if summary.network_errors > 0 {
        println!("  Network errors: {}", summary.network_errors);
    }
    if summary.unexpected_errors > 0 {
        println!("  Unexpected errors: {}", summary.unexpected_errors);
    }

    let secs = summary.elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        summary.completed as f64 / secs
    } else {
        0.0
    };
    println!("  Elapsed: {:.2}s ({:.2} req/sec)", secs, rate);

    if summary.cancelled {
        println!("  Scan was interrupted before all targets were dispatched");
    }
}

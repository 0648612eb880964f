//! Output module for scan results
//!
//! This module handles:
//! - Collecting matching results from concurrent workers
//! - Tracking and printing run statistics
//! - Writing results to a file

mod collector;
mod save;
pub mod stats;

pub use collector::{ResultCollector, ResultRecord};
pub use save::save_results;
pub use stats::{print_summary, ScanStats, ScanSummary};

//! Thread-safe collection of matching results

use crate::classify::StatusCategory;
use crate::probe::ProbeOutcome;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// A probe outcome that passed the status filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    /// The probed URL
    pub url: String,

    /// HTTP status code of the response
    pub status_code: u16,

    /// Category of the status code
    pub category: StatusCategory,

    /// Time spent on the target
    pub elapsed: Duration,
}

impl ResultRecord {
    /// Builds a record from a successful outcome
    ///
    /// Returns `None` for network errors, which never match.
    pub fn from_outcome(outcome: &ProbeOutcome) -> Option<Self> {
        let status_code = outcome.status_code()?;
        Some(Self {
            url: outcome.target.url().to_string(),
            status_code,
            category: StatusCategory::of(status_code),
            elapsed: outcome.elapsed,
        })
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[+] Found valid path ({}): {}",
            self.status_code, self.url
        )
    }
}

/// Append-only, completion-ordered store of [`ResultRecord`]s
///
/// Appends from concurrent workers are serialized by a mutex, so no record is
/// lost or duplicated.
#[derive(Debug, Default)]
pub struct ResultCollector {
    records: Mutex<Vec<ResultRecord>>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: ResultRecord) {
        self.lock().push(record);
    }

    /// Copy of all records in the order they were appended
    pub fn snapshot(&self) -> Vec<ResultRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Consumes the collector and returns its records
    pub fn into_records(self) -> Vec<ResultRecord> {
        self.records
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // A push cannot leave the vector half-written, so a poisoned lock is still usable
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ResultRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

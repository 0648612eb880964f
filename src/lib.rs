//! Subseek: a concurrent path discovery tool
//!
//! This crate probes a base URL with every entry of a wordlist, classifies the
//! responses by status code and collects the ones that match a status filter.
//! Requests are spread over a fixed pool of workers sharing one pooled HTTP
//! client, with retry/backoff on transient failures and optional pacing.

pub mod classify;
pub mod config;
pub mod dispatch;
pub mod output;
pub mod probe;
pub mod target;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Subseek operations
///
/// Only setup and teardown failures end up here. Failures while probing a
/// single target are reported as [`probe::OutcomeKind::NetworkError`] and never
/// abort a run.
#[derive(Debug, Error)]
pub enum SubseekError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Wordlist file '{}' not found.", .path.display())]
    WordlistNotFound { path: PathBuf },

    #[error("Failed to read wordlist '{}': {source}", .path.display())]
    Wordlist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Failed to save results to '{}': {source}", .path.display())]
    Save {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Subseek operations
pub type Result<T> = std::result::Result<T, SubseekError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use classify::{classify, Classification, StatusCategory, StatusFilter};
pub use config::{DelayMode, RetryPolicy, ScanConfig};
pub use dispatch::{Dispatcher, Shutdown};
pub use output::{ResultCollector, ResultRecord, ScanSummary};
pub use probe::{HttpProber, OutcomeKind, Probe, ProbeOutcome};
pub use target::{enumerate, PathEnumerator, Target};

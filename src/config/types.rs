use crate::classify::StatusFilter;
use serde::Deserialize;
use std::time::Duration;

/// User agent sent with every probe unless overridden
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Status codes counted as a find when no filter is given
pub const DEFAULT_STATUS_FILTER: [u16; 4] = [200, 301, 302, 403];

/// Status codes that trigger a retry when no forcelist is given
pub const DEFAULT_STATUS_FORCELIST: [u16; 5] = [429, 500, 502, 503, 504];

/// How the post-request delay is applied across workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DelayMode {
    /// Every worker sleeps `delay` after each of its own requests
    #[default]
    PerWorker,
    /// Completions across all workers are spaced at least `delay` apart
    Global,
}

/// Complete configuration for one scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Base URL every wordlist entry is appended to
    pub base_url: String,

    /// Request and pool settings
    pub scan: ScanSettings,

    /// Retry behavior for transient failures
    pub retry: RetryPolicy,
}

impl ScanConfig {
    /// Creates a configuration for `base_url` using the given file sections
    pub fn new(base_url: impl Into<String>, file: ConfigFile) -> Self {
        Self {
            base_url: base_url.into(),
            scan: file.scan,
            retry: file.retry,
        }
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        seconds(self.scan.timeout)
    }

    /// Post-request pacing delay
    pub fn delay(&self) -> Duration {
        seconds(self.scan.delay)
    }

    /// Deadline for the whole run, if any
    pub fn run_timeout(&self) -> Option<Duration> {
        self.scan.run_timeout.map(seconds)
    }

    /// The set of status codes reported as finds
    pub fn status_filter(&self) -> StatusFilter {
        StatusFilter::new(self.scan.status.iter().copied())
    }
}

/// Contents of an optional TOML configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub scan: ScanSettings,

    #[serde(default)]
    pub retry: RetryPolicy,
}

/// Request, pool and pacing settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ScanSettings {
    /// Per-request timeout in seconds
    pub timeout: f64,

    /// Number of concurrent workers
    pub threads: usize,

    /// Pacing delay after each request, in seconds
    pub delay: f64,

    /// Whether the delay applies per worker or across the pool
    pub delay_mode: DelayMode,

    /// Status codes reported as finds
    pub status: Vec<u16>,

    /// Print every URL before requesting it
    pub verbose: bool,

    /// User-Agent header value
    pub user_agent: String,

    /// Verify TLS certificates (disabled by default to reach self-signed hosts)
    pub verify_tls: bool,

    /// Follow redirects instead of reporting the 3xx status itself
    pub follow_redirects: bool,

    /// Stop dispatching new targets after this many seconds
    pub run_timeout: Option<f64>,

    /// Log a progress line every this many completed targets (0 disables)
    pub progress_interval: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            timeout: 5.0,
            threads: 10,
            delay: 0.0,
            delay_mode: DelayMode::PerWorker,
            status: DEFAULT_STATUS_FILTER.to_vec(),
            verbose: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            verify_tls: false,
            follow_redirects: false,
            run_timeout: None,
            progress_interval: 100,
        }
    }
}

/// Rules for retrying transient failures
///
/// Shared read-only by all workers for the duration of a run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RetryPolicy {
    /// Retries after the first attempt; a target is requested at most
    /// `max_retries + 1` times
    pub max_retries: u32,

    /// Base of the exponential backoff, in seconds
    pub backoff_factor: f64,

    /// Upper bound for a single backoff sleep, in seconds
    pub backoff_max: f64,

    /// Response codes treated as transient
    pub status_forcelist: Vec<u16>,

    /// Report exhausted status retries as a network error instead of
    /// returning the last response
    pub raise_on_status: bool,

    /// Honor a `Retry-After` header on retryable responses
    pub respect_retry_after: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 1.0,
            backoff_max: 120.0,
            status_forcelist: DEFAULT_STATUS_FORCELIST.to_vec(),
            raise_on_status: true,
            respect_retry_after: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Returns true if a response with this status should be retried
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.status_forcelist.contains(&status)
    }

    /// Sleep before the given retry (1-based)
    ///
    /// `backoff_factor * 2^(retry - 1)`, capped at `backoff_max`. The first
    /// retry already waits the full `backoff_factor` (1, 2, 4 s with the
    /// defaults), unlike schedules that skip the first sleep (0, 2, 4 s).
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let exponent = (retry - 1).min(31) as i32;
        let secs = self.backoff_factor * 2f64.powi(exponent);
        seconds(secs.min(self.backoff_max))
    }

    /// Caps a server-provided `Retry-After` delay at `backoff_max`
    pub fn cap(&self, delay: Duration) -> Duration {
        delay.min(seconds(self.backoff_max))
    }
}

fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

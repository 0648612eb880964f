//! HTTP probing with retry logic
//!
//! This module handles every request the scanner makes:
//! - Building one pooled client shared by all workers
//! - Sending GET requests with a per-request timeout
//! - Retrying transient failures with exponential backoff
//! - Turning the final attempt into a [`ProbeOutcome`]

use crate::config::{RetryPolicy, ScanConfig, ScanSettings};
use crate::dispatch::Shutdown;
use crate::probe::retry::{describe_error, honors_retry_after, is_transient, retry_after};
use crate::target::Target;
use reqwest::{redirect::Policy, Client, Response};
use std::future::Future;
use std::time::{Duration, Instant};

/// Maximum redirect hops when redirects are followed
const MAX_REDIRECTS: usize = 10;

/// What happened when a target was probed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The server answered; any status, including 4xx and 5xx
    Success {
        /// HTTP status code of the final attempt
        status_code: u16,
    },

    /// No usable response after all retries
    NetworkError {
        /// Error description
        message: String,
    },
}

/// Result of probing one target
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    /// The probed target
    pub target: Target,

    /// Response status or transport failure
    pub kind: OutcomeKind,

    /// Wall-clock time spent on the target, backoff included
    pub elapsed: Duration,

    /// Number of requests sent
    pub attempts: u32,
}

impl ProbeOutcome {
    /// Status code of the response, if there was one
    pub fn status_code(&self) -> Option<u16> {
        match self.kind {
            OutcomeKind::Success { status_code } => Some(status_code),
            OutcomeKind::NetworkError { .. } => None,
        }
    }
}

/// Something that can probe a target
///
/// The dispatcher is generic over this so that scheduling can be exercised
/// without a network.
pub trait Probe: Send + Sync + 'static {
    fn probe(&self, target: &Target, timeout: Duration)
        -> impl Future<Output = ProbeOutcome> + Send;
}

/// Builds the shared HTTP client
///
/// The client keeps a connection pool per scheme and host, sized to the
/// worker count so every worker can hold a warm connection.
pub fn build_http_client(settings: &ScanSettings) -> Result<Client, reqwest::Error> {
    let redirect = if settings.follow_redirects {
        Policy::limited(MAX_REDIRECTS)
    } else {
        Policy::none()
    };

    if !settings.verify_tls {
        tracing::warn!(
            "TLS certificate verification is DISABLED; responses from hosts with invalid certificates will be trusted"
        );
    }

    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .redirect(redirect)
        .danger_accept_invalid_certs(!settings.verify_tls)
        .pool_max_idle_per_host(settings.threads)
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Probe`] implementation backed by a pooled reqwest client
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    retry: RetryPolicy,
    shutdown: Option<Shutdown>,
}

impl HttpProber {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self {
            client,
            retry,
            shutdown: None,
        }
    }

    /// Builds a prober with a fresh client for the given configuration
    pub fn from_config(config: &ScanConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.scan)?;
        Ok(Self::new(client, config.retry.clone()))
    }

    /// Lets a shutdown signal cut backoff sleeps short
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Sends requests for `target` until a final outcome is reached
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Status in forcelist | Retry with backoff (or `Retry-After` on 413/429/503) |
    /// | Forcelist status, retries exhausted | `NetworkError` if `raise_on_status`, else `Success` |
    /// | Any other status | Immediate `Success` |
    /// | Connect error / timeout / broken request | Retry with backoff |
    /// | Other transport error | Immediate `NetworkError` |
    pub async fn probe_with_retry(&self, target: &Target, timeout: Duration) -> ProbeOutcome {
        let start = Instant::now();
        let mut retries = 0;

        let kind = loop {
            let attempt = retries + 1;
            let result = self
                .client
                .get(target.url())
                .timeout(timeout)
                .send()
                .await;

            let wait = match result {
                Ok(response) => {
                    let status_code = response.status().as_u16();
                    if !self.retry.is_retryable_status(status_code) {
                        drain(response).await;
                        break OutcomeKind::Success { status_code };
                    }

                    if retries >= self.retry.max_retries {
                        drain(response).await;
                        if self.retry.raise_on_status {
                            break OutcomeKind::NetworkError {
                                message: format!("too many {} error responses", status_code),
                            };
                        }
                        break OutcomeKind::Success { status_code };
                    }

                    let requested = if self.retry.respect_retry_after
                        && honors_retry_after(status_code)
                    {
                        retry_after(response.headers()).map(|delay| self.retry.cap(delay))
                    } else {
                        None
                    };
                    drain(response).await;

                    let wait = requested.unwrap_or_else(|| self.retry.backoff(retries + 1));
                    tracing::debug!(
                        "{} returned {} (attempt {}), retrying in {:?}",
                        target,
                        status_code,
                        attempt,
                        wait
                    );
                    wait
                }
                Err(error) => {
                    let message = describe_error(&error);
                    if !is_transient(&error) || retries >= self.retry.max_retries {
                        break OutcomeKind::NetworkError { message };
                    }

                    let wait = self.retry.backoff(retries + 1);
                    tracing::debug!(
                        "{} failed (attempt {}): {}, retrying in {:?}",
                        target,
                        attempt,
                        message,
                        wait
                    );
                    wait
                }
            };

            // Only requests that were sent count as attempts
            if !self.pause(wait).await {
                break OutcomeKind::NetworkError {
                    message: "retry aborted by shutdown".to_string(),
                };
            }
            retries += 1;
        };

        ProbeOutcome {
            target: target.clone(),
            kind,
            elapsed: start.elapsed(),
            attempts: retries + 1,
        }
    }

    /// Sleeps for `wait`; returns false if shutdown fired first
    async fn pause(&self, wait: Duration) -> bool {
        match &self.shutdown {
            Some(shutdown) => shutdown.sleep(wait).await,
            None => {
                tokio::time::sleep(wait).await;
                true
            }
        }
    }
}

impl Probe for HttpProber {
    fn probe(
        &self,
        target: &Target,
        timeout: Duration,
    ) -> impl Future<Output = ProbeOutcome> + Send {
        self.probe_with_retry(target, timeout)
    }
}

/// Reads the rest of the body so the connection can go back to the pool
async fn drain(response: Response) {
    if let Err(e) = response.bytes().await {
        tracing::trace!("Failed to drain response body: {}", e);
    }
}

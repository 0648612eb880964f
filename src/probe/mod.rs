//! HTTP client adapter
//!
//! Wraps a pooled HTTP client with a per-request timeout and a retry policy,
//! and reports every probe as an explicit [`OutcomeKind`]: either the server
//! answered (with any status) or the transport failed.

mod client;
mod retry;

pub use client::{build_http_client, HttpProber, OutcomeKind, Probe, ProbeOutcome};

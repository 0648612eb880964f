use crate::config::types::{RetryPolicy, ScanConfig, ScanSettings};
use crate::{ConfigError, ConfigResult};
use std::time::Duration;
use url::Url;

/// Largest worker pool accepted
pub const MAX_THREADS: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &ScanConfig) -> ConfigResult<()> {
    validate_base_url(&config.base_url)?;
    validate_scan_settings(&config.scan)?;
    validate_retry_policy(&config.retry)?;
    Ok(())
}

/// Validates the base URL: it must parse and use http or https
fn validate_base_url(base_url: &str) -> ConfigResult<()> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "'{}' must use the http or https scheme",
            base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "'{}' has no host",
            base_url
        )));
    }

    Ok(())
}

fn validate_scan_settings(settings: &ScanSettings) -> ConfigResult<()> {
    if settings.threads < 1 || settings.threads > MAX_THREADS {
        return Err(ConfigError::Validation(format!(
            "threads must be between 1 and {}, got {}",
            MAX_THREADS, settings.threads
        )));
    }

    if !settings.timeout.is_finite() || settings.timeout <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "timeout must be a positive number of seconds, got {}",
            settings.timeout
        )));
    }

    validate_seconds("timeout", settings.timeout)?;
    validate_seconds("delay", settings.delay)?;

    if let Some(run_timeout) = settings.run_timeout {
        if !run_timeout.is_finite() || run_timeout <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "run-timeout must be a positive number of seconds, got {}",
                run_timeout
            )));
        }
        validate_seconds("run-timeout", run_timeout)?;
    }

    validate_status_codes("status", &settings.status)?;

    if settings.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if reqwest::header::HeaderValue::from_str(&settings.user_agent).is_err() {
        return Err(ConfigError::Validation(format!(
            "user-agent '{}' is not a valid header value",
            settings.user_agent
        )));
    }

    Ok(())
}

fn validate_retry_policy(policy: &RetryPolicy) -> ConfigResult<()> {
    validate_seconds("backoff-factor", policy.backoff_factor)?;
    validate_seconds("backoff-max", policy.backoff_max)?;
    validate_status_codes("status-forcelist", &policy.status_forcelist)?;
    Ok(())
}

/// A duration in seconds must be finite, non-negative and fit in a `Duration`
fn validate_seconds(name: &str, value: f64) -> ConfigResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a non-negative number of seconds, got {}",
            name, value
        )));
    }
    if Duration::try_from_secs_f64(value).is_err() {
        return Err(ConfigError::Validation(format!(
            "{} of {} seconds is too large",
            name, value
        )));
    }
    Ok(())
}

fn validate_status_codes(name: &str, codes: &[u16]) -> ConfigResult<()> {
    if let Some(code) = codes.iter().find(|c| !(100..=999).contains(*c)) {
        return Err(ConfigError::Validation(format!(
            "{} contains invalid HTTP status code {}",
            name, code
        )));
    }
    Ok(())
}

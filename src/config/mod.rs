//! Configuration module for Subseek
//!
//! Settings come from built-in defaults, an optional TOML file and command
//! line overrides, in that order.
//!
//! # Example
//!
//! ```no_run
//! use subseek::config::{load_config, validate, ScanConfig};
//! use std::path::Path;
//!
//! let file = load_config(Path::new("subseek.toml")).unwrap();
//! let config = ScanConfig::new("https://example.com", file);
//! validate(&config).unwrap();
//! println!("Scanning with {} workers", config.scan.threads);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ConfigFile, DelayMode, RetryPolicy, ScanConfig, ScanSettings, DEFAULT_STATUS_FILTER,
    DEFAULT_STATUS_FORCELIST, DEFAULT_USER_AGENT,
};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, MAX_THREADS};

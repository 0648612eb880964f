use crate::config::types::ConfigFile;
use crate::ConfigResult;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Every section and key is optional; missing values fall back to their
/// defaults. The result is not validated on its own, since the base URL and
/// command line overrides are only known once it is turned into a
/// [`ScanConfig`](crate::config::ScanConfig).
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use subseek::config::load_config;
///
/// let file = load_config(Path::new("subseek.toml")).unwrap();
/// println!("Threads: {}", file.scan.threads);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<ConfigFile> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses configuration from TOML text
pub fn parse_config(content: &str) -> ConfigResult<ConfigFile> {
    Ok(toml::from_str(content)?)
}

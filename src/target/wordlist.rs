use crate::{Result, SubseekError};
use std::io::ErrorKind;
use std::path::Path;

/// Reads a newline-delimited wordlist
///
/// Invalid UTF-8 is replaced rather than rejected, since wordlists collected
/// from the wild often contain stray bytes. Lines are returned as-is; trimming
/// and blank-line handling belong to [`PathEnumerator`](super::PathEnumerator).
///
/// # Errors
///
/// * `SubseekError::WordlistNotFound` - the file does not exist
/// * `SubseekError::Wordlist` - any other read failure
pub fn load_wordlist(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => SubseekError::WordlistNotFound {
            path: path.to_path_buf(),
        },
        _ => SubseekError::Wordlist {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let content = String::from_utf8_lossy(&bytes);
    let lines: Vec<String> = content.lines().map(str::to_string).collect();

    tracing::debug!("Loaded {} lines from {}", lines.len(), path.display());
    Ok(lines)
}

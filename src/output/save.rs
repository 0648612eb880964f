use crate::output::ResultRecord;
use crate::{Result, SubseekError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one line per record to `path`, replacing any existing file
///
/// # Errors
///
/// * `SubseekError::Save` - the file could not be created or written
pub fn save_results(path: &Path, records: &[ResultRecord]) -> Result<()> {
    let to_error = |source| SubseekError::Save {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(to_error)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        writeln!(writer, "{}", record).map_err(to_error)?;
    }
    writer.flush().map_err(to_error)?;

    tracing::debug!("Wrote {} results to {}", records.len(), path.display());
    Ok(())
}

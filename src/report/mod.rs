/// Reporting layer: charts and spreadsheets over the final table.
///
/// Rendering functions take an injected target (a plotters drawing area or
/// any `io::Write`), so they can be exercised without touching the disk.
/// File output always goes through [`write_atomic`].
pub mod plot;
pub mod sheet;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// Write a file via a `.partial` sibling that is renamed into place only
/// after `write` succeeded and the data was flushed.
///
/// On failure the partial file is removed and nothing appears at `path`.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let partial = partial_path(path);

    let result = (|| {
        let file = File::create(&partial).map_err(|e| PipelineError::io(&partial, e))?;
        let mut out = BufWriter::new(file);
        write(&mut out)?;
        out.flush().map_err(|e| PipelineError::io(&partial, e))?;
        out.get_ref()
            .sync_all()
            .map_err(|e| PipelineError::io(&partial, e))?;
        fs::rename(&partial, path).map_err(|e| PipelineError::io(path, e))
    })();

    if result.is_err() {
        if let Err(e) = fs::remove_file(&partial) {
            log::debug!("Could not remove {}: {e}", partial.display());
        }
    }
    result
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

use std::path::PathBuf;

use thiserror::Error;

use crate::report::plot::PlotKind;
use crate::report::sheet::SheetKind;

// ---------------------------------------------------------------------------
// Pipeline error taxonomy
// ---------------------------------------------------------------------------

/// Every failure the pipeline can report. All of them abort the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input missing, empty, or without the expected header line.
    #[error("{}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    /// A data line is too short or holds a non-numeric intensity.
    #[error("line {line}: {reason}")]
    Parse { line: u64, reason: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rendering {kind} plot: {reason}")]
    Plot { kind: PlotKind, reason: String },

    #[error("writing {kind} sheet: {reason}")]
    Sheet { kind: SheetKind, reason: String },

    /// Invalid threshold value; `origin` is the file or flag it came from.
    #[error("thresholds ({origin}): {reason}")]
    Config { origin: String, reason: String },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

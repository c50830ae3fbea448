use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::report::plot::ImageFormat;
use crate::report::sheet::SheetFormat;

// ---------------------------------------------------------------------------
// Classification thresholds
// ---------------------------------------------------------------------------

/// Cut-offs used by the relevance filter.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Largest coefficient of variation (either group) a protein may have
    /// and still be kept. 0.2 means 20 %.
    pub max_variation: f64,
    /// Minimum liquid/dried (or dried/liquid) ratio of group means for a
    /// protein detected in both groups to count as clinically relevant.
    pub min_fold_change: f64,
    /// A group mean must exceed this to count as detected.
    pub detection_limit: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            max_variation: 0.2,
            min_fold_change: 2.0,
            detection_limit: 0.0,
        }
    }
}

/// Command-line values that take precedence over the thresholds file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThresholdOverrides {
    pub max_variation: Option<f64>,
    pub min_fold_change: Option<f64>,
    pub detection_limit: Option<f64>,
}

impl Thresholds {
    /// Read thresholds from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let thresholds: Thresholds =
            serde_json::from_str(&text).map_err(|e| PipelineError::Config {
                origin: path.display().to_string(),
                reason: e.to_string(),
            })?;
        thresholds.validated(&path.display().to_string())
    }

    /// Resolve defaults, then the optional file, then command-line overrides.
    pub fn resolve(file: Option<&Path>, overrides: ThresholdOverrides) -> Result<Self> {
        let mut thresholds = match file {
            Some(path) => Thresholds::from_json_file(path)?,
            None => Thresholds::default(),
        };
        if let Some(v) = overrides.max_variation {
            thresholds.max_variation = v;
        }
        if let Some(v) = overrides.min_fold_change {
            thresholds.min_fold_change = v;
        }
        if let Some(v) = overrides.detection_limit {
            thresholds.detection_limit = v;
        }
        thresholds.validated("command line")
    }

    fn validated(self, origin: &str) -> Result<Self> {
        let invalid = |reason: String| PipelineError::Config {
            origin: origin.to_string(),
            reason,
        };
        if !self.max_variation.is_finite() || self.max_variation < 0.0 {
            return Err(invalid(format!(
                "max_variation must be a non-negative number, got {}",
                self.max_variation
            )));
        }
        if !self.min_fold_change.is_finite() || self.min_fold_change < 1.0 {
            return Err(invalid(format!(
                "min_fold_change must be at least 1, got {}",
                self.min_fold_change
            )));
        }
        if !self.detection_limit.is_finite() {
            return Err(invalid(format!(
                "detection_limit must be finite, got {}",
                self.detection_limit
            )));
        }
        Ok(self)
    }

    /// `min_fold_change` expressed on the log2 abundance scale.
    pub fn min_log2_fold_change(&self) -> f64 {
        self.min_fold_change.log2()
    }
}

// ---------------------------------------------------------------------------
// Report settings
// ---------------------------------------------------------------------------

/// Where and how the charts and spreadsheets are written.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    /// Prepended to every artifact file name.
    pub prefix: String,
    pub format: ImageFormat,
    pub sheet_format: SheetFormat,
    pub width: u32,
    pub height: u32,
    pub export_excluded: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            output_dir: PathBuf::from("."),
            prefix: String::new(),
            format: ImageFormat::Svg,
            sheet_format: SheetFormat::Xlsx,
            width: 1200,
            height: 800,
            export_excluded: false,
        }
    }
}

impl ReportConfig {
    /// Full path of an artifact given its stem and extension.
    pub fn artifact_path(&self, stem: &str, extension: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}{stem}.{extension}", self.prefix))
    }
}

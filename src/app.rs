use std::path::{Path, PathBuf};

use crate::config::{ReportConfig, Thresholds};
use crate::data::filter::{classify_clinical_relevance, exclude_high_variation, finalize};
use crate::data::loader::load_protein_groups;
use crate::data::model::ProteinTable;
use crate::data::stats::calculate_statistics;
use crate::error::{PipelineError, Result};
use crate::report::plot::{write_plot, PlotKind};
use crate::report::sheet::{write_sheet_file, SheetKind};

// ---------------------------------------------------------------------------
// Pipeline driver
// ---------------------------------------------------------------------------

/// Owns one run: thresholds and report settings in, artifacts out.
pub struct ProteoCompareApp {
    pub thresholds: Thresholds,
    pub report: ReportConfig,
}

/// What a completed run produced.
#[derive(Debug)]
pub struct RunSummary {
    /// Final table, sorted by protein name.
    pub table: ProteinTable,
    /// Proteins removed by the variation filter, in input order.
    pub excluded: ProteinTable,
    pub artifacts: Vec<PathBuf>,
}

impl ProteoCompareApp {
    pub fn new(thresholds: Thresholds, report: ReportConfig) -> Self {
        Self { thresholds, report }
    }

    /// Load, analyze and classify without writing anything.
    ///
    /// Excluded rows are classified too, so their export shows the same
    /// relevance rule; they stay in input order.
    pub fn analyze(&self, input: &Path) -> Result<(ProteinTable, ProteinTable)> {
        log::info!("Creating protein table from {}", input.display());
        let records = load_protein_groups(input)?;

        let table = calculate_statistics(records);
        let split = exclude_high_variation(table, &self.thresholds);

        let mut table = split.kept;
        let mut excluded = split.excluded;
        classify_clinical_relevance(&mut table, &self.thresholds);
        classify_clinical_relevance(&mut excluded, &self.thresholds);
        finalize(&mut table);

        if table.is_empty() {
            log::warn!(
                "No proteins left to report from {} ({} excluded for high variation)",
                input.display(),
                excluded.len()
            );
        }
        Ok((table, excluded))
    }

    /// Full run: analyze, then write the three charts and the spreadsheets.
    /// The first failure aborts the run.
    pub fn run(&self, input: &Path) -> Result<RunSummary> {
        let (table, excluded) = self.analyze(input)?;

        std::fs::create_dir_all(&self.report.output_dir)
            .map_err(|e| PipelineError::io(&self.report.output_dir, e))?;

        log::info!("Writing plots");
        let mut artifacts = Vec::new();
        for kind in PlotKind::ALL {
            artifacts.push(write_plot(kind, &table, &self.report)?);
        }

        log::info!("Writing spreadsheets");
        artifacts.push(write_sheet_file(SheetKind::ClinicallyRelevant, &table, &self.report)?);
        artifacts.push(write_sheet_file(SheetKind::AllProteins, &table, &self.report)?);
        if self.report.export_excluded {
            artifacts.push(write_sheet_file(SheetKind::Excluded, &excluded, &self.report)?);
        }

        Ok(RunSummary {
            table,
            excluded,
            artifacts,
        })
    }
}

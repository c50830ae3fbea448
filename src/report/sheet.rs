use std::fmt;
use std::io::{Seek, Write};
use std::path::PathBuf;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde::Serialize;

use crate::config::ReportConfig;
use crate::data::model::{AnalyzedProtein, ProteinTable};
use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Spreadsheet kinds
// ---------------------------------------------------------------------------

/// The spreadsheet exports. Each is a workbook with a single named sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    /// Every row of the final table.
    AllProteins,
    /// Rows of the final table flagged as clinically relevant.
    ClinicallyRelevant,
    /// Rows dropped by the variation filter.
    Excluded,
}

impl SheetKind {
    pub fn file_stem(self) -> &'static str {
        match self {
            SheetKind::AllProteins => "all_proteins",
            SheetKind::ClinicallyRelevant => "clinically_relevant",
            SheetKind::Excluded => "excluded_high_variation",
        }
    }

    /// Worksheet name inside the workbook.
    pub fn sheet_name(self) -> &'static str {
        match self {
            SheetKind::AllProteins => "All Proteins",
            SheetKind::ClinicallyRelevant => "Clinically Relevant",
            SheetKind::Excluded => "Excluded (High Variation)",
        }
    }

    /// Rows of `table` that belong on this sheet, with their table index.
    pub fn rows(self, table: &ProteinTable) -> Vec<(usize, &AnalyzedProtein)> {
        table
            .iter()
            .enumerate()
            .filter(|(_, p)| match self {
                SheetKind::ClinicallyRelevant => p.clinically_relevant,
                SheetKind::AllProteins | SheetKind::Excluded => true,
            })
            .collect()
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// File format of the spreadsheet exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SheetFormat {
    Xlsx,
    Csv,
}

impl SheetFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SheetFormat::Xlsx => "xlsx",
            SheetFormat::Csv => "csv",
        }
    }
}

// ---------------------------------------------------------------------------
// Row layout
// ---------------------------------------------------------------------------

pub const HEADER: [&str; 20] = [
    "index",
    "protein_id",
    "gene_name",
    "protein_name",
    "dried_1",
    "dried_2",
    "dried_3",
    "liquid_1",
    "liquid_2",
    "liquid_3",
    "dried_mean",
    "dried_std_dev",
    "dried_cv",
    "liquid_mean",
    "liquid_std_dev",
    "liquid_cv",
    "average_intensity",
    "abundance",
    "clinically_relevant",
    "source_line",
];

#[derive(Debug, Serialize)]
struct SheetRow<'a> {
    index: usize,
    protein_id: &'a str,
    gene_name: &'a str,
    protein_name: &'a str,
    dried_1: i64,
    dried_2: i64,
    dried_3: i64,
    liquid_1: i64,
    liquid_2: i64,
    liquid_3: i64,
    dried_mean: String,
    dried_std_dev: String,
    dried_cv: String,
    liquid_mean: String,
    liquid_std_dev: String,
    liquid_cv: String,
    average_intensity: String,
    /// Empty when the fold change is undefined.
    abundance: Option<String>,
    clinically_relevant: bool,
    source_line: u64,
}

fn decimal(value: f64) -> String {
    format!("{value:.4}")
}

impl<'a> SheetRow<'a> {
    fn new(index: usize, protein: &'a AnalyzedProtein) -> Self {
        let record = &protein.record;
        let stats = &protein.stats;
        SheetRow {
            index,
            protein_id: &record.protein_id,
            gene_name: &record.gene_name,
            protein_name: &record.protein_name,
            dried_1: record.dried[0],
            dried_2: record.dried[1],
            dried_3: record.dried[2],
            liquid_1: record.liquid[0],
            liquid_2: record.liquid[1],
            liquid_3: record.liquid[2],
            dried_mean: decimal(stats.dried.mean),
            dried_std_dev: decimal(stats.dried.std_dev),
            dried_cv: decimal(stats.dried.cv),
            liquid_mean: decimal(stats.liquid.mean),
            liquid_std_dev: decimal(stats.liquid.std_dev),
            liquid_cv: decimal(stats.liquid.cv),
            average_intensity: decimal(stats.average_intensity),
            abundance: stats.abundance.map(decimal),
            clinically_relevant: protein.clinically_relevant,
            source_line: record.line,
        }
    }
}

// ---------------------------------------------------------------------------
// Excel output
// ---------------------------------------------------------------------------

const INDEX_COL: u16 = 0;
const IDENTITY_COL: u16 = 1;
const INTENSITY_COL: u16 = 4;
const DERIVED_COL: u16 = 10;
const ABUNDANCE_COL: u16 = 17;
const RELEVANT_COL: u16 = 18;
const LINE_COL: u16 = 19;

/// Fill `worksheet` with the header and the kind's rows. Returns the row count.
///
/// Numbers are written as numbers; derived values carry a four-decimal
/// display format and an undefined abundance is left blank.
pub fn fill_worksheet(
    worksheet: &mut Worksheet,
    kind: SheetKind,
    table: &ProteinTable,
) -> std::result::Result<usize, XlsxError> {
    let bold = Format::new().set_bold();
    let decimal = Format::new().set_num_format("0.0000");

    worksheet.set_name(kind.sheet_name())?;
    for (col, title) in (0u16..).zip(HEADER) {
        worksheet.write_string_with_format(0, col, title, &bold)?;
    }

    let rows = kind.rows(table);
    for (row, (index, protein)) in (1u32..).zip(&rows) {
        let record = &protein.record;
        let stats = &protein.stats;

        worksheet.write_number(row, INDEX_COL, *index as f64)?;
        let identity = [&record.protein_id, &record.gene_name, &record.protein_name];
        for (col, text) in (IDENTITY_COL..).zip(identity) {
            worksheet.write_string(row, col, text.as_str())?;
        }
        for (col, value) in (INTENSITY_COL..).zip(record.dried.iter().chain(&record.liquid)) {
            worksheet.write_number(row, col, *value as f64)?;
        }
        let derived = [
            stats.dried.mean,
            stats.dried.std_dev,
            stats.dried.cv,
            stats.liquid.mean,
            stats.liquid.std_dev,
            stats.liquid.cv,
            stats.average_intensity,
        ];
        for (col, value) in (DERIVED_COL..).zip(derived) {
            worksheet.write_number_with_format(row, col, value, &decimal)?;
        }
        if let Some(abundance) = stats.abundance {
            worksheet.write_number_with_format(row, ABUNDANCE_COL, abundance, &decimal)?;
        }
        worksheet.write_boolean(row, RELEVANT_COL, protein.clinically_relevant)?;
        worksheet.write_number(row, LINE_COL, record.line as f64)?;
    }
    Ok(rows.len())
}

/// Write one sheet as an `.xlsx` workbook to any seekable writer.
pub fn write_workbook<W>(out: W, kind: SheetKind, table: &ProteinTable) -> Result<usize>
where
    W: Write + Seek + Send,
{
    let mut workbook = Workbook::new();
    let written = fill_worksheet(workbook.add_worksheet(), kind, table)
        .map_err(|e| sheet_error(kind, e))?;
    workbook
        .save_to_writer(out)
        .map_err(|e| sheet_error(kind, e))?;
    Ok(written)
}

fn sheet_error(kind: SheetKind, err: XlsxError) -> PipelineError {
    PipelineError::Sheet {
        kind,
        reason: err.to_string(),
    }
}

// ---------------------------------------------------------------------------
// CSV output
// ---------------------------------------------------------------------------

/// Write one sheet (header plus the kind's rows) as CSV to any writer.
///
/// An empty selection still produces the header row.
pub fn write_csv<W: Write>(out: W, kind: SheetKind, table: &ProteinTable) -> csv::Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    writer.write_record(HEADER)?;

    let rows = kind.rows(table);
    for (index, protein) in &rows {
        writer.serialize(SheetRow::new(*index, protein))?;
    }
    writer.flush()?;
    Ok(rows.len())
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Write a sheet to `<output_dir>/<prefix><stem>.<xlsx|csv>`. Returns the path.
pub fn write_sheet_file(
    kind: SheetKind,
    table: &ProteinTable,
    config: &ReportConfig,
) -> Result<PathBuf> {
    let path = config.artifact_path(kind.file_stem(), config.sheet_format.extension());
    let mut written = 0;
    super::write_atomic(&path, |out| {
        written = match config.sheet_format {
            SheetFormat::Xlsx => write_workbook(out, kind, table)?,
            SheetFormat::Csv => write_csv(out, kind, table).map_err(|e| match e.into_kind() {
                csv::ErrorKind::Io(io) => PipelineError::io(&path, io),
                other => PipelineError::Sheet {
                    kind,
                    reason: format!("{other:?}"),
                },
            })?,
        };
        Ok(())
    })?;
    log::info!("Wrote {written} rows to {} ({kind})", path.display());
    Ok(path)
}

use std::fs::File;
use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use super::model::{ProteinRecord, REPLICATES};
use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Column layout of the upstream export
// ---------------------------------------------------------------------------

/// Zero-based column positions of the fields read from each data line.
///
/// These offsets are a contract with the MaxQuant `proteinGroups.txt`
/// export used by the lab; a different export only needs a new layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub protein_id: usize,
    pub protein_name: usize,
    pub gene_name: usize,
    pub dried: [usize; REPLICATES],
    pub liquid: [usize; REPLICATES],
}

impl ColumnLayout {
    pub const MAXQUANT: ColumnLayout = ColumnLayout {
        protein_id: 1,
        protein_name: 5,
        gene_name: 6,
        dried: [51, 52, 53],
        liquid: [54, 55, 56],
    };

    /// Minimum number of columns a data line must have.
    pub fn required_columns(&self) -> usize {
        let identity = [self.protein_id, self.protein_name, self.gene_name];
        identity
            .iter()
            .chain(&self.dried)
            .chain(&self.liquid)
            .max()
            .map_or(0, |&max| max + 1)
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        ColumnLayout::MAXQUANT
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load every data line of a proteinGroups file using the MaxQuant layout.
pub fn load_protein_groups(path: &Path) -> Result<Vec<ProteinRecord>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PipelineError::Format {
            path: path.to_path_buf(),
            reason: "input file not found".into(),
        },
        _ => PipelineError::io(path, e),
    })?;
    read_protein_groups(file, path, &ColumnLayout::MAXQUANT)
}

/// Parse tab-separated protein rows from any reader.
///
/// The first line is always discarded as the header. A source without even
/// a header line is a format error; a header-only source is an empty table.
/// Every later line is a data line, blank ones included, and line numbers
/// are counted on the raw text. `path` is only used for error messages.
pub fn read_protein_groups<R: Read>(
    reader: R,
    path: &Path,
    layout: &ColumnLayout,
) -> Result<Vec<ProteinRecord>> {
    let mut lines = BufReader::new(reader).lines();

    match lines.next() {
        Some(header) => {
            header.map_err(|e| read_error(e, path, 1))?;
        }
        None => {
            return Err(PipelineError::Format {
                path: path.to_path_buf(),
                reason: "file is empty, expected a header line".into(),
            })
        }
    }

    let mut records = Vec::new();
    for (idx, text) in lines.enumerate() {
        let line = idx as u64 + 2;
        let text = text.map_err(|e| read_error(e, path, line))?;
        let row = split_line(&text, path, line)?;
        records.push(parse_record(&row, line, layout)?);
    }

    log::info!(
        "Loaded {} protein groups from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

// ---------------------------------------------------------------------------
// Row parsing
// ---------------------------------------------------------------------------

/// Split one physical line into fields. A blank line has no fields.
fn split_line(text: &str, path: &Path, line: u64) -> Result<StringRecord> {
    let mut row = StringRecord::new();
    ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes())
        .read_record(&mut row)
        .map_err(|e| csv_error(e, path, line))?;
    Ok(row)
}

fn parse_record(row: &StringRecord, line: u64, layout: &ColumnLayout) -> Result<ProteinRecord> {
    let required = layout.required_columns();
    if row.len() < required {
        return Err(PipelineError::Parse {
            line,
            reason: format!("expected at least {required} columns, found {}", row.len()),
        });
    }

    let text = |idx: usize| row.get(idx).unwrap_or_default().to_string();
    let intensities = |columns: &[usize; REPLICATES], prefix: &str| -> Result<[i64; REPLICATES]> {
        let mut values = [0; REPLICATES];
        for (replicate, (&col, slot)) in columns.iter().zip(values.iter_mut()).enumerate() {
            let raw = row.get(col).unwrap_or_default();
            *slot = parse_intensity(raw).ok_or_else(|| PipelineError::Parse {
                line,
                reason: format!(
                    "{prefix}_{} (column {col}): '{raw}' is not a number",
                    replicate + 1
                ),
            })?;
        }
        Ok(values)
    };

    Ok(ProteinRecord {
        protein_id: text(layout.protein_id),
        gene_name: text(layout.gene_name),
        protein_name: text(layout.protein_name),
        dried: intensities(&layout.dried, "dried")?,
        liquid: intensities(&layout.liquid, "liquid")?,
        line,
    })
}

/// Parse a float and truncate it toward zero.
///
/// Values that are not finite or do not fit in an `i64` are rejected
/// rather than saturated.
pub fn parse_intensity(raw: &str) -> Option<i64> {
    let value = raw.trim().parse::<f64>().ok()?;
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    // 2^63 is exactly representable; anything at or beyond it overflows.
    if truncated >= i64::MAX as f64 || truncated < i64::MIN as f64 {
        return None;
    }
    Some(truncated as i64)
}

fn read_error(err: io::Error, path: &Path, line: u64) -> PipelineError {
    match err.kind() {
        ErrorKind::InvalidData => PipelineError::Parse {
            line,
            reason: "invalid UTF-8".into(),
        },
        _ => PipelineError::io(path, err),
    }
}

fn csv_error(err: csv::Error, path: &Path, line: u64) -> PipelineError {
    match err.into_kind() {
        csv::ErrorKind::Io(e) => PipelineError::io(path, e),
        other => PipelineError::Parse {
            line,
            reason: format!("{other:?}"),
        },
    }
}

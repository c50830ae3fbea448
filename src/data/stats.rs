use super::model::{AnalyzedProtein, GroupStats, ProteinRecord, ProteinStats, ProteinTable, REPLICATES};

// ---------------------------------------------------------------------------
// Per-group statistics
// ---------------------------------------------------------------------------

impl GroupStats {
    /// Mean, sample standard deviation and coefficient of variation of one
    /// replicate group.
    pub fn from_replicates(values: &[i64; REPLICATES]) -> Self {
        let n = REPLICATES as f64;
        let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
        let variance = values
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        let std_dev = variance.sqrt();
        // Zero mean: no meaningful relative spread, report none.
        let cv = if mean == 0.0 { 0.0 } else { std_dev / mean.abs() };

        GroupStats { mean, std_dev, cv }
    }
}

// ---------------------------------------------------------------------------
// Per-protein statistics
// ---------------------------------------------------------------------------

impl ProteinStats {
    /// Derive all statistics from a record's six raw intensities.
    pub fn from_record(record: &ProteinRecord) -> Self {
        let dried = GroupStats::from_replicates(&record.dried);
        let liquid = GroupStats::from_replicates(&record.liquid);

        ProteinStats {
            dried,
            liquid,
            average_intensity: (dried.mean + liquid.mean) / 2.0,
            abundance: log2_fold_change(dried.mean, liquid.mean),
        }
    }
}

/// log2(liquid / dried), defined only when both means are positive.
pub fn log2_fold_change(dried_mean: f64, liquid_mean: f64) -> Option<f64> {
    (dried_mean > 0.0 && liquid_mean > 0.0).then(|| (liquid_mean / dried_mean).log2())
}

// ---------------------------------------------------------------------------
// Table-level entry-points
// ---------------------------------------------------------------------------

/// Attach statistics to every loaded record, keeping input order.
/// Nothing is classified yet, so every row starts out not relevant.
pub fn calculate_statistics(records: Vec<ProteinRecord>) -> ProteinTable {
    let proteins: Vec<AnalyzedProtein> = records
        .into_iter()
        .map(|record| AnalyzedProtein {
            stats: ProteinStats::from_record(&record),
            record,
            clinically_relevant: false,
        })
        .collect();

    log::info!("Calculated statistics for {} proteins", proteins.len());
    ProteinTable::new(proteins)
}

use super::model::{AnalyzedProtein, ProteinStats, ProteinTable};
use crate::config::Thresholds;

// ---------------------------------------------------------------------------
// Step 1: variation exclusion
// ---------------------------------------------------------------------------

/// Result of the variation filter: rows kept for comparison and rows whose
/// replicates are too noisy to trust.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariationSplit {
    pub kept: ProteinTable,
    pub excluded: ProteinTable,
}

/// Whether either replicate group varies more than `max_variation` allows.
///
/// A NaN CV compares false and therefore counts as not variable.
pub fn is_high_variation(stats: &ProteinStats, thresholds: &Thresholds) -> bool {
    stats.dried.cv > thresholds.max_variation || stats.liquid.cv > thresholds.max_variation
}

/// Split the table into kept and excluded rows, preserving order in both.
pub fn exclude_high_variation(table: ProteinTable, thresholds: &Thresholds) -> VariationSplit {
    let (excluded, kept): (Vec<AnalyzedProtein>, Vec<AnalyzedProtein>) = table
        .proteins
        .into_iter()
        .partition(|p| is_high_variation(&p.stats, thresholds));

    for p in &excluded {
        log::debug!(
            "Excluding {} (line {}): dried CV {:.3}, liquid CV {:.3}",
            p.record.protein_id,
            p.record.line,
            p.stats.dried.cv,
            p.stats.liquid.cv
        );
    }
    log::info!(
        "Variation filter (CV > {}): kept {}, excluded {}",
        thresholds.max_variation,
        kept.len(),
        excluded.len()
    );

    VariationSplit {
        kept: ProteinTable::new(kept),
        excluded: ProteinTable::new(excluded),
    }
}

// ---------------------------------------------------------------------------
// Step 2: clinical relevance
// ---------------------------------------------------------------------------

/// Per-row relevance rule.
///
/// * detected in neither group → not relevant
/// * detected in exactly one group → relevant (present/absent switch)
/// * detected in both → relevant when |log2 FC| ≥ log2(`min_fold_change`)
pub fn is_clinically_relevant(stats: &ProteinStats, thresholds: &Thresholds) -> bool {
    let dried_detected = stats.dried.mean > thresholds.detection_limit;
    let liquid_detected = stats.liquid.mean > thresholds.detection_limit;

    match (dried_detected, liquid_detected) {
        (false, false) => false,
        (true, false) | (false, true) => true,
        (true, true) => stats
            .abundance
            .is_some_and(|fc| fc.abs() >= thresholds.min_log2_fold_change()),
    }
}

/// Flag every row in place. Does not reorder or drop anything.
pub fn classify_clinical_relevance(table: &mut ProteinTable, thresholds: &Thresholds) {
    for p in &mut table.proteins {
        p.clinically_relevant = is_clinically_relevant(&p.stats, thresholds);
    }
    log::info!(
        "{} of {} proteins are clinically relevant",
        table.clinically_relevant().count(),
        table.len()
    );
}

// ---------------------------------------------------------------------------
// Step 3: finalize
// ---------------------------------------------------------------------------

/// Sort by protein name (byte-wise, case-sensitive). The sort is stable, so
/// rows sharing a name keep their input order.
pub fn finalize(table: &mut ProteinTable) {
    table
        .proteins
        .sort_by(|a, b| a.record.protein_name.cmp(&b.record.protein_name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ProteinRecord;
    use crate::data::stats::calculate_statistics;

    fn record(id: &str, name: &str, dried: [i64; 3], liquid: [i64; 3]) -> ProteinRecord {
        ProteinRecord {
            protein_id: id.to_string(),
            gene_name: String::new(),
            protein_name: name.to_string(),
            dried,
            liquid,
            line: 0,
        }
    }

    fn table(records: Vec<ProteinRecord>) -> ProteinTable {
        calculate_statistics(records)
    }

    #[test]
    fn noisy_rows_are_excluded_and_count_never_grows() {
        let input = table(vec![
            record("A", "A", [10, 10, 10], [100, 100, 100]),
            record("B", "B", [5, 5, 25], [5, 5, 5]),
            record("C", "C", [5, 5, 5], [5, 5, 25]),
        ]);
        let n = input.len();
        let split = exclude_high_variation(input, &Thresholds::default());

        assert!(split.kept.len() <= n);
        assert_eq!(split.kept.len() + split.excluded.len(), n);
        let kept: Vec<_> = split.kept.iter().map(|p| p.record.protein_id.as_str()).collect();
        let excluded: Vec<_> = split.excluded.iter().map(|p| p.record.protein_id.as_str()).collect();
        assert_eq!(kept, ["A"]);
        assert_eq!(excluded, ["B", "C"]);
    }

    #[test]
    fn cv_at_threshold_is_kept() {
        let mut stats = table(vec![record("A", "A", [1, 1, 1], [1, 1, 1])]).proteins[0].stats;
        stats.dried.cv = 0.2;
        assert!(!is_high_variation(&stats, &Thresholds::default()));
        stats.dried.cv = 0.2001;
        assert!(is_high_variation(&stats, &Thresholds::default()));
    }

    #[test]
    fn nan_cv_is_not_variable() {
        let mut stats = table(vec![record("A", "A", [1, 1, 1], [1, 1, 1])]).proteins[0].stats;
        stats.liquid.cv = f64::NAN;
        assert!(!is_high_variation(&stats, &Thresholds::default()));
    }

    #[test]
    fn relevance_rule() {
        let t = Thresholds::default();
        let rows = table(vec![
            record("tenfold", "", [10, 10, 10], [100, 100, 100]),
            record("twofold", "", [10, 10, 10], [20, 20, 20]),
            record("flat", "", [10, 10, 10], [15, 15, 15]),
            record("down", "", [100, 100, 100], [10, 10, 10]),
            record("liquid_only", "", [0, 0, 0], [7, 7, 7]),
            record("absent", "", [0, 0, 0], [0, 0, 0]),
        ]);
        let flags: Vec<bool> = rows.iter().map(|p| is_clinically_relevant(&p.stats, &t)).collect();
        assert_eq!(flags, [true, true, false, true, true, false]);
    }

    #[test]
    fn detection_limit_applies_to_group_means() {
        let t = Thresholds {
            detection_limit: 50.0,
            ..Default::default()
        };
        let rows = table(vec![
            // both below the limit
            record("low", "", [10, 10, 10], [40, 40, 40]),
            // only liquid detected
            record("switch", "", [10, 10, 10], [60, 60, 60]),
        ]);
        assert!(!is_clinically_relevant(&rows.proteins[0].stats, &t));
        assert!(is_clinically_relevant(&rows.proteins[1].stats, &t));
    }

    #[test]
    fn classification_flags_in_place() {
        let mut rows = table(vec![
            record("A", "A", [10, 10, 10], [100, 100, 100]),
            record("B", "B", [10, 10, 10], [10, 10, 10]),
        ]);
        classify_clinical_relevance(&mut rows, &Thresholds::default());
        assert!(rows.proteins[0].clinically_relevant);
        assert!(!rows.proteins[1].clinically_relevant);
        assert_eq!(rows.clinically_relevant().count(), 1);
    }

    #[test]
    fn finalize_sorts_by_name_and_keeps_ties_in_input_order() {
        let mut rows = table(vec![
            record("1", "beta", [1, 1, 1], [1, 1, 1]),
            record("2", "Alpha", [1, 1, 1], [1, 1, 1]),
            record("3", "beta", [2, 2, 2], [2, 2, 2]),
            record("4", "alpha", [1, 1, 1], [1, 1, 1]),
            record("5", "beta", [3, 3, 3], [3, 3, 3]),
        ]);
        finalize(&mut rows);
        let ids: Vec<_> = rows.iter().map(|p| p.record.protein_id.as_str()).collect();
        // Uppercase sorts before lowercase.
        assert_eq!(ids, ["2", "4", "1", "3", "5"]);
    }

    #[test]
    fn end_to_end_two_rows() {
        let t = Thresholds::default();
        let rows = table(vec![
            record("A", "Protein A", [10, 10, 10], [100, 100, 100]),
            record("B", "Protein B", [5, 5, 25], [5, 5, 5]),
        ]);
        let mut kept = exclude_high_variation(rows, &t).kept;
        classify_clinical_relevance(&mut kept, &t);
        finalize(&mut kept);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept.proteins[0].record.protein_id, "A");
        assert!(kept.proteins[0].clinically_relevant);
    }
}

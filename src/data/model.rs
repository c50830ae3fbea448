// ---------------------------------------------------------------------------
// Replicate groups
// ---------------------------------------------------------------------------

/// Number of replicates measured per condition.
pub const REPLICATES: usize = 3;

// ---------------------------------------------------------------------------
// ProteinRecord – one row of the proteinGroups table
// ---------------------------------------------------------------------------

/// Identity fields plus the six raw intensities of one protein group.
#[derive(Debug, Clone, PartialEq)]
pub struct ProteinRecord {
    pub protein_id: String,
    pub gene_name: String,
    pub protein_name: String,
    /// Intensities truncated toward zero from the exported float values.
    pub dried: [i64; REPLICATES],
    pub liquid: [i64; REPLICATES],
    /// 1-based line in the source file (the header is line 1).
    pub line: u64,
}

// ---------------------------------------------------------------------------
// Derived statistics
// ---------------------------------------------------------------------------

/// Spread of one replicate group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupStats {
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std_dev: f64,
    /// `std_dev / |mean|`, or `0.0` when the mean is exactly zero.
    pub cv: f64,
}

/// Everything the statistics engine derives from a single record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProteinStats {
    pub dried: GroupStats,
    pub liquid: GroupStats,
    /// Mean of the two group means.
    pub average_intensity: f64,
    /// log2(liquid mean / dried mean). `None` unless both means are positive.
    pub abundance: Option<f64>,
}

impl ProteinStats {
    /// The noisier of the two groups.
    pub fn max_cv(&self) -> f64 {
        self.dried.cv.max(self.liquid.cv)
    }
}

// ---------------------------------------------------------------------------
// ProteinTable – the working table threaded through the pipeline
// ---------------------------------------------------------------------------

/// A record together with its statistics and classification.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedProtein {
    pub record: ProteinRecord,
    pub stats: ProteinStats,
    pub clinically_relevant: bool,
}

/// Ordered table of analyzed proteins. A row's index is its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProteinTable {
    pub proteins: Vec<AnalyzedProtein>,
}

impl ProteinTable {
    pub fn new(proteins: Vec<AnalyzedProtein>) -> Self {
        ProteinTable { proteins }
    }

    /// Number of proteins.
    pub fn len(&self) -> usize {
        self.proteins.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.proteins.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnalyzedProtein> {
        self.proteins.iter()
    }

    /// Rows flagged as clinically relevant, in table order.
    pub fn clinically_relevant(&self) -> impl Iterator<Item = &AnalyzedProtein> {
        self.proteins.iter().filter(|p| p.clinically_relevant)
    }
}

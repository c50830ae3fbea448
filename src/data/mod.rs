/// Data layer: core types, loading, statistics and filtering.
///
/// Architecture:
/// ```text
///  proteinGroups.txt
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse tab-separated rows → Vec<ProteinRecord>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  per-row means, CV, log2 fold change → ProteinTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  drop noisy rows, flag clinical relevance, sort
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;

/// Data layer: core types, loading, and derived statistics.
///
/// Architecture:
/// ```text
///  .csv / .tsv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │    Table      │  row labels, column labels, Array2<f64>
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  standard scale, Pearson → CorrelationMatrix
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod stats;

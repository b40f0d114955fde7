/// Data layer: core types, loading, filtering and chart computation.
///
/// Architecture:
/// ```text
///  .csv / .xlsx
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Table (typed columns)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  per-column selections → filtered Table + FilterState
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  chart   │  histogram / value counts / scatter points
///   └──────────┘
/// ```

pub mod chart;
pub mod filter;
pub mod loader;
pub mod model;

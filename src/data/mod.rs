/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ClimateTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ ClimateTable  │  Vec<Record>, country / income group / year index
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply Filters → filtered indices
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;

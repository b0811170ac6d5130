/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet / shared sheet
///        │
///        ▼
///   ┌──────────────┐
///   │ source        │  DataSource + TTL cache
///   └──────────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  loader       │  parse rows, derive Ec/Ep and Vl/Vp → BladeDataset
///   └──────────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  filter       │  range + category predicates → filtered indices
///   └──────────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod options;
pub mod source;

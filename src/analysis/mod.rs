/// Analysis engine: ranking, selection, aggregation and fitting.
///
/// Pipeline for one filter state:
/// ```text
///   ClimateTable + Filters
///        │
///        ├──► rank       warming rate per country in the window
///        │      │
///        │      ▼
///        │    select     top-N countries, or income-group mode
///        │
///        ├──► aggregate  (year, income group) means
///        ├──► regression temperature ~ CO₂ over filtered rows
///        └──► distribution  box-plot summaries per income group
///        │
///        ▼
///   view::recompute → ViewModel
/// ```

pub mod aggregate;
pub mod distribution;
pub mod error;
pub mod rank;
pub mod regression;
pub mod select;
pub mod view;

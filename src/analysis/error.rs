use serde::Serialize;
use thiserror::Error;

/// Non-fatal conditions reported by the analysis engine.
///
/// None of these abort a recomputation: the affected chart is replaced by a
/// notice and everything else is still produced.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum AnalysisError {
    /// The filters left no records to work with.
    #[error("no data for the selected filters")]
    EmptySelection,

    /// Too few usable `(CO₂, temperature)` pairs for a linear fit.
    #[error("not enough data for regression ({observations} complete rows, {distinct_x} distinct CO₂ values)")]
    InsufficientDataForFit {
        observations: usize,
        distinct_x: usize,
    },

    #[error("invalid year window {min}..={max}")]
    InvalidWindow { min: i32, max: i32 },
}

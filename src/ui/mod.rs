/// egui rendering: side-panel widgets, charts and tables.
///
/// Nothing here computes; every chart draws from the cached `ViewModel`.

pub mod panels;
pub mod plot;
pub mod tables;

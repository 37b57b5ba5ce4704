use std::collections::BTreeSet;

use serde::Serialize;

use super::model::{ClimateTable, Record, YearWindow};

/// Countries pre-selected when a table is opened, if present.
pub const DEFAULT_COUNTRIES: [&str; 3] = ["India", "United States", "China"];

/// Default cap on individually plotted countries.
pub const DEFAULT_MAX_COUNT: usize = 8;

/// Range offered by the "max countries" slider.
pub const MAX_COUNT_RANGE: std::ops::RangeInclusive<usize> = 3..=20;

// ---------------------------------------------------------------------------
// Filter state emitted by the side panel
// ---------------------------------------------------------------------------

/// Display-only switches; these never change ranking, selection or fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayOptions {
    /// Plot CO₂ as `log1p(kt)` in the scatter chart.
    pub use_log: bool,
    /// Label line ends and hide the legend.
    pub show_labels: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            use_log: true,
            show_labels: true,
        }
    }
}

/// Everything one recomputation pass needs from the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filters {
    /// Requested countries.
    pub countries: BTreeSet<String>,
    /// Requested income groups. All groups are selected on load.
    pub income_groups: BTreeSet<String>,
    pub window: YearWindow,
    /// Maximum number of countries plotted individually.
    pub max_count: usize,
    /// Switch to income-group averages when too many countries are requested.
    pub auto_aggregate: bool,
    pub display: DisplayOptions,
}

impl Filters {
    /// Initial filters for a freshly loaded table.
    ///
    /// Selects the default countries that exist in the table (or the first
    /// three countries when none do), every income group and the full year
    /// span.
    pub fn for_table(table: &ClimateTable) -> Self {
        let mut countries: BTreeSet<String> = DEFAULT_COUNTRIES
            .iter()
            .filter(|c| table.countries.contains(**c))
            .map(|c| c.to_string())
            .collect();
        if countries.is_empty() {
            countries = table.countries.iter().take(3).cloned().collect();
        }

        Filters {
            countries,
            income_groups: table.income_groups.clone(),
            window: table.year_span().unwrap_or(YearWindow::new(0, 0)),
            max_count: DEFAULT_MAX_COUNT,
            auto_aggregate: true,
            display: DisplayOptions::default(),
        }
    }

    /// Whether a record passes the country, income group and year filters.
    pub fn accepts(&self, rec: &Record) -> bool {
        self.window.contains(rec.year)
            && self.countries.contains(&rec.country)
            && self.income_groups.contains(&rec.income_group)
    }
}

/// Return indices of records that pass all active filters.
pub fn filtered_indices(table: &ClimateTable, filters: &Filters) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| filters.accepts(rec))
        .map(|(i, _)| i)
        .collect()
}

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

/// One country-year observation.
///
/// Metric cells that were empty, `NaN` or otherwise non-finite in the source
/// are stored as `None` and skipped by every computation that reads them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub country: String,
    pub income_group: String,
    pub year: i32,
    /// Mean temperature in °C.
    pub mean_temp: Option<f64>,
    /// CO₂ emissions in kilotonnes.
    pub co2_kt: Option<f64>,
}

impl Record {
    pub fn new(
        country: impl Into<String>,
        income_group: impl Into<String>,
        year: i32,
        mean_temp: Option<f64>,
        co2_kt: Option<f64>,
    ) -> Self {
        Record {
            country: country.into(),
            income_group: income_group.into(),
            year,
            mean_temp: mean_temp.filter(|v| v.is_finite()),
            co2_kt: co2_kt.filter(|v| v.is_finite()),
        }
    }
}

// ---------------------------------------------------------------------------
// YearWindow – inclusive year range
// ---------------------------------------------------------------------------

/// Inclusive `[min, max]` year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearWindow {
    pub min: i32,
    pub max: i32,
}

impl YearWindow {
    pub fn new(min: i32, max: i32) -> Self {
        YearWindow { min, max }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

// ---------------------------------------------------------------------------
// ClimateTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
///
/// Holds at most one record per `(country, year)`; later duplicates are
/// dropped when the table is built.
#[derive(Debug, Clone, Default)]
pub struct ClimateTable {
    /// All records in load order.
    pub records: Vec<Record>,
    /// Sorted unique countries.
    pub countries: BTreeSet<String>,
    /// Sorted unique income groups.
    pub income_groups: BTreeSet<String>,
    /// Sorted unique years.
    pub years: BTreeSet<i32>,
    /// Number of duplicate `(country, year)` rows discarded on build.
    pub duplicates_dropped: usize,
}

impl ClimateTable {
    /// Build column indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut seen: BTreeSet<(String, i32)> = BTreeSet::new();
        let mut kept = Vec::with_capacity(records.len());
        let mut duplicates_dropped = 0;

        for rec in records {
            if seen.insert((rec.country.clone(), rec.year)) {
                kept.push(rec);
            } else {
                duplicates_dropped += 1;
            }
        }
        if duplicates_dropped > 0 {
            log::warn!("Dropped {duplicates_dropped} duplicate country-year rows");
        }

        let mut countries = BTreeSet::new();
        let mut income_groups = BTreeSet::new();
        let mut years = BTreeSet::new();
        for rec in &kept {
            countries.insert(rec.country.clone());
            income_groups.insert(rec.income_group.clone());
            years.insert(rec.year);
        }

        ClimateTable {
            records: kept,
            countries,
            income_groups,
            years,
            duplicates_dropped,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Full year span of the data, `None` for an empty table.
    pub fn year_span(&self) -> Option<YearWindow> {
        let min = *self.years.first()?;
        let max = *self.years.last()?;
        Some(YearWindow::new(min, max))
    }

    /// Records grouped per country, each group sorted by year ascending.
    ///
    /// Only records inside `window` are included.
    pub fn by_country_in(&self, window: YearWindow) -> BTreeMap<&str, Vec<&Record>> {
        let mut groups: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
        for rec in self.records.iter().filter(|r| window.contains(r.year)) {
            groups.entry(rec.country.as_str()).or_default().push(rec);
        }
        for group in groups.values_mut() {
            group.sort_by_key(|r| r.year);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_records_builds_indices() {
        let table = ClimateTable::from_records(vec![
            Record::new("India", "Lower middle income", 2001, Some(25.0), Some(1.0)),
            Record::new("Chad", "Low income", 2000, Some(27.0), None),
            Record::new("India", "Lower middle income", 2000, Some(24.8), Some(0.9)),
        ]);

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.countries.iter().cloned().collect::<Vec<_>>(),
            vec!["Chad".to_string(), "India".to_string()]
        );
        assert_eq!(table.income_groups.len(), 2);
        assert_eq!(table.year_span(), Some(YearWindow::new(2000, 2001)));
    }

    #[test]
    fn test_duplicate_country_year_keeps_first() {
        let table = ClimateTable::from_records(vec![
            Record::new("Chad", "Low income", 2000, Some(27.0), None),
            Record::new("Chad", "Low income", 2000, Some(99.0), None),
        ]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.duplicates_dropped, 1);
        assert_eq!(table.records[0].mean_temp, Some(27.0));
    }

    #[test]
    fn test_non_finite_metrics_become_missing() {
        let rec = Record::new("Chad", "Low income", 2000, Some(f64::NAN), Some(f64::INFINITY));
        assert_eq!(rec.mean_temp, None);
        assert_eq!(rec.co2_kt, None);
    }

    #[test]
    fn test_by_country_in_sorts_and_windows() {
        let table = ClimateTable::from_records(vec![
            Record::new("Chad", "Low income", 2002, Some(3.0), None),
            Record::new("Chad", "Low income", 1999, Some(0.0), None),
            Record::new("Chad", "Low income", 2000, Some(1.0), None),
        ]);

        let groups = table.by_country_in(YearWindow::new(2000, 2005));
        let years: Vec<i32> = groups["Chad"].iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2000, 2002]);
    }

    #[test]
    fn test_empty_table_has_no_span() {
        let table = ClimateTable::from_records(Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.year_span(), None);
    }
}

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::model::ClimateTable;

/// Income-group average for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPoint {
    pub year: i32,
    pub income_group: String,
    /// `None` when no record in the group has a temperature.
    pub mean_temp: Option<f64>,
    /// `None` when no record in the group has a CO₂ value.
    pub mean_co2: Option<f64>,
}

/// Running arithmetic mean that ignores missing values.
#[derive(Debug, Default, Clone, Copy)]
struct MeanAcc {
    sum: f64,
    count: usize,
}

impl MeanAcc {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Average temperature and CO₂ per `(year, income group)` over the given rows.
///
/// `indices` are positions in `table.records`, normally the output of
/// [`crate::data::filter::filtered_indices`]. Rows are ordered by year, then
/// income group.
pub fn aggregate_by_category(table: &ClimateTable, indices: &[usize]) -> Vec<CategoryPoint> {
    aggregate_with(table, indices, |co2| co2)
}

/// Like [`aggregate_by_category`], but maps every CO₂ value through
/// `co2_transform` before averaging. Values mapped to a non-finite number
/// count as missing.
pub fn aggregate_with(
    table: &ClimateTable,
    indices: &[usize],
    co2_transform: impl Fn(f64) -> f64,
) -> Vec<CategoryPoint> {
    let mut groups: BTreeMap<(i32, &str), (MeanAcc, MeanAcc)> = BTreeMap::new();

    for rec in indices.iter().filter_map(|&i| table.records.get(i)) {
        let (temp, co2) = groups
            .entry((rec.year, rec.income_group.as_str()))
            .or_default();
        temp.push(rec.mean_temp);
        co2.push(rec.co2_kt.map(&co2_transform).filter(|v| v.is_finite()));
    }

    groups
        .into_iter()
        .map(|((year, income_group), (temp, co2))| CategoryPoint {
            year,
            income_group: income_group.to_string(),
            mean_temp: temp.mean(),
            mean_co2: co2.mean(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn all(table: &ClimateTable) -> Vec<usize> {
        (0..table.len()).collect()
    }

    #[test]
    fn test_group_means() {
        let table = ClimateTable::from_records(vec![
            Record::new("A", "Low", 2000, Some(10.0), None),
            Record::new("B", "Low", 2000, Some(20.0), None),
            Record::new("C", "High", 2000, Some(5.0), None),
        ]);

        let points = aggregate_by_category(&table, &all(&table));

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].income_group, "High");
        assert_eq!(points[0].mean_temp, Some(5.0));
        assert_eq!(points[1].income_group, "Low");
        assert_eq!(points[1].mean_temp, Some(15.0));
    }

    #[test]
    fn test_missing_values_are_ignored_not_zeroed() {
        let table = ClimateTable::from_records(vec![
            Record::new("A", "Low", 2000, Some(10.0), Some(4.0)),
            Record::new("B", "Low", 2000, None, Some(6.0)),
            Record::new("C", "High", 2000, None, None),
        ]);

        let points = aggregate_by_category(&table, &all(&table));

        assert_eq!(points[0].income_group, "High");
        assert_eq!(points[0].mean_temp, None);
        assert_eq!(points[0].mean_co2, None);
        assert_eq!(points[1].mean_temp, Some(10.0));
        assert_eq!(points[1].mean_co2, Some(5.0));
    }

    #[test]
    fn test_ordered_by_year_then_group() {
        let table = ClimateTable::from_records(vec![
            Record::new("A", "Low", 2001, Some(1.0), None),
            Record::new("B", "High", 2001, Some(1.0), None),
            Record::new("C", "Low", 2000, Some(1.0), None),
        ]);

        let keys: Vec<(i32, String)> = aggregate_by_category(&table, &all(&table))
            .into_iter()
            .map(|p| (p.year, p.income_group))
            .collect();
        assert_eq!(
            keys,
            vec![
                (2000, "Low".to_string()),
                (2001, "High".to_string()),
                (2001, "Low".to_string()),
            ]
        );
    }

    #[test]
    fn test_only_given_indices_are_aggregated() {
        let table = ClimateTable::from_records(vec![
            Record::new("A", "Low", 2000, Some(10.0), None),
            Record::new("B", "Low", 2000, Some(30.0), None),
        ]);

        let points = aggregate_by_category(&table, &[1]);
        assert_eq!(points[0].mean_temp, Some(30.0));
    }

    #[test]
    fn test_transform_applies_before_mean() {
        let table = ClimateTable::from_records(vec![
            Record::new("A", "Low", 2000, None, Some(1.0)),
            Record::new("B", "Low", 2000, None, Some(9.0)),
        ]);

        let points = aggregate_with(&table, &all(&table), f64::sqrt);
        assert_eq!(points[0].mean_co2, Some(2.0));
    }
}

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::model::{ClimateTable, Record};

/// Tukey fence multiplier for whiskers.
const WHISKER_IQR: f64 = 1.5;

/// Five-number summary of one income group, as drawn by a box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub income_group: String,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    /// Values beyond the whiskers.
    pub outliers: Vec<f64>,
    pub count: usize,
}

/// Box-plot summaries of `metric` per income group over the given rows.
///
/// Records where `metric` returns `None` are skipped; groups left with no
/// values produce no summary. Output is ordered by income group.
pub fn box_summaries(
    table: &ClimateTable,
    indices: &[usize],
    metric: impl Fn(&Record) -> Option<f64>,
) -> Vec<BoxSummary> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for rec in indices.iter().filter_map(|&i| table.records.get(i)) {
        if let Some(v) = metric(rec) {
            groups.entry(rec.income_group.as_str()).or_default().push(v);
        }
    }

    groups
        .into_iter()
        .filter_map(|(group, values)| summarize(group, values))
        .collect()
}

fn summarize(income_group: &str, mut values: Vec<f64>) -> Option<BoxSummary> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let q1 = quantile(&values, 0.25);
    let median = quantile(&values, 0.5);
    let q3 = quantile(&values, 0.75);
    let iqr = q3 - q1;
    let low_fence = q1 - WHISKER_IQR * iqr;
    let high_fence = q3 + WHISKER_IQR * iqr;

    let inside = values.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
    let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
    let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);
    let outliers = values
        .iter()
        .copied()
        .filter(|v| !(low_fence..=high_fence).contains(v))
        .collect();

    Some(BoxSummary {
        income_group: income_group.to_string(),
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
        count: values.len(),
    })
}

/// Quantile of sorted data with linear interpolation between closest ranks.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(values: &[(&str, Option<f64>)]) -> ClimateTable {
        ClimateTable::from_records(
            values
                .iter()
                .enumerate()
                .map(|(i, (group, t))| Record::new(format!("C{i}"), *group, 2000, *t, None))
                .collect(),
        )
    }

    fn all(table: &ClimateTable) -> Vec<usize> {
        (0..table.len()).collect()
    }

    #[test]
    fn test_quantiles_interpolate() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.25), 1.75);
        assert_eq!(quantile(&sorted, 0.5), 2.5);
        assert_eq!(quantile(&sorted, 0.75), 3.25);
    }

    #[test]
    fn test_summary_with_outlier() {
        let values: Vec<(&str, Option<f64>)> = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0]
            .iter()
            .map(|v| ("Low", Some(*v)))
            .collect();
        let table = table(&values);

        let boxes = box_summaries(&table, &all(&table), |r| r.mean_temp);

        assert_eq!(boxes.len(), 1);
        let b = &boxes[0];
        assert_eq!(b.count, 6);
        assert_eq!(b.median, 3.5);
        assert_eq!(b.lower_whisker, 1.0);
        assert_eq!(b.upper_whisker, 5.0);
        assert_eq!(b.outliers, vec![100.0]);
    }

    #[test]
    fn test_groups_are_sorted_and_missing_skipped() {
        let table = table(&[
            ("Low", Some(3.0)),
            ("High", Some(1.0)),
            ("High", None),
            ("Upper middle", None),
        ]);

        let boxes = box_summaries(&table, &all(&table), |r| r.mean_temp);
        let groups: Vec<&str> = boxes.iter().map(|b| b.income_group.as_str()).collect();
        assert_eq!(groups, vec!["High", "Low"]);
        assert_eq!(boxes[0].count, 1);
        assert_eq!(boxes[0].median, 1.0);
        assert_eq!(boxes[0].lower_whisker, 1.0);
        assert_eq!(boxes[0].upper_whisker, 1.0);
    }
}

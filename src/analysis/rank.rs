use serde::Serialize;

use crate::data::model::{ClimateTable, YearWindow};

use super::error::AnalysisError;

/// One country's warming rate within a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntity {
    pub country: String,
    /// Mean year-over-year change of mean temperature (°C / year step).
    pub score: f64,
    /// Number of year-over-year differences the score averages.
    pub deltas: usize,
}

/// Rank countries by mean year-over-year temperature change inside `window`.
///
/// Each country's in-window records are ordered by year and differenced
/// pairwise. A difference is formed only when both neighbouring temperatures
/// are present, so a missing year invalidates the two steps touching it.
/// Countries without a single valid difference are left out entirely.
///
/// The result is sorted by score, highest first; equal scores keep
/// alphabetical country order, so the output is fully deterministic.
pub fn rank_entities(
    table: &ClimateTable,
    window: YearWindow,
) -> Result<Vec<RankedEntity>, AnalysisError> {
    if !window.is_valid() {
        return Err(AnalysisError::InvalidWindow {
            min: window.min,
            max: window.max,
        });
    }

    let mut ranked: Vec<RankedEntity> = table
        .by_country_in(window)
        .into_iter()
        .filter_map(|(country, records)| {
            let deltas: Vec<f64> = records
                .windows(2)
                .filter_map(|pair| Some(pair[1].mean_temp? - pair[0].mean_temp?))
                .collect();
            if deltas.is_empty() {
                return None;
            }
            let score = deltas.iter().sum::<f64>() / deltas.len() as f64;
            Some(RankedEntity {
                country: country.to_string(),
                score,
                deltas: deltas.len(),
            })
        })
        .collect();

    // `by_country_in` yields countries alphabetically and the sort is stable.
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn series(country: &str, start: i32, temps: &[Option<f64>]) -> Vec<Record> {
        temps
            .iter()
            .enumerate()
            .map(|(i, t)| Record::new(country, "Low income", start + i as i32, *t, None))
            .collect()
    }

    #[test]
    fn test_warming_country_ranks_first() {
        let mut records = series("B", 2000, &[Some(1.0), Some(0.9), Some(0.8)]);
        records.extend(series("A", 2000, &[Some(1.0), Some(1.2), Some(1.5)]));
        let table = ClimateTable::from_records(records);

        let ranked = rank_entities(&table, YearWindow::new(2000, 2002)).unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].country, "A");
        assert!(approx_eq(ranked[0].score, 0.25));
        assert_eq!(ranked[1].country, "B");
        assert!(approx_eq(ranked[1].score, -0.1));
    }

    #[test]
    fn test_records_are_ordered_by_year_before_differencing() {
        let table = ClimateTable::from_records(vec![
            Record::new("A", "Low income", 2002, Some(3.0), None),
            Record::new("A", "Low income", 2000, Some(1.0), None),
            Record::new("A", "Low income", 2001, Some(1.5), None),
        ]);

        let ranked = rank_entities(&table, YearWindow::new(2000, 2002)).unwrap();
        assert!(approx_eq(ranked[0].score, 1.0));
        assert_eq!(ranked[0].deltas, 2);
    }

    #[test]
    fn test_single_observation_is_excluded() {
        let mut records = series("A", 2000, &[Some(1.0), Some(2.0)]);
        records.extend(series("B", 2000, &[Some(5.0)]));
        let table = ClimateTable::from_records(records);

        let ranked = rank_entities(&table, YearWindow::new(2000, 2001)).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].country, "A");
    }

    #[test]
    fn test_window_restricts_records() {
        let table = ClimateTable::from_records(series(
            "A",
            2000,
            &[Some(0.0), Some(10.0), Some(11.0), Some(12.0)],
        ));

        let ranked = rank_entities(&table, YearWindow::new(2001, 2003)).unwrap();
        assert!(approx_eq(ranked[0].score, 1.0));

        let ranked = rank_entities(&table, YearWindow::new(2003, 2003)).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_missing_values_drop_adjacent_deltas() {
        let table = ClimateTable::from_records(series(
            "A",
            2000,
            &[Some(1.0), None, Some(3.0), Some(4.0)],
        ));

        let ranked = rank_entities(&table, YearWindow::new(2000, 2003)).unwrap();
        assert_eq!(ranked[0].deltas, 1);
        assert!(approx_eq(ranked[0].score, 1.0));

        let table = ClimateTable::from_records(series("B", 2000, &[Some(1.0), None, Some(3.0)]));
        let ranked = rank_entities(&table, YearWindow::new(2000, 2002)).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_empty_window_yields_empty_ranking() {
        let table = ClimateTable::from_records(series("A", 2000, &[Some(1.0), Some(2.0)]));
        let ranked = rank_entities(&table, YearWindow::new(1900, 1950)).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_ties_break_alphabetically() {
        let mut records = series("Zambia", 2000, &[Some(1.0), Some(2.0)]);
        records.extend(series("Angola", 2000, &[Some(5.0), Some(6.0)]));
        let table = ClimateTable::from_records(records);

        let ranked = rank_entities(&table, YearWindow::new(2000, 2001)).unwrap();
        assert_eq!(ranked[0].country, "Angola");
        assert_eq!(ranked[1].country, "Zambia");
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let table = ClimateTable::from_records(Vec::new());
        assert_eq!(
            rank_entities(&table, YearWindow::new(2001, 2000)),
            Err(AnalysisError::InvalidWindow { min: 2001, max: 2000 })
        );
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let mut records = series("A", 2000, &[Some(1.0), Some(1.3), Some(1.1)]);
        records.extend(series("B", 2000, &[Some(2.0), Some(2.2), Some(2.9)]));
        let table = ClimateTable::from_records(records);
        let window = YearWindow::new(2000, 2002);

        let first = rank_entities(&table, window).unwrap();
        let second = rank_entities(&table, window).unwrap();
        let bits = |r: &[RankedEntity]| r.iter().map(|e| e.score.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
        assert_eq!(first, second);
    }
}

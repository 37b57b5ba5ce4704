use std::collections::BTreeSet;

use serde::Serialize;

use super::rank::RankedEntity;

/// What the trend and scatter charts should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "countries", rename_all = "snake_case")]
pub enum Selection {
    /// Individual countries, highest warming rate first.
    PerEntity(Vec<String>),
    /// Too many countries were requested: show income-group averages.
    PerCategory,
}

impl Selection {
    pub fn is_per_category(&self) -> bool {
        matches!(self, Selection::PerCategory)
    }

    /// Selected countries; empty in per-category mode.
    pub fn countries(&self) -> &[String] {
        match self {
            Selection::PerEntity(countries) => countries,
            Selection::PerCategory => &[],
        }
    }
}

/// Decide between plotting individual countries and income-group averages.
///
/// Per-category mode is used only when `auto_aggregate` is on and more than
/// `max_count` countries are requested. Otherwise the ranking is restricted
/// to the requested countries and cut to `max_count`, keeping rank order.
/// Requested countries without a rank score are not plotted.
pub fn select_entities(
    requested: &BTreeSet<String>,
    max_count: usize,
    auto_aggregate: bool,
    ranking: &[RankedEntity],
) -> Selection {
    let too_many = requested.len() > max_count;
    if auto_aggregate && too_many {
        return Selection::PerCategory;
    }

    let countries = ranking
        .iter()
        .filter(|r| requested.contains(&r.country))
        .take(max_count)
        .map(|r| r.country.clone())
        .collect();
    Selection::PerEntity(countries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking(countries: &[&str]) -> Vec<RankedEntity> {
        countries
            .iter()
            .enumerate()
            .map(|(i, c)| RankedEntity {
                country: c.to_string(),
                score: 1.0 - i as f64 * 0.1,
                deltas: 3,
            })
            .collect()
    }

    fn requested(countries: &[&str]) -> BTreeSet<String> {
        countries.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_selection_follows_rank_order_not_request_order() {
        let rank = ranking(&["China", "India", "Chad", "Peru"]);
        let selection = select_entities(&requested(&["Peru", "India"]), 8, true, &rank);
        assert_eq!(
            selection,
            Selection::PerEntity(vec!["India".to_string(), "Peru".to_string()])
        );
    }

    #[test]
    fn test_selection_is_capped_and_subset_of_request() {
        let rank = ranking(&["A", "B", "C", "D", "E"]);
        let req = requested(&["E", "D", "B", "A"]);

        let selection = select_entities(&req, 3, false, &rank);
        let countries = selection.countries();
        assert_eq!(countries, ["A", "B", "D"]);
        assert!(countries.iter().all(|c| req.contains(c)));
    }

    #[test]
    fn test_too_many_with_auto_aggregate_switches_to_categories() {
        let rank = ranking(&["A", "B", "C", "D"]);
        let selection = select_entities(&requested(&["A", "B", "C", "D"]), 3, true, &rank);
        assert!(selection.is_per_category());
        assert!(selection.countries().is_empty());
    }

    #[test]
    fn test_at_threshold_stays_per_entity() {
        let rank = ranking(&["A", "B", "C"]);
        let selection = select_entities(&requested(&["A", "B", "C"]), 3, true, &rank);
        assert_eq!(selection.countries().len(), 3);
    }

    #[test]
    fn test_zero_max_count_is_empty_not_error() {
        let rank = ranking(&["A", "B"]);
        let selection = select_entities(&requested(&["A"]), 0, false, &rank);
        assert_eq!(selection, Selection::PerEntity(Vec::new()));
    }

    #[test]
    fn test_unranked_request_is_skipped() {
        let rank = ranking(&["A"]);
        let selection = select_entities(&requested(&["A", "Ghost"]), 5, false, &rank);
        assert_eq!(selection.countries(), ["A"]);
    }
}

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::data::filter::{Filters, filtered_indices};
use crate::data::model::{ClimateTable, Record};

use super::aggregate::{CategoryPoint, aggregate_by_category, aggregate_with};
use super::distribution::{BoxSummary, box_summaries};
use super::error::AnalysisError;
use super::rank::{RankedEntity, rank_entities};
use super::regression::{LinearFit, fit_linear};
use super::select::{Selection, select_entities};

// ---------------------------------------------------------------------------
// CO₂ axis scale
// ---------------------------------------------------------------------------

/// Display transform for CO₂ on the scatter chart's x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Co2Scale {
    Linear,
    /// `ln(1 + kt)`, defined at zero emissions.
    Log1p,
}

impl Co2Scale {
    pub fn from_use_log(use_log: bool) -> Self {
        if use_log { Co2Scale::Log1p } else { Co2Scale::Linear }
    }

    pub fn apply(self, kt: f64) -> f64 {
        match self {
            Co2Scale::Linear => kt,
            Co2Scale::Log1p => kt.ln_1p(),
        }
    }

    pub fn axis_label(self) -> &'static str {
        match self {
            Co2Scale::Linear => "CO₂ Emissions (kt)",
            Co2Scale::Log1p => "CO₂ Emissions log1p(kt)",
        }
    }
}

// ---------------------------------------------------------------------------
// ViewModel – everything the charts need for one filter state
// ---------------------------------------------------------------------------

/// A named sequence of `[x, y]` points handed to the plotting layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub points: Vec<[f64; 2]>,
}

/// Observed CO₂/temperature pairs and the line fitted through them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionView {
    /// `[co2_kt, mean_temp]`, in the same order as `fit.fitted`.
    pub observed: Vec<[f64; 2]>,
    pub fit: LinearFit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub filters: Filters,
    /// Number of records passing the filters.
    pub filtered_records: usize,
    /// Distinct countries among those records.
    pub filtered_countries: usize,
    /// Every country with a warming rate in the window, highest first.
    pub ranking: Vec<RankedEntity>,
    pub selection: Selection,
    /// Per-country temperature lines, or income-group averages.
    pub temperature_series: Vec<Series>,
    /// Income-group average temperature per year, in both selection modes.
    pub group_temperature_series: Vec<Series>,
    /// Income-group average CO₂ per year.
    pub co2_series: Vec<Series>,
    /// CO₂ (scaled) against temperature, grouped like `temperature_series`.
    pub scatter: Vec<Series>,
    pub scatter_x_label: String,
    pub regression: Result<RegressionView, AnalysisError>,
    pub temperature_boxes: Vec<BoxSummary>,
    pub co2_boxes: Vec<BoxSummary>,
    /// Set when the filters leave nothing to show.
    pub notice: Option<AnalysisError>,
}

impl ViewModel {
    fn empty(filters: &Filters, notice: AnalysisError) -> Self {
        let scale = Co2Scale::from_use_log(filters.display.use_log);
        ViewModel {
            filters: filters.clone(),
            filtered_records: 0,
            filtered_countries: 0,
            ranking: Vec::new(),
            selection: Selection::PerEntity(Vec::new()),
            temperature_series: Vec::new(),
            group_temperature_series: Vec::new(),
            co2_series: Vec::new(),
            scatter: Vec::new(),
            scatter_x_label: scale.axis_label().to_string(),
            regression: Err(AnalysisError::InsufficientDataForFit {
                observations: 0,
                distinct_x: 0,
            }),
            temperature_boxes: Vec::new(),
            co2_boxes: Vec::new(),
            notice: Some(notice),
        }
    }
}

/// Recompute every chart input for one filter state.
///
/// Pure: the same table and filters always give an identical `ViewModel`.
/// Ranking covers the whole table inside the year window; everything else
/// works on the filtered records only.
pub fn recompute(table: &ClimateTable, filters: &Filters) -> ViewModel {
    let ranking = match rank_entities(table, filters.window) {
        Ok(ranking) => ranking,
        Err(e) => {
            log::warn!("Recompute skipped: {e}");
            return ViewModel::empty(filters, e);
        }
    };

    let indices = filtered_indices(table, filters);
    if indices.is_empty() {
        log::debug!("No records match the current filters");
        let mut view = ViewModel::empty(filters, AnalysisError::EmptySelection);
        view.ranking = ranking;
        return view;
    }

    let selection = select_entities(
        &filters.countries,
        filters.max_count,
        filters.auto_aggregate,
        &ranking,
    );
    let scale = Co2Scale::from_use_log(filters.display.use_log);

    let filtered_countries = indices
        .iter()
        .map(|&i| table.records[i].country.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let categories = aggregate_by_category(table, &indices);
    let group_temperature_series =
        category_series(&categories, |p| Some([p.year as f64, p.mean_temp?]));
    let temperature_series = match &selection {
        Selection::PerEntity(countries) => {
            country_series(table, &indices, countries, |r| Some([r.year as f64, r.mean_temp?]))
        }
        Selection::PerCategory => group_temperature_series.clone(),
    };
    let co2_series = category_series(&categories, |p| Some([p.year as f64, p.mean_co2?]));

    // Rows with both metrics: the scatter chart and the regression share them.
    let complete: Vec<usize> = indices
        .iter()
        .copied()
        .filter(|&i| {
            let r = &table.records[i];
            r.mean_temp.is_some() && r.co2_kt.is_some()
        })
        .collect();

    let scatter = match &selection {
        Selection::PerEntity(countries) => country_series(table, &complete, countries, |r| {
            let x = scale.apply(r.co2_kt?);
            x.is_finite().then_some([x, r.mean_temp?])
        }),
        Selection::PerCategory => {
            // Both means must come from the same rows.
            let scalable: Vec<usize> = complete
                .iter()
                .copied()
                .filter(|&i| {
                    table.records[i]
                        .co2_kt
                        .is_some_and(|kt| scale.apply(kt).is_finite())
                })
                .collect();
            let scaled = aggregate_with(table, &scalable, |kt| scale.apply(kt));
            category_series(&scaled, |p| Some([p.mean_co2?, p.mean_temp?]))
        }
    };

    let observed: Vec<[f64; 2]> = complete
        .iter()
        .filter_map(|&i| {
            let r = &table.records[i];
            Some([r.co2_kt?, r.mean_temp?])
        })
        .collect();
    let pairs: Vec<(f64, f64)> = observed.iter().map(|p| (p[0], p[1])).collect();
    let regression = fit_linear(&pairs).map(|fit| RegressionView { observed, fit });

    let view = ViewModel {
        filters: filters.clone(),
        filtered_records: indices.len(),
        filtered_countries,
        temperature_boxes: box_summaries(table, &indices, |r| r.mean_temp),
        co2_boxes: box_summaries(table, &indices, |r| r.co2_kt),
        ranking,
        selection,
        temperature_series,
        group_temperature_series,
        co2_series,
        scatter,
        scatter_x_label: scale.axis_label().to_string(),
        regression,
        notice: None,
    };

    log::debug!(
        "Recomputed view: {} records, {} ranked, per-category={}, regression={}",
        view.filtered_records,
        view.ranking.len(),
        view.selection.is_per_category(),
        view.regression.is_ok()
    );
    view
}

/// One series per selected country, in selection order, points sorted by x.
fn country_series(
    table: &ClimateTable,
    indices: &[usize],
    countries: &[String],
    point: impl Fn(&Record) -> Option<[f64; 2]>,
) -> Vec<Series> {
    let mut by_country: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for rec in indices.iter().filter_map(|&i| table.records.get(i)) {
        if let Some(p) = point(rec) {
            by_country.entry(rec.country.as_str()).or_default().push(p);
        }
    }

    countries
        .iter()
        .filter_map(|country| {
            let mut points = by_country.remove(country.as_str())?;
            points.sort_by(|a, b| a[0].total_cmp(&b[0]));
            Some(Series {
                label: country.clone(),
                points,
            })
        })
        .collect()
}

/// One series per income group; input rows are already ordered by year.
fn category_series(
    rows: &[CategoryPoint],
    point: impl Fn(&CategoryPoint) -> Option<[f64; 2]>,
) -> Vec<Series> {
    let mut by_group: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for row in rows {
        if let Some(p) = point(row) {
            by_group.entry(row.income_group.as_str()).or_default().push(p);
        }
    }
    by_group
        .into_iter()
        .map(|(group, points)| Series {
            label: group.to_string(),
            points,
        })
        .collect()
}

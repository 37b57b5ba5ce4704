use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::analysis::view::{ViewModel, recompute};
use crate::color::ColorMap;
use crate::data::filter::Filters;
use crate::data::model::{ClimateTable, YearWindow};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded table (None until a file is loaded). Never mutated after load.
    pub table: Option<Arc<ClimateTable>>,

    /// Current filter selections.
    pub filters: Option<Filters>,

    /// Chart inputs for the current filters (cached).
    pub view: Option<ViewModel>,

    /// Colours per country.
    pub country_colors: ColorMap,

    /// Colours per income group.
    pub group_colors: ColorMap,

    /// Text typed into the country search box.
    pub country_search: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded table with the given initial filters.
    pub fn set_table(&mut self, table: Arc<ClimateTable>, filters: Filters) {
        self.country_colors = ColorMap::new(table.countries.iter());
        self.group_colors = ColorMap::new(table.income_groups.iter());
        self.filters = Some(filters);
        self.table = Some(table);
        self.country_search.clear();
        self.status_message = None;
        self.refresh();
    }

    /// Replace the table with a freshly loaded one, resetting filters but
    /// keeping the user's display and count preferences.
    pub fn replace_table(&mut self, table: ClimateTable) {
        let mut filters = Filters::for_table(&table);
        if let Some(old) = &self.filters {
            filters.max_count = old.max_count;
            filters.auto_aggregate = old.auto_aggregate;
            filters.display = old.display;
        }
        self.set_table(Arc::new(table), filters);
    }

    /// Recompute the cached view after a filter change.
    pub fn refresh(&mut self) {
        if let (Some(table), Some(filters)) = (&self.table, &self.filters) {
            self.view = Some(recompute(table, filters));
        }
    }

    /// Apply `change` to the filters and recompute if anything changed.
    pub fn update_filters(&mut self, change: impl FnOnce(&mut Filters)) {
        let Some(filters) = self.filters.as_mut() else {
            return;
        };
        let before = filters.clone();
        change(filters);
        clamp_window(&mut filters.window);
        if *filters != before {
            self.refresh();
        }
    }

    /// Write the current view as pretty JSON.
    pub fn export_view(&self, path: &Path) -> Result<()> {
        let view = self.view.as_ref().context("nothing to export")?;
        let json = serde_json::to_string_pretty(view).context("serializing view")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported view to {}", path.display());
        Ok(())
    }
}

/// Keep `min <= max` when either slider is dragged past the other.
fn clamp_window(window: &mut YearWindow) {
    if window.min > window.max {
        window.max = window.min;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn state() -> AppState {
        let table = ClimateTable::from_records(vec![
            Record::new("India", "Lower middle income", 2000, Some(24.0), Some(1.0)),
            Record::new("India", "Lower middle income", 2001, Some(24.2), Some(2.0)),
            Record::new("Chad", "Low income", 2000, Some(27.0), Some(0.5)),
            Record::new("Chad", "Low income", 2001, Some(27.1), Some(0.6)),
        ]);
        let mut state = AppState::default();
        let filters = Filters::for_table(&table);
        state.set_table(Arc::new(table), filters);
        state
    }

    #[test]
    fn test_set_table_computes_view() {
        let state = state();
        let view = state.view.as_ref().unwrap();
        assert_eq!(view.selection.countries(), ["India"]);
    }

    #[test]
    fn test_update_filters_recomputes() {
        let mut state = state();
        state.update_filters(|f| {
            f.countries.insert("Chad".to_string());
        });
        let view = state.view.as_ref().unwrap();
        assert_eq!(view.selection.countries(), ["India", "Chad"]);
    }

    #[test]
    fn test_window_is_clamped() {
        let mut state = state();
        state.update_filters(|f| f.window.min = 2005);
        let filters = state.filters.as_ref().unwrap();
        assert_eq!(filters.window, YearWindow::new(2005, 2005));
    }

    #[test]
    fn test_replace_table_keeps_preferences() {
        let mut state = state();
        state.update_filters(|f| {
            f.max_count = 15;
            f.display.use_log = false;
        });
        state.replace_table(ClimateTable::from_records(vec![Record::new(
            "Peru",
            "Upper middle income",
            1990,
            Some(19.0),
            None,
        )]));

        let filters = state.filters.as_ref().unwrap();
        assert_eq!(filters.max_count, 15);
        assert!(!filters.display.use_log);
        assert!(filters.countries.contains("Peru"));
    }

    #[test]
    fn test_export_view() {
        let state = state();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("view.json");
        state.export_view(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["filtered_records"], 2);
        assert_eq!(json["selection"]["mode"], "per_entity");
    }
}

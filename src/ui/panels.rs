use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::MAX_COUNT_RANGE;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    let (Some(table), Some(current)) = (state.table.clone(), state.filters.as_ref()) else {
        ui.label("No dataset loaded.");
        return;
    };
    let Some(span) = table.year_span() else {
        ui.label("The dataset has no rows.");
        return;
    };

    // Widgets edit a copy; the state recomputes only if it differs.
    let mut filters = current.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year range ----
            ui.strong("Year range");
            ui.add(egui::Slider::new(&mut filters.window.min, span.min..=span.max).text("from"));
            ui.add(egui::Slider::new(&mut filters.window.max, span.min..=span.max).text("to"));
            ui.separator();

            // ---- Countries (searchable) ----
            let header = format!(
                "Countries  ({}/{})",
                filters.countries.len(),
                table.countries.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("countries")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut state.country_search)
                            .hint_text("Search…"),
                    );
                    let needle = state.country_search.to_lowercase();
                    let matches: Vec<&String> = table
                        .countries
                        .iter()
                        .filter(|c| c.to_lowercase().contains(&needle))
                        .collect();

                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            filters.countries.extend(matches.iter().map(|c| c.to_string()));
                        }
                        if ui.small_button("None").clicked() {
                            for c in &matches {
                                filters.countries.remove(c.as_str());
                            }
                        }
                    });

                    ScrollArea::vertical()
                        .id_salt("country_list")
                        .max_height(260.0)
                        .show(ui, |ui: &mut Ui| {
                            for country in matches {
                                let mut checked = filters.countries.contains(country);
                                let text = RichText::new(country.as_str())
                                    .color(state.country_colors.color_for(country));
                                if ui.checkbox(&mut checked, text).changed() {
                                    if checked {
                                        filters.countries.insert(country.clone());
                                    } else {
                                        filters.countries.remove(country);
                                    }
                                }
                            }
                        });
                });

            // ---- Income groups ----
            let header = format!(
                "Income groups  ({}/{})",
                filters.income_groups.len(),
                table.income_groups.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("income_groups")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            filters.income_groups = table.income_groups.clone();
                        }
                        if ui.small_button("None").clicked() {
                            filters.income_groups.clear();
                        }
                    });
                    for group in &table.income_groups {
                        let mut checked = filters.income_groups.contains(group);
                        let text = RichText::new(group.as_str())
                            .color(state.group_colors.color_for(group));
                        if ui.checkbox(&mut checked, text).changed() {
                            if checked {
                                filters.income_groups.insert(group.clone());
                            } else {
                                filters.income_groups.remove(group);
                            }
                        }
                    }
                });
            ui.separator();

            // ---- Legend / display options ----
            ui.strong("Legend / Display Options");
            ui.add(
                egui::Slider::new(&mut filters.max_count, MAX_COUNT_RANGE)
                    .text("max countries (by warming rate)"),
            );
            ui.checkbox(
                &mut filters.auto_aggregate,
                "Auto-switch to income groups when too many countries",
            );
            ui.checkbox(
                &mut filters.display.show_labels,
                "Label lines at right edge (hide legend)",
            );
            ui.checkbox(&mut filters.display.use_log, "Log scale for CO₂ (log1p)");
        });

    state.update_filters(|f| *f = filters);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.view.is_some(), egui::Button::new("Export view…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(table), Some(view)) = (&state.table, &state.view) {
            ui.label(format!(
                "{} records loaded, {} match the filters",
                table.len(),
                view.filtered_records
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open climate data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(table) => state.replace_table(table),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export view")
        .add_filter("JSON", &["json"])
        .set_file_name("climate_view.json")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_view(&path) {
            log::error!("Failed to export view: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

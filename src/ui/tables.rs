use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::analysis::view::ViewModel;
use crate::color::ColorMap;

const ROW_HEIGHT: f32 = 18.0;

/// Warming-rate ranking for the year window; requested countries in bold.
pub fn ranking_table(ui: &mut Ui, view: &ViewModel, colors: &ColorMap) {
    ui.add_space(12.0);
    ui.heading("Warming Rate Ranking");

    if view.ranking.is_empty() {
        ui.label("No country has two or more temperature readings in this window.");
        return;
    }

    let selected = view.selection.countries();

    TableBuilder::new(ui)
        .id_salt("ranking_table")
        .striped(true)
        .max_scroll_height(300.0)
        .column(Column::exact(40.0))
        .column(Column::initial(220.0).resizable(true))
        .column(Column::initial(140.0))
        .column(Column::remainder())
        .header(ROW_HEIGHT + 4.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            header.col(|ui| {
                ui.strong("Country");
            });
            header.col(|ui| {
                ui.strong("°C / year");
            });
            header.col(|ui| {
                ui.strong("Year steps");
            });
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, view.ranking.len(), |mut row| {
                let rank = row.index();
                let entry = &view.ranking[rank];
                let mut name = RichText::new(entry.country.as_str());
                if view.filters.countries.contains(&entry.country) {
                    name = name.strong();
                }
                if selected.contains(&entry.country) {
                    name = name.color(colors.color_for(&entry.country));
                }

                row.col(|ui| {
                    ui.label((rank + 1).to_string());
                });
                row.col(|ui| {
                    ui.label(name);
                });
                row.col(|ui| {
                    ui.label(format!("{:+.4}", entry.score));
                });
                row.col(|ui| {
                    ui.label(entry.deltas.to_string());
                });
            });
        });
}

use eframe::egui::{Align2, Color32, RichText, ScrollArea, Ui};
use egui_plot::{
    BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoint, Points, Text,
};

use crate::analysis::distribution::BoxSummary;
use crate::analysis::view::{Series, ViewModel};
use crate::color::ColorMap;
use crate::state::AppState;
use crate::ui::tables;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render every chart for the cached view in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore the data  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("🌍 Global Temperature & CO₂ Emissions Explorer");
            ui.label(format!(
                "Showing {} countries between {} and {}",
                view.filtered_countries,
                view.filters.window.min,
                view.filters.window.max
            ));

            if let Some(notice) = &view.notice {
                ui.add_space(8.0);
                ui.label(RichText::new(notice.to_string()).color(Color32::YELLOW).strong());
                return;
            }

            // In per-category mode every series is keyed by income group.
            let colors = if view.selection.is_per_category() {
                &state.group_colors
            } else {
                &state.country_colors
            };

            temperature_trend(ui, view, colors);
            co2_scatter(ui, view, colors);
            regression(ui, view);
            distributions(ui, view, &state.group_colors);
            group_trends(ui, view, &state.group_colors);
            tables::ranking_table(ui, view, &state.country_colors);
        });
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

fn temperature_trend(ui: &mut Ui, view: &ViewModel, colors: &ColorMap) {
    ui.add_space(12.0);
    ui.heading("📊 Temperature Trend Over Time");

    let title = if view.selection.is_per_category() {
        "Yearly Temperature by Income Group (auto-aggregated)".to_string()
    } else {
        format!(
            "Yearly Temperature by Country (Top {} by warming rate)",
            view.selection.countries().len()
        )
    };
    ui.label(title);

    // Line-end labels replace the legend for individual countries only.
    let label_lines = view.filters.display.show_labels && !view.selection.is_per_category();

    let mut plot = Plot::new("temperature_trend")
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Mean Temperature (°C)");
    if !label_lines {
        plot = plot.legend(Legend::default());
    }

    plot.show(ui, |plot_ui| {
        for series in &view.temperature_series {
            let color = colors.color_for(&series.label);
            plot_ui.line(
                Line::new(series.points.clone())
                    .name(&series.label)
                    .color(color)
                    .width(1.5),
            );

            if label_lines {
                if let Some(&[x, y]) = series.points.last() {
                    plot_ui.text(
                        Text::new(PlotPoint::new(x + 0.2, y), series.label.as_str())
                            .anchor(Align2::LEFT_CENTER)
                            .color(color),
                    );
                }
            }
        }
    });
}

fn co2_scatter(ui: &mut Ui, view: &ViewModel, colors: &ColorMap) {
    ui.add_space(12.0);
    ui.heading("🌡 CO₂ Emissions vs Mean Temperature");

    let mut plot = Plot::new("co2_scatter")
        .height(CHART_HEIGHT)
        .x_axis_label(view.scatter_x_label.as_str())
        .y_axis_label("Mean Temperature (°C)");
    if view.selection.is_per_category() || !view.filters.display.show_labels {
        plot = plot.legend(Legend::default());
    }

    plot.show(ui, |plot_ui| {
        for series in &view.scatter {
            plot_ui.points(
                Points::new(series.points.clone())
                    .name(&series.label)
                    .color(colors.color_for(&series.label))
                    .radius(3.0),
            );
        }
    });
}

fn regression(ui: &mut Ui, view: &ViewModel) {
    ui.add_space(12.0);
    ui.heading("📈 Regression Analysis: CO₂ → Temperature");

    let reg = match &view.regression {
        Ok(reg) => reg,
        Err(e) => {
            ui.label(RichText::new(e.to_string()).color(Color32::YELLOW));
            return;
        }
    };

    let fit = &reg.fit;
    let x_min = reg.observed.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
    let x_max = reg.observed.iter().map(|p| p[0]).fold(f64::NEG_INFINITY, f64::max);

    Plot::new("regression")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("CO₂ Emissions (kt)")
        .y_axis_label("Mean Temperature (°C)")
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(reg.observed.clone())
                    .name("Data")
                    .color(Color32::from_rgba_unmultiplied(100, 150, 250, 128))
                    .radius(2.5),
            );
            plot_ui.line(
                Line::new(vec![[x_min, fit.predict(x_min)], [x_max, fit.predict(x_max)]])
                    .name("Regression Line")
                    .color(Color32::RED)
                    .width(2.0),
            );
        });

    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Regression Coefficient:");
        ui.label(format!("{:.4}", fit.slope));
        ui.separator();
        ui.strong("Intercept:");
        ui.label(format!("{:.4}", fit.intercept));
        if let Some(r2) = fit.r_squared {
            ui.separator();
            ui.strong("R²:");
            ui.label(format!("{r2:.4}"));
        }
        ui.separator();
        ui.label(format!("n = {}", fit.observations));
    });
}

fn distributions(ui: &mut Ui, view: &ViewModel, colors: &ColorMap) {
    ui.add_space(12.0);
    ui.heading("Distribution by Income Group");

    ui.columns(2, |cols| {
        cols[0].strong("CO₂ Emissions by Income Group");
        box_chart(&mut cols[0], "co2_boxes", "CO₂ Emissions (kt)", &view.co2_boxes, colors);
        cols[1].strong("Mean Temperature by Income Group");
        box_chart(
            &mut cols[1],
            "temperature_boxes",
            "Mean Temperature (°C)",
            &view.temperature_boxes,
            colors,
        );
    });
}

fn box_chart(ui: &mut Ui, id: &str, y_label: &str, boxes: &[BoxSummary], colors: &ColorMap) {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label(y_label)
        .show_x(false)
        .show(ui, |plot_ui| {
            for (i, summary) in boxes.iter().enumerate() {
                let color = colors.color_for(&summary.income_group);
                let x = i as f64;
                let spread = BoxSpread::new(
                    summary.lower_whisker,
                    summary.q1,
                    summary.median,
                    summary.q3,
                    summary.upper_whisker,
                );
                plot_ui.box_plot(
                    BoxPlot::new(vec![
                        BoxElem::new(x, spread)
                            .name(&summary.income_group)
                            .box_width(0.6),
                    ])
                    .name(&summary.income_group)
                    .color(color),
                );
                if !summary.outliers.is_empty() {
                    let outliers: Vec<[f64; 2]> = summary.outliers.iter().map(|&y| [x, y]).collect();
                    plot_ui.points(Points::new(outliers).color(color).radius(2.0));
                }
            }
        });
}

fn group_trends(ui: &mut Ui, view: &ViewModel, colors: &ColorMap) {
    ui.add_space(12.0);
    ui.heading("Income Group Trends");

    ui.columns(2, |cols| {
        cols[0].strong("Average Temperature by Income Group");
        trend_chart(
            &mut cols[0],
            "group_temperature_trend",
            "Mean Temperature (°C)",
            &view.group_temperature_series,
            colors,
        );
        cols[1].strong("Average CO₂ Emissions by Income Group");
        trend_chart(&mut cols[1], "co2_trend", "CO₂ Emissions (kt)", &view.co2_series, colors);
    });
}

fn trend_chart(ui: &mut Ui, id: &str, y_label: &str, series: &[Series], colors: &ColorMap) {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label(y_label)
        .show(ui, |plot_ui| {
            for s in series {
                plot_ui.line(
                    Line::new(s.points.clone())
                        .name(&s.label)
                        .color(colors.color_for(&s.label))
                        .width(1.5),
                );
            }
        });
}

mod analysis;
mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use app::ClimateExplorerApp;
use config::Cli;
use state::AppState;

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    cli.validate()?;

    let mut state = AppState::default();
    match data::loader::load_file(&cli.data) {
        Ok(table) => {
            let filters = cli.initial_filters(&table);
            state.set_table(Arc::new(table), filters);
        }
        // The window can still open another file; the report cannot.
        Err(e) if !cli.report => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
        Err(e) => return Err(e),
    }

    if cli.report {
        let view = state.view.as_ref().context("no view computed")?;
        let json = serde_json::to_string_pretty(view).context("serializing view")?;
        println!("{json}");
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Climate Explorer – Temperature & CO₂",
        options,
        Box::new(|_cc| Ok(Box::new(ClimateExplorerApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

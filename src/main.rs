mod app;
mod chart;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::Result;
use app::BladeLabApp;
use clap::Parser;
use config::{AppConfig, Cli};
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::resolve(&cli)?;
    log::info!("Data source: {}", config.data_source().describe());

    let mut state = AppState::from_config(&config);
    state.refresh();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Blade Lab Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(BladeLabApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the viewer: {e}"))?;
    Ok(())
}

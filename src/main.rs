mod app;
mod color;
mod config;
mod data;
mod pipeline;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::Context;
use app::PulseApp;
use config::AppConfig;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env();
    let store = data::loader::load_dir(&config.data_dir)
        .with_context(|| format!("loading datasets from {}", config.data_dir.display()))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(PulseApp::new(config, Arc::new(store))))),
    )
    .map_err(|e| anyhow::anyhow!("running UI: {e}"))
}

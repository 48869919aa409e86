use std::sync::Arc;

use eframe::egui;

use crate::config::AppConfig;
use crate::data::model::DataStore;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PulseApp {
    pub config: AppConfig,
    pub state: AppState,
}

impl PulseApp {
    pub fn new(config: AppConfig, store: Arc<DataStore>) -> Self {
        let state = AppState::with_store(store, &config.pipeline);
        Self { config, state }
    }
}

impl eframe::App for PulseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, &self.config);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, &self.config);
            });

        // ---- Bottom panel: impact summary ----
        egui::TopBottomPanel::bottom("impact_summary")
            .resizable(true)
            .show(ctx, |ui| {
                panels::summary_panel(ui, &self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::failure_plot(ui, &self.state);
        });
    }
}

use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::config::AppConfig;
use crate::data::filter::{AnomalyMethod, ForecastOverlay};
use crate::pipeline::chart::LayerRole;
use crate::pipeline::summary::SUMMARY_HEADING;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel. Widgets edit a copy of the filter state,
/// which replaces the current one if anything changed.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, config: &AppConfig) {
    ui.heading("Filters");
    ui.separator();

    let (Some(current), Some(store)) = (state.filters, state.store.clone()) else {
        ui.label("No dataset loaded.");
        return;
    };
    let mut next = current;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Forecast overlay ----
            ui.strong("Select Forecast Overlay:");
            egui::ComboBox::from_id_salt("forecast_overlay")
                .selected_text(next.forecast_overlay.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for choice in ForecastOverlay::ALL {
                        ui.selectable_value(&mut next.forecast_overlay, choice, choice.to_string());
                    }
                });
            ui.add_space(8.0);

            // ---- Anomaly method ----
            ui.strong("Anomaly Detection Method:");
            for method in AnomalyMethod::ALL {
                ui.radio_value(&mut next.anomaly_method, method, method.to_string());
            }
            ui.add_space(8.0);

            // ---- Spike simulation ----
            ui.strong("Simulate Black Friday Spike:");
            ui.checkbox(&mut next.spike_enabled, config.pipeline.spike.label());
            ui.add_space(8.0);

            // ---- Date range ----
            ui.strong("Select Date Range:");
            egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("From");
                ui.add(DatePickerButton::new(&mut next.start_date).id_salt("start_date"));
                ui.end_row();
                ui.label("To");
                ui.add(DatePickerButton::new(&mut next.end_date).id_salt("end_date"));
                ui.end_row();
            });
            if ui.small_button("Full range").clicked() {
                (next.start_date, next.end_date) = store.date_bounds();
            }
            if next.start_date > next.end_date {
                ui.label(RichText::new("Start is after end: nothing selected.").color(Color32::RED));
            }
        });

    if state.apply_filters(next, &config.pipeline) {
        log::debug!("filters changed: {next:?}");
    }
}

// ---------------------------------------------------------------------------
// Bottom panel – impact summary
// ---------------------------------------------------------------------------

pub fn summary_panel(ui: &mut Ui, state: &AppState) {
    let Some(output) = &state.output else {
        return;
    };
    ui.add_space(4.0);
    ui.heading(SUMMARY_HEADING);
    for line in output.summary.lines() {
        ui.label(format!("• {line}"));
    }
    ui.add_space(4.0);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, config: &AppConfig) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state, config);
                ui.close_menu();
            }
            let can_export = state.output.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export view as JSON…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(store), Some(output)) = (&state.store, &state.output) {
            ui.label(format!(
                "{} days loaded, {} selected",
                store.observed().len(),
                output.summary.total_records
            ));
            if let Some(layer) = output.chart.layer(LayerRole::Anomalies) {
                ui.separator();
                ui.label(format!("{} anomalies flagged", layer.points.len()));
            }
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

pub fn open_folder_dialog(state: &mut AppState, config: &AppConfig) {
    let folder = rfd::FileDialog::new()
        .set_title("Open payment monitoring data folder")
        .set_directory(&config.data_dir)
        .pick_folder();

    if let Some(path) = folder {
        match crate::data::loader::load_dir(&path) {
            Ok(store) => {
                log::info!("Switched data folder to {}", path.display());
                state.set_store(Arc::new(store), &config.pipeline);
            }
            Err(e) => {
                log::error!("Failed to load data folder: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn export_dialog(state: &mut AppState) {
    let Some(output) = &state.output else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export current view")
        .add_filter("JSON", &["json"])
        .set_file_name("payment-pulse-view.json")
        .save_file();

    if let Some(path) = file {
        let result = std::fs::File::create(&path)
            .map_err(anyhow::Error::from)
            .and_then(|f| serde_json::to_writer_pretty(f, output).map_err(anyhow::Error::from));
        match result {
            Ok(()) => {
                log::info!("Exported view to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export view: {e:#}");
                state.status_message = Some(format!("Export error: {e:#}"));
            }
        }
    }
}

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pipeline parameters
// ---------------------------------------------------------------------------

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

/// Fixed window the synthetic demand spike is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpikeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub factor: f64,
}

impl Default for SpikeWindow {
    fn default() -> Self {
        SpikeWindow {
            start: ymd(2025, 1, 25),
            end: ymd(2025, 1, 28),
            factor: 2.5,
        }
    }
}

impl SpikeWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Checkbox label, e.g. "Enable Spike (Jan 25–28)".
    pub fn label(&self) -> String {
        format!(
            "Enable Spike ({}–{})",
            self.start.format("%b %-d"),
            self.end.format("%-d")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactParams {
    /// A day counts as high-failure when `failure_pct` is strictly above this.
    pub threshold: f64,
    /// Missed revenue attributed to each high-failure day.
    pub incident_cost: u64,
}

impl Default for ImpactParams {
    fn default() -> Self {
        ImpactParams {
            threshold: 3.0,
            incident_cost: 5700,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub spike: SpikeWindow,
    pub impact: ImpactParams,
}

// ---------------------------------------------------------------------------
// Application config
// ---------------------------------------------------------------------------

pub const OBSERVED_STEM: &str = "latam_failure_pct";
pub const ANOMALY_STEM: &str = "latam_ml_anomaly";
pub const FORECAST_STEM: &str = "arima_forecast";

/// Built once in `main` and handed by reference to the pipeline and the UI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub title: String,
    pub pipeline: PipelineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from("."),
            title: "LATAM Payment Monitoring".to_string(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Data directory from the first CLI argument, then `PULSE_DATA_DIR`,
    /// then the working directory.
    pub fn from_env() -> Self {
        let data_dir = std::env::args()
            .nth(1)
            .or_else(|| std::env::var("PULSE_DATA_DIR").ok())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        AppConfig {
            data_dir,
            ..AppConfig::default()
        }
    }
}

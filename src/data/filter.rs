use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::model::{DataStore, Dated};

// ---------------------------------------------------------------------------
// Overlay choices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastOverlay {
    None,
    Arima,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyMethod {
    None,
    Ml,
}

impl ForecastOverlay {
    pub const ALL: [ForecastOverlay; 2] = [ForecastOverlay::Arima, ForecastOverlay::None];
}

impl AnomalyMethod {
    pub const ALL: [AnomalyMethod; 2] = [AnomalyMethod::None, AnomalyMethod::Ml];
}

impl fmt::Display for ForecastOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastOverlay::None => write!(f, "None"),
            ForecastOverlay::Arima => write!(f, "ARIMA Forecast"),
        }
    }
}

impl fmt::Display for AnomalyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyMethod::None => write!(f, "None"),
            AnomalyMethod::Ml => write!(f, "ML-Based (Isolation Forest)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter state: the operator's current selection
// ---------------------------------------------------------------------------

/// Replaced wholesale on every interaction; never persisted.
///
/// `start_date > end_date` is allowed and simply selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub forecast_overlay: ForecastOverlay,
    pub anomaly_method: AnomalyMethod,
    pub spike_enabled: bool,
}

impl FilterState {
    /// Full observed range with both overlays on and no spike.
    pub fn from_store(store: &DataStore) -> Self {
        let (start_date, end_date) = store.date_bounds();
        FilterState {
            start_date,
            end_date,
            forecast_overlay: ForecastOverlay::Arima,
            anomaly_method: AnomalyMethod::Ml,
            spike_enabled: false,
        }
    }
}

/// Points with `start ≤ date ≤ end`, in their original order.
/// An inverted range yields an empty vector.
pub fn filter_range<T: Dated + Clone>(series: &[T], start: NaiveDate, end: NaiveDate) -> Vec<T> {
    series
        .iter()
        .filter(|p| {
            let d = p.date();
            start <= d && d <= end
        })
        .cloned()
        .collect()
}

use chrono::NaiveDate;
use serde::Serialize;

use super::SeriesPoint;
use crate::data::filter::{filter_range, AnomalyMethod, ForecastOverlay};
use crate::data::model::{AnomalyPoint, ForecastPoint};

// ---------------------------------------------------------------------------
// Anomaly overlay
// ---------------------------------------------------------------------------

/// Flagged points inside `[start, end]` when the ML method is selected.
/// Flags are precomputed upstream; nothing is detected here.
pub fn select_anomalies(
    anomalies: &[AnomalyPoint],
    method: AnomalyMethod,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<AnomalyPoint> {
    match method {
        AnomalyMethod::None => Vec::new(),
        AnomalyMethod::Ml => filter_range(anomalies, start, end)
            .into_iter()
            .filter(|p| p.is_anomaly)
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Forecast overlay
// ---------------------------------------------------------------------------

/// Upper and lower confidence edges, always carried together so the shaded
/// region is defined by the pair rather than by draw order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub upper: Vec<SeriesPoint>,
    pub lower: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastBand {
    pub central: Vec<SeriesPoint>,
    pub envelope: Envelope,
}

impl ForecastBand {
    fn from_points(points: &[ForecastPoint]) -> Self {
        let project = |f: fn(&ForecastPoint) -> f64| -> Vec<SeriesPoint> {
            points
                .iter()
                .map(|p| SeriesPoint {
                    date: p.date,
                    value: f(p),
                })
                .collect()
        };
        ForecastBand {
            central: project(|p| p.forecast),
            envelope: Envelope {
                upper: project(|p| p.upper),
                lower: project(|p| p.lower),
            },
        }
    }
}

/// Forecast rows inside `[start, end]` split into line and envelope.
///
/// `None` when the overlay is off or no forecast date falls in range.
pub fn select_forecast(
    forecast: &[ForecastPoint],
    overlay: ForecastOverlay,
    start: NaiveDate,
    end: NaiveDate,
) -> Option<ForecastBand> {
    match overlay {
        ForecastOverlay::None => None,
        ForecastOverlay::Arima => {
            let in_range = filter_range(forecast, start, end);
            if in_range.is_empty() {
                log::warn!("forecast overlay selected but no forecast rows in {start}..={end}");
                return None;
            }
            Some(ForecastBand::from_points(&in_range))
        }
    }
}

use chrono::NaiveDate;
use serde::Serialize;

use super::overlay::ForecastBand;
use super::SeriesPoint;
use crate::color::{self, Rgba};
use crate::data::model::{AnomalyPoint, ObservedPoint};

pub const CHART_TITLE: &str = "LATAM Payment Failures with Forecast & Anomalies";

// ---------------------------------------------------------------------------
// Declarative chart description
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerRole {
    Observed,
    Anomalies,
    Forecast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dash {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    Circle,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub shape: MarkerShape,
    pub size: f32,
}

/// How a layer is stroked. `line_width == 0` means markers only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayerStyle {
    pub color: Rgba,
    pub line_width: f32,
    pub dash: Dash,
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    pub role: LayerRole,
    pub style: LayerStyle,
    pub points: Vec<SeriesPoint>,
}

/// Shaded confidence region between the two envelope edges. The edges are
/// not stroked; only the fill is drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandLayer {
    pub name: String,
    pub fill: Rgba,
    pub upper: Vec<SeriesPoint>,
    pub lower: Vec<SeriesPoint>,
}

/// One tooltip for all layers, keyed by the hovered date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tooltip {
    UnifiedByDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub tooltip: Tooltip,
    /// Drawn in order, after the band.
    pub layers: Vec<Layer>,
    pub band: Option<BandLayer>,
}

impl ChartSpec {
    pub fn layer(&self, role: LayerRole) -> Option<&Layer> {
        self.layers.iter().find(|l| l.role == role)
    }

    /// Every value shown at `date`, one row per layer that has a point there.
    pub fn tooltip_rows(&self, date: NaiveDate) -> Vec<(String, f64)> {
        let at = |points: &[SeriesPoint]| points.iter().find(|p| p.date == date).map(|p| p.value);

        let mut rows: Vec<(String, f64)> = self
            .layers
            .iter()
            .filter_map(|l| at(&l.points).map(|v| (l.name.clone(), v)))
            .collect();
        if let Some(band) = &self.band {
            if let Some(v) = at(&band.upper) {
                rows.push((format!("{} upper", band.name), v));
            }
            if let Some(v) = at(&band.lower) {
                rows.push((format!("{} lower", band.name), v));
            }
        }
        rows
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

fn observed_style() -> LayerStyle {
    LayerStyle {
        color: color::OBSERVED,
        line_width: 1.5,
        dash: Dash::Solid,
        marker: Some(Marker {
            shape: MarkerShape::Circle,
            size: 3.0,
        }),
    }
}

fn anomaly_style() -> LayerStyle {
    LayerStyle {
        color: color::ANOMALY,
        line_width: 0.0,
        dash: Dash::Solid,
        marker: Some(Marker {
            shape: MarkerShape::Cross,
            size: 10.0,
        }),
    }
}

fn forecast_style() -> LayerStyle {
    LayerStyle {
        color: color::FORECAST,
        line_width: 1.5,
        dash: Dash::Dashed,
        marker: None,
    }
}

/// Compose already-selected data into named layers. No values are changed.
pub fn build_chart(
    observed: &[ObservedPoint],
    anomalies: &[AnomalyPoint],
    forecast: Option<&ForecastBand>,
    show_anomalies: bool,
) -> ChartSpec {
    let mut layers = vec![Layer {
        name: "Failure %".to_string(),
        role: LayerRole::Observed,
        style: observed_style(),
        points: observed
            .iter()
            .map(|p| SeriesPoint {
                date: p.date,
                value: p.failure_pct,
            })
            .collect(),
    }];

    if show_anomalies {
        layers.push(Layer {
            name: "ML Anomalies".to_string(),
            role: LayerRole::Anomalies,
            style: anomaly_style(),
            points: anomalies
                .iter()
                .map(|p| SeriesPoint {
                    date: p.date,
                    value: p.failure_pct,
                })
                .collect(),
        });
    }

    let mut band = None;
    if let Some(fc) = forecast {
        layers.push(Layer {
            name: "ARIMA Forecast".to_string(),
            role: LayerRole::Forecast,
            style: forecast_style(),
            points: fc.central.clone(),
        });
        band = Some(BandLayer {
            name: "Forecast CI".to_string(),
            fill: color::band_fill(),
            upper: fc.envelope.upper.clone(),
            lower: fc.envelope.lower.clone(),
        });
    }

    ChartSpec {
        title: CHART_TITLE.to_string(),
        x_axis_title: "Date".to_string(),
        y_axis_title: "Failure %".to_string(),
        tooltip: Tooltip::UnifiedByDate,
        layers,
        band,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::overlay::Envelope;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn pt(d: u32, value: f64) -> SeriesPoint {
        SeriesPoint { date: day(d), value }
    }

    fn observed() -> Vec<ObservedPoint> {
        (1..=3)
            .map(|d| ObservedPoint {
                date: day(d),
                failure_pct: d as f64,
            })
            .collect()
    }

    fn band() -> ForecastBand {
        ForecastBand {
            central: vec![pt(2, 2.0), pt(3, 2.5)],
            envelope: Envelope {
                upper: vec![pt(2, 3.0), pt(3, 3.5)],
                lower: vec![pt(2, 1.0), pt(3, 1.5)],
            },
        }
    }

    #[test]
    fn observed_only_chart_has_one_layer() {
        let chart = build_chart(&observed(), &[], None, false);
        assert_eq!(chart.layers.len(), 1);
        assert!(chart.band.is_none());
        let obs = chart.layer(LayerRole::Observed).unwrap();
        assert_eq!(obs.points, vec![pt(1, 1.0), pt(2, 2.0), pt(3, 3.0)]);
        assert_eq!(obs.style.color, color::OBSERVED);
        assert_eq!(chart.x_axis_title, "Date");
        assert_eq!(chart.y_axis_title, "Failure %");
    }

    #[test]
    fn anomaly_layer_uses_cross_markers() {
        let flagged = [AnomalyPoint {
            date: day(2),
            failure_pct: 7.0,
            is_anomaly: true,
        }];
        let chart = build_chart(&observed(), &flagged, None, true);
        let layer = chart.layer(LayerRole::Anomalies).unwrap();
        assert_eq!(layer.points, vec![pt(2, 7.0)]);
        assert_eq!(layer.style.line_width, 0.0);
        assert_eq!(layer.style.marker.map(|m| m.shape), Some(MarkerShape::Cross));
    }

    #[test]
    fn forecast_becomes_dashed_line_plus_band() {
        let fc = band();
        let chart = build_chart(&observed(), &[], Some(&fc), false);
        let line = chart.layer(LayerRole::Forecast).unwrap();
        assert_eq!(line.style.dash, Dash::Dashed);
        assert_eq!(line.points, fc.central);

        let shaded = chart.band.as_ref().unwrap();
        assert_eq!(shaded.upper, fc.envelope.upper);
        assert_eq!(shaded.lower, fc.envelope.lower);
        assert!(shaded.fill.a < 1.0);
    }

    #[test]
    fn tooltip_lists_every_layer_at_a_date() {
        let chart = build_chart(&observed(), &[], Some(&band()), false);
        let rows = chart.tooltip_rows(day(2));
        let names: Vec<&str> = rows.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["Failure %", "ARIMA Forecast", "Forecast CI upper", "Forecast CI lower"]
        );
        assert_eq!(chart.tooltip_rows(day(1)), vec![("Failure %".to_string(), 1.0)]);
        assert!(chart.tooltip_rows(day(30)).is_empty());
    }

    #[test]
    fn chart_serializes_roles_in_snake_case() {
        let chart = build_chart(&observed(), &[], Some(&band()), true);
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["tooltip"], "unified_by_date");
        assert_eq!(json["layers"][2]["role"], "forecast");
        assert_eq!(json["layers"][0]["points"][0]["date"], "2025-01-01");
    }
}

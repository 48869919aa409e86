//! Transform pipeline: filter state + data store → chart and summary.
//!
//! ```text
//!   DataStore (immutable)      FilterState
//!        │                          │
//!        ▼                          ▼
//!   ┌─────────────┐  range   ┌─────────────┐
//!   │ filter_range│◄─────────│ start..=end │
//!   └─────────────┘          └─────────────┘
//!        │ observed                 │ toggles
//!        ▼                          │
//!   ┌─────────────┐                 │
//!   │    spike    │◄────────────────┤
//!   └─────────────┘                 │
//!        │            ┌─────────────┴──┐
//!        │            │ overlay        │ anomalies, forecast band
//!        ▼            ▼                │
//!   ┌─────────────┐  ┌─────────────┐   │
//!   │   summary   │  │    chart    │◄──┘
//!   └─────────────┘  └─────────────┘
//! ```
//!
//! Every run starts from the untouched store, so nothing carries over
//! between runs.

pub mod chart;
pub mod overlay;
pub mod spike;
pub mod summary;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::data::filter::{filter_range, AnomalyMethod, FilterState};
use crate::data::model::DataStore;
use chart::ChartSpec;
use summary::ImpactSummary;

/// A single value on the date axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub filter: FilterState,
    pub chart: ChartSpec,
    pub summary: ImpactSummary,
}

/// Recompute the chart and summary for one filter state.
pub fn run(store: &DataStore, filter: &FilterState, config: &PipelineConfig) -> PipelineOutput {
    let (start, end) = (filter.start_date, filter.end_date);

    let observed = filter_range(store.observed(), start, end);
    let observed = spike::apply_spike(&observed, filter.spike_enabled, &config.spike);

    let anomalies = overlay::select_anomalies(store.anomalies(), filter.anomaly_method, start, end);
    let forecast = overlay::select_forecast(store.forecast(), filter.forecast_overlay, start, end);

    let chart = chart::build_chart(
        &observed,
        &anomalies,
        forecast.as_ref(),
        filter.anomaly_method == AnomalyMethod::Ml,
    );
    let summary = summary::summarize(&observed, start, end, &config.impact, filter.spike_enabled);

    log::debug!(
        "pipeline run {start}..={end} spike={} -> n={} k={}",
        filter.spike_enabled,
        summary.total_records,
        summary.high_failure_days
    );

    PipelineOutput {
        filter: *filter,
        chart,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::chart::LayerRole;
    use super::summary::{ROOT_CAUSE_PLACEHOLDER, ROOT_CAUSE_SPIKE};
    use super::*;
    use crate::data::filter::ForecastOverlay;
    use crate::data::model::{AnomalyPoint, ForecastPoint, ObservedPoint};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    /// January 2025 at a flat 2.0%, one flagged anomaly on the 5th and one on
    /// the 20th, forecast for the last ten days.
    fn store() -> DataStore {
        let observed = (1..=31)
            .map(|d| ObservedPoint {
                date: day(d),
                failure_pct: 2.0,
            })
            .collect();
        let anomalies = vec![
            AnomalyPoint {
                date: day(5),
                failure_pct: 4.5,
                is_anomaly: true,
            },
            AnomalyPoint {
                date: day(6),
                failure_pct: 2.0,
                is_anomaly: false,
            },
            AnomalyPoint {
                date: day(20),
                failure_pct: 4.8,
                is_anomaly: true,
            },
        ];
        let forecast = (22..=31)
            .map(|d| ForecastPoint {
                date: day(d),
                forecast: 2.1,
                upper: 2.8,
                lower: 1.4,
            })
            .collect();
        DataStore::new(observed, anomalies, forecast).unwrap()
    }

    fn filter(start: u32, end: u32, spike: bool) -> FilterState {
        FilterState {
            start_date: day(start),
            end_date: day(end),
            forecast_overlay: ForecastOverlay::None,
            anomaly_method: AnomalyMethod::None,
            spike_enabled: spike,
        }
    }

    #[test]
    fn full_month_without_spike_has_no_impact() {
        let out = run(&store(), &filter(1, 31, false), &PipelineConfig::default());
        let s = &out.summary;
        assert_eq!(s.total_records, 31);
        assert_eq!(s.high_failure_days, 0);
        assert_eq!(s.high_failure_pct, 0.0);
        assert_eq!(s.missed_revenue, 0);
        assert_eq!(s.root_cause, ROOT_CAUSE_PLACEHOLDER);
    }

    #[test]
    fn spike_pushes_window_days_over_threshold() {
        let out = run(&store(), &filter(1, 31, true), &PipelineConfig::default());
        let s = &out.summary;
        assert_eq!(s.high_failure_days, 4);
        assert!((s.high_failure_pct - 12.903).abs() < 1e-3);
        assert_eq!(s.missed_revenue, 22_800);
        assert_eq!(s.root_cause, ROOT_CAUSE_SPIKE);

        let observed = out.chart.layer(LayerRole::Observed).unwrap();
        let spiked: Vec<_> = observed.points.iter().filter(|p| p.value == 5.0).map(|p| p.date).collect();
        assert_eq!(spiked, vec![day(25), day(26), day(27), day(28)]);
    }

    #[test]
    fn spike_outside_selected_range_has_no_effect() {
        let cfg = PipelineConfig::default();
        let plain = run(&store(), &filter(10, 12, false), &cfg);
        let spiked = run(&store(), &filter(10, 12, true), &cfg);
        assert_eq!(plain.chart, spiked.chart);
        assert_eq!(plain.summary.total_records, 3);
        assert_eq!(plain.summary.high_failure_days, spiked.summary.high_failure_days);
        assert_eq!(plain.summary.missed_revenue, spiked.summary.missed_revenue);
    }

    #[test]
    fn only_in_range_flagged_anomalies_are_overlaid() {
        let mut f = filter(1, 10, false);
        f.anomaly_method = AnomalyMethod::Ml;
        let out = run(&store(), &f, &PipelineConfig::default());
        let layer = out.chart.layer(LayerRole::Anomalies).unwrap();
        assert_eq!(layer.points, vec![SeriesPoint { date: day(5), value: 4.5 }]);
    }

    #[test]
    fn overlays_off_leave_only_observed_layer() {
        let out = run(&store(), &filter(1, 31, false), &PipelineConfig::default());
        assert_eq!(out.chart.layers.len(), 1);
        assert!(out.chart.layer(LayerRole::Anomalies).is_none());
        assert!(out.chart.band.is_none());
    }

    #[test]
    fn forecast_overlay_is_clipped_to_range() {
        let mut f = filter(25, 31, false);
        f.forecast_overlay = ForecastOverlay::Arima;
        let out = run(&store(), &f, &PipelineConfig::default());
        let line = out.chart.layer(LayerRole::Forecast).unwrap();
        assert_eq!(line.points.len(), 7);
        assert_eq!(out.chart.band.as_ref().unwrap().upper.len(), 7);
    }

    #[test]
    fn inverted_range_is_an_empty_selection() {
        let mut f = filter(20, 3, true);
        f.anomaly_method = AnomalyMethod::Ml;
        f.forecast_overlay = ForecastOverlay::Arima;
        let out = run(&store(), &f, &PipelineConfig::default());
        assert_eq!(out.summary.total_records, 0);
        assert_eq!(out.summary.high_failure_pct, 0.0);
        assert!(out.chart.layer(LayerRole::Observed).unwrap().points.is_empty());
        assert!(out.chart.layer(LayerRole::Anomalies).unwrap().points.is_empty());
        assert!(out.chart.band.is_none());
    }

    #[test]
    fn runs_are_independent() {
        let store = store();
        let cfg = PipelineConfig::default();
        let f = filter(1, 31, true);
        let first = run(&store, &f, &cfg);
        let second = run(&store, &f, &cfg);
        assert_eq!(first, second);
        assert!(store.observed().iter().all(|p| p.failure_pct == 2.0));
    }
}

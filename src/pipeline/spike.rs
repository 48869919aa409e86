use crate::config::SpikeWindow;
use crate::data::model::ObservedPoint;

/// Multiply `failure_pct` by the window's factor for every point inside it.
///
/// Always returns a fresh copy, so repeated runs never compound.
pub fn apply_spike(series: &[ObservedPoint], enabled: bool, window: &SpikeWindow) -> Vec<ObservedPoint> {
    if !enabled {
        return series.to_vec();
    }
    series
        .iter()
        .map(|p| {
            if window.contains(p.date) {
                ObservedPoint {
                    failure_pct: p.failure_pct * window.factor,
                    ..*p
                }
            } else {
                *p
            }
        })
        .collect()
}

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::ImpactParams;
use crate::data::model::ObservedPoint;

pub const SUMMARY_HEADING: &str = "User & Business Impact Summary (Simulated)";

/// Static attribution text. It is not derived from the data.
pub const ROOT_CAUSE_PLACEHOLDER: &str = "Root cause: Deployment A41 + Gateway v3-latam-02 (injected)";
pub const ROOT_CAUSE_SPIKE: &str = "Spike simulated due to Black Friday";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub threshold: f64,
    pub total_records: usize,
    pub high_failure_days: usize,
    /// `high_failure_days / total_records * 100`, or 0 for an empty selection.
    pub high_failure_pct: f64,
    pub missed_revenue: u64,
    pub root_cause: String,
}

pub fn summarize(
    series: &[ObservedPoint],
    start_date: NaiveDate,
    end_date: NaiveDate,
    params: &ImpactParams,
    spike_enabled: bool,
) -> ImpactSummary {
    let total_records = series.len();
    let high_failure_days = series
        .iter()
        .filter(|p| p.failure_pct > params.threshold)
        .count();
    let high_failure_pct = if total_records == 0 {
        0.0
    } else {
        high_failure_days as f64 / total_records as f64 * 100.0
    };
    let root_cause = if spike_enabled {
        ROOT_CAUSE_SPIKE
    } else {
        ROOT_CAUSE_PLACEHOLDER
    };

    ImpactSummary {
        start_date,
        end_date,
        threshold: params.threshold,
        total_records,
        high_failure_days,
        high_failure_pct,
        missed_revenue: high_failure_days as u64 * params.incident_cost,
        root_cause: root_cause.to_string(),
    }
}

impl ImpactSummary {
    /// Bullet lines in display order, below [`SUMMARY_HEADING`].
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Date Range: {} to {}", self.start_date, self.end_date),
            format!("Total Records: {}", self.total_records),
            format!(
                "High Failure Days (>{}%): {} ({:.1}%)",
                self.threshold, self.high_failure_days, self.high_failure_pct
            ),
            format!(
                "Simulated Missed Revenue: ${}",
                thousands(self.missed_revenue)
            ),
            self.root_cause.clone(),
        ]
    }
}

/// `22800` → `"22,800"`.
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn series(values: &[f64]) -> Vec<ObservedPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| ObservedPoint {
                date: day(i as u32 + 1),
                failure_pct: v,
            })
            .collect()
    }

    #[test]
    fn empty_selection_reports_zeroes() {
        let s = summarize(&[], day(10), day(5), &ImpactParams::default(), false);
        assert_eq!(s.total_records, 0);
        assert_eq!(s.high_failure_days, 0);
        assert_eq!(s.high_failure_pct, 0.0);
        assert_eq!(s.missed_revenue, 0);
    }

    #[test]
    fn threshold_is_strict() {
        let s = summarize(&series(&[3.0, 3.01, 2.9, 10.0]), day(1), day(4), &ImpactParams::default(), false);
        assert_eq!(s.high_failure_days, 2);
        assert_eq!(s.high_failure_pct, 50.0);
        assert_eq!(s.missed_revenue, 11_400);
    }

    #[test]
    fn narrative_follows_spike_flag() {
        let data = series(&[1.0]);
        let params = ImpactParams::default();
        assert_eq!(summarize(&data, day(1), day(1), &params, false).root_cause, ROOT_CAUSE_PLACEHOLDER);
        assert_eq!(summarize(&data, day(1), day(1), &params, true).root_cause, ROOT_CAUSE_SPIKE);
    }

    #[test]
    fn lines_render_counts_and_currency() {
        let mut values = vec![2.0; 31];
        for v in &mut values[24..28] {
            *v = 5.0;
        }
        let s = summarize(&series(&values), day(1), day(31), &ImpactParams::default(), true);
        assert_eq!(
            s.lines(),
            vec![
                "Date Range: 2025-01-01 to 2025-01-31".to_string(),
                "Total Records: 31".to_string(),
                "High Failure Days (>3%): 4 (12.9%)".to_string(),
                "Simulated Missed Revenue: $22,800".to_string(),
                ROOT_CAUSE_SPIKE.to_string(),
            ]
        );
    }

    #[test]
    fn thousands_separator() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }
}

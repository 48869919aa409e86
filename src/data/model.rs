use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Dated – anything that sits on the shared date axis
// ---------------------------------------------------------------------------

/// A record keyed by calendar date.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

// ---------------------------------------------------------------------------
// Rows of the three source tables
// ---------------------------------------------------------------------------

/// One day of the observed failure-rate series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedPoint {
    #[serde(deserialize_with = "iso_date")]
    pub date: NaiveDate,
    pub failure_pct: f64,
}

/// One day of the anomaly table, flagged upstream by the detection job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyPoint {
    #[serde(deserialize_with = "iso_date")]
    pub date: NaiveDate,
    pub failure_pct: f64,
    #[serde(alias = "ml_anomaly", deserialize_with = "loose_bool")]
    pub is_anomaly: bool,
}

/// One day of the forecast table: central value plus confidence envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(deserialize_with = "iso_date")]
    pub date: NaiveDate,
    pub forecast: f64,
    pub upper: f64,
    pub lower: f64,
}

impl ForecastPoint {
    /// `lower ≤ forecast ≤ upper`.
    pub fn is_well_formed(&self) -> bool {
        self.lower <= self.forecast && self.forecast <= self.upper
    }
}

impl Dated for ObservedPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for AnomalyPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for ForecastPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

// -- Lenient cell parsing shared by the CSV and JSON loaders --

/// Accepts `YYYY-MM-DD`, optionally followed by a time component
/// (`2025-01-01 00:00:00`, `2025-01-01T00:00:00`), which is dropped.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let day = s.get(..10).unwrap_or(s);
    let rest = s.get(10..).unwrap_or("");
    if !(rest.is_empty() || rest.starts_with(' ') || rest.starts_with('T')) {
        return None;
    }
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn iso_date<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
    let s = String::deserialize(d)?;
    parse_iso_date(&s).ok_or_else(|| serde::de::Error::custom(format!("'{s}' is not an ISO date")))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolCell {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn loose_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    match BoolCell::deserialize(d)? {
        BoolCell::Bool(b) => Ok(b),
        BoolCell::Int(0) => Ok(false),
        BoolCell::Int(1) => Ok(true),
        BoolCell::Int(i) => Err(serde::de::Error::custom(format!("{i} is not a boolean"))),
        BoolCell::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(serde::de::Error::custom(format!("'{s}' is not a boolean"))),
        },
    }
}

// ---------------------------------------------------------------------------
// DataStore – the three immutable tables
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("observed series is empty")]
    EmptyObserved,
    #[error("observed series not strictly increasing at row {row}: {date} follows {previous}")]
    UnorderedObserved {
        row: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },
    #[error("forecast envelope inverted on {date}: lower {lower}, forecast {forecast}, upper {upper}")]
    InvertedEnvelope {
        date: NaiveDate,
        lower: f64,
        forecast: f64,
        upper: f64,
    },
}

/// Loaded once at startup and never mutated afterwards; share it behind an
/// `Arc` between sessions.
#[derive(Debug, Clone)]
pub struct DataStore {
    observed: Vec<ObservedPoint>,
    anomalies: Vec<AnomalyPoint>,
    forecast: Vec<ForecastPoint>,
}

impl DataStore {
    /// Validate and freeze the three tables.
    pub fn new(
        observed: Vec<ObservedPoint>,
        anomalies: Vec<AnomalyPoint>,
        forecast: Vec<ForecastPoint>,
    ) -> Result<Self, DataError> {
        if observed.is_empty() {
            return Err(DataError::EmptyObserved);
        }
        for (row, pair) in observed.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(DataError::UnorderedObserved {
                    row: row + 1,
                    previous: pair[0].date,
                    date: pair[1].date,
                });
            }
        }
        if let Some(bad) = forecast.iter().find(|p| !p.is_well_formed()) {
            return Err(DataError::InvertedEnvelope {
                date: bad.date,
                lower: bad.lower,
                forecast: bad.forecast,
                upper: bad.upper,
            });
        }
        Ok(DataStore {
            observed,
            anomalies,
            forecast,
        })
    }

    pub fn observed(&self) -> &[ObservedPoint] {
        &self.observed
    }

    pub fn anomalies(&self) -> &[AnomalyPoint] {
        &self.anomalies
    }

    pub fn forecast(&self) -> &[ForecastPoint] {
        &self.forecast
    }

    /// First and last observed date. The observed series is never empty.
    pub fn date_bounds(&self) -> (NaiveDate, NaiveDate) {
        let first = self.observed[0].date;
        let last = self.observed[self.observed.len() - 1].date;
        (first, last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn obs(d: u32, pct: f64) -> ObservedPoint {
        ObservedPoint {
            date: day(d),
            failure_pct: pct,
        }
    }

    #[test]
    fn store_rejects_empty_observed() {
        let err = DataStore::new(vec![], vec![], vec![]).unwrap_err();
        assert_eq!(err, DataError::EmptyObserved);
    }

    #[test]
    fn store_rejects_duplicate_and_unordered_dates() {
        let err = DataStore::new(vec![obs(1, 1.0), obs(1, 2.0)], vec![], vec![]).unwrap_err();
        assert!(matches!(err, DataError::UnorderedObserved { row: 1, .. }));

        let err = DataStore::new(vec![obs(1, 1.0), obs(3, 1.0), obs(2, 1.0)], vec![], vec![])
            .unwrap_err();
        assert!(matches!(err, DataError::UnorderedObserved { row: 2, .. }));
    }

    #[test]
    fn store_rejects_inverted_envelope() {
        let bad = ForecastPoint {
            date: day(5),
            forecast: 2.0,
            upper: 1.5,
            lower: 1.0,
        };
        let err = DataStore::new(vec![obs(1, 1.0)], vec![], vec![bad]).unwrap_err();
        assert!(matches!(err, DataError::InvertedEnvelope { .. }));
        assert!(err.to_string().contains("2025-01-05"));
    }

    #[test]
    fn date_bounds_span_observed_series() {
        let store = DataStore::new(vec![obs(2, 1.0), obs(9, 1.0), obs(20, 1.0)], vec![], vec![])
            .unwrap();
        assert_eq!(store.date_bounds(), (day(2), day(20)));
    }

    #[test]
    fn parses_dates_with_and_without_time() {
        assert_eq!(parse_iso_date("2025-01-07"), Some(day(7)));
        assert_eq!(parse_iso_date("2025-01-07 00:00:00"), Some(day(7)));
        assert_eq!(parse_iso_date("2025-01-07T00:00:00"), Some(day(7)));
        assert_eq!(parse_iso_date("2025-01-07x"), None);
        assert_eq!(parse_iso_date("07/01/2025"), None);
    }

    #[test]
    fn anomaly_flag_accepts_upstream_column_name() {
        let json = r#"{"date": "2025-01-03", "failure_pct": 4.2, "ml_anomaly": true}"#;
        let p: AnomalyPoint = serde_json::from_str(json).unwrap();
        assert!(p.is_anomaly);
        assert_eq!(p.date, day(3));

        let json = r#"{"date": "2025-01-03", "failure_pct": 4.2, "is_anomaly": 0}"#;
        let p: AnomalyPoint = serde_json::from_str(json).unwrap();
        assert!(!p.is_anomaly);
    }
}

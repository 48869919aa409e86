use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, Date32Array, Float64Array};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

#[derive(Serialize)]
struct ObservedRow {
    date: NaiveDate,
    failure_pct: f64,
}

#[derive(Serialize)]
struct AnomalyRow {
    date: NaiveDate,
    failure_pct: f64,
    ml_anomaly: bool,
}

#[derive(Serialize)]
struct ForecastRow {
    date: NaiveDate,
    forecast: f64,
    upper: f64,
    lower: f64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Weekly seasonality around a 2% baseline.
fn baseline(day: usize) -> f64 {
    2.0 + 0.3 * (2.0 * std::f64::consts::PI * day as f64 / 7.0).sin()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV file");
    for row in rows {
        writer.serialize(row).expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");
}

fn write_parquet(path: &Path, columns: Vec<(&str, ArrayRef)>) {
    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, col)| Field::new(*name, col.data_type().clone(), false))
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(schema.clone(), columns.into_iter().map(|(_, c)| c).collect())
        .expect("Failed to create RecordBatch");
    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn date32(dates: impl Iterator<Item = NaiveDate>) -> ArrayRef {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch");
    Arc::new(Date32Array::from(
        dates.map(|d| (d - epoch).num_days() as i32).collect::<Vec<_>>(),
    ))
}

fn f64s(values: impl Iterator<Item = f64>) -> ArrayRef {
    Arc::new(Float64Array::from_iter_values(values))
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let parquet = args.iter().any(|a| a == "--parquet");
    let out_dir = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir).expect("Failed to create output directory");

    let mut rng = SimpleRng::new(42);
    let first = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid start date");
    let n_days = 45;

    // Observed: seasonal baseline + noise, with two injected incidents.
    let incidents = [(8usize, 4.6), (16usize, 3.8)];
    let observed: Vec<ObservedRow> = (0..n_days)
        .map(|i| {
            let noisy = baseline(i) + rng.gauss(0.0, 0.2);
            let failure_pct = incidents
                .iter()
                .find(|(day, _)| *day == i)
                .map(|&(_, pct)| pct)
                .unwrap_or(noisy);
            ObservedRow {
                date: first + Duration::days(i as i64),
                failure_pct: round2(failure_pct.max(0.0)),
            }
        })
        .collect();

    // Anomaly flags: more than two standard deviations above the mean.
    let n = observed.len() as f64;
    let mean = observed.iter().map(|r| r.failure_pct).sum::<f64>() / n;
    let std_dev = (observed
        .iter()
        .map(|r| (r.failure_pct - mean).powi(2))
        .sum::<f64>()
        / n)
        .sqrt();
    let anomalies: Vec<AnomalyRow> = observed
        .iter()
        .map(|r| AnomalyRow {
            date: r.date,
            failure_pct: r.failure_pct,
            ml_anomaly: r.failure_pct > mean + 2.0 * std_dev,
        })
        .collect();

    // Forecast: last 26 days, interval widening with the horizon.
    let forecast_start = 19;
    let forecast: Vec<ForecastRow> = (forecast_start..n_days)
        .map(|i| {
            let centre = baseline(i);
            let half_width = 0.4 + 0.02 * (i - forecast_start) as f64;
            ForecastRow {
                date: first + Duration::days(i as i64),
                forecast: round2(centre),
                upper: round2(centre + half_width),
                lower: round2(centre - half_width),
            }
        })
        .collect();

    if parquet {
        write_parquet(
            &out_dir.join("latam_failure_pct.parquet"),
            vec![
                ("date", date32(observed.iter().map(|r| r.date))),
                ("failure_pct", f64s(observed.iter().map(|r| r.failure_pct))),
            ],
        );
        write_parquet(
            &out_dir.join("latam_ml_anomaly.parquet"),
            vec![
                ("date", date32(anomalies.iter().map(|r| r.date))),
                ("failure_pct", f64s(anomalies.iter().map(|r| r.failure_pct))),
                (
                    "ml_anomaly",
                    Arc::new(BooleanArray::from(
                        anomalies.iter().map(|r| r.ml_anomaly).collect::<Vec<_>>(),
                    )) as ArrayRef,
                ),
            ],
        );
        write_parquet(
            &out_dir.join("arima_forecast.parquet"),
            vec![
                ("date", date32(forecast.iter().map(|r| r.date))),
                ("forecast", f64s(forecast.iter().map(|r| r.forecast))),
                ("upper", f64s(forecast.iter().map(|r| r.upper))),
                ("lower", f64s(forecast.iter().map(|r| r.lower))),
            ],
        );
    } else {
        write_csv(&out_dir.join("latam_failure_pct.csv"), &observed);
        write_csv(&out_dir.join("latam_ml_anomaly.csv"), &anomalies);
        write_csv(&out_dir.join("arima_forecast.csv"), &forecast);
    }

    let flagged = anomalies.iter().filter(|r| r.ml_anomaly).count();
    println!(
        "Wrote {} observed days ({flagged} flagged), {} forecast days as {} to {}",
        observed.len(),
        forecast.len(),
        if parquet { "parquet" } else { "csv" },
        out_dir.display()
    );
}

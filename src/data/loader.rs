use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Date32Array, Float32Array, Float64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::de::DeserializeOwned;

use super::model::{AnomalyPoint, DataStore, ForecastPoint, ObservedPoint, parse_iso_date};
use crate::config::{ANOMALY_STEM, FORECAST_STEM, OBSERVED_STEM};

/// Extensions tried for each table, in order of preference.
const EXTENSIONS: [&str; 4] = ["parquet", "pq", "json", "csv"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the observed, anomaly and forecast tables from `dir`.
///
/// Each table is looked up by stem (`latam_failure_pct`, `latam_ml_anomaly`,
/// `arima_forecast`) with any of the supported extensions:
/// * `.parquet` / `.pq` – flat columns; dates as `Date32` or strings
/// * `.json`            – `[{ "date": "2025-01-01", ... }, ...]`
/// * `.csv`             – header row with the column names
pub fn load_dir(dir: &Path) -> Result<DataStore> {
    let observed: Vec<ObservedPoint> = load_table(dir, OBSERVED_STEM)?;
    let anomalies: Vec<AnomalyPoint> = load_table(dir, ANOMALY_STEM)?;
    let forecast: Vec<ForecastPoint> = load_table(dir, FORECAST_STEM)?;

    let store = DataStore::new(observed, anomalies, forecast)
        .with_context(|| format!("validating datasets in {}", dir.display()))?;
    let (first, last) = store.date_bounds();
    log::info!(
        "Loaded {} observed, {} anomaly, {} forecast rows ({first} to {last})",
        store.observed().len(),
        store.anomalies().len(),
        store.forecast().len()
    );
    Ok(store)
}

/// First existing `<dir>/<stem>.<ext>` in [`EXTENSIONS`] order.
fn resolve(dir: &Path, stem: &str) -> Result<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
        .with_context(|| {
            format!(
                "no '{stem}' table in {} (tried .{})",
                dir.display(),
                EXTENSIONS.join(", .")
            )
        })
}

fn load_table<T: DeserializeOwned + ParquetRow>(dir: &Path, stem: &str) -> Result<Vec<T>> {
    let path = resolve(dir, stem)?;
    log::debug!("reading {}", path.display());
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "parquet" | "pq" => load_parquet(&path),
        "json" => load_json(&path),
        "csv" => load_csv(&path),
        other => bail!("Unsupported file extension: .{other}"),
    };
    rows.with_context(|| format!("loading {}", path.display()))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records',
/// date_format='iso')`.
fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = std::fs::File::open(path).context("opening JSON file")?;
    serde_json::from_reader(BufReader::new(file)).context("parsing JSON records")
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names; extra columns (e.g. a saved index) are
/// ignored.
fn load_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    reader
        .deserialize::<T>()
        .enumerate()
        .map(|(row_no, rec)| rec.with_context(|| format!("CSV row {row_no}")))
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Conversion from one Arrow record batch into typed rows.
pub trait ParquetRow: Sized {
    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>>;
}

fn load_parquet<T: ParquetRow>(path: &Path) -> Result<Vec<T>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        rows.extend(T::from_batch(&batch)?);
    }
    Ok(rows)
}

impl ParquetRow for ObservedPoint {
    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let dates = date_column(batch, "date")?;
        let pct = f64_column(batch, "failure_pct")?;
        Ok(dates
            .into_iter()
            .zip(pct)
            .map(|(date, failure_pct)| ObservedPoint { date, failure_pct })
            .collect())
    }
}

impl ParquetRow for AnomalyPoint {
    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let dates = date_column(batch, "date")?;
        let pct = f64_column(batch, "failure_pct")?;
        let flag_name = if batch.column_by_name("is_anomaly").is_some() {
            "is_anomaly"
        } else {
            "ml_anomaly"
        };
        let flags = bool_column(batch, flag_name)?;
        Ok(dates
            .into_iter()
            .zip(pct)
            .zip(flags)
            .map(|((date, failure_pct), is_anomaly)| AnomalyPoint {
                date,
                failure_pct,
                is_anomaly,
            })
            .collect())
    }
}

impl ParquetRow for ForecastPoint {
    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let dates = date_column(batch, "date")?;
        let forecast = f64_column(batch, "forecast")?;
        let upper = f64_column(batch, "upper")?;
        let lower = f64_column(batch, "lower")?;
        Ok(dates
            .into_iter()
            .zip(forecast)
            .zip(upper.into_iter().zip(lower))
            .map(|((date, forecast), (upper, lower))| ForecastPoint {
                date,
                forecast,
                upper,
                lower,
            })
            .collect())
    }
}

// -- Arrow column helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let col = batch
        .column_by_name(name)
        .with_context(|| format!("Parquet file missing '{name}' column"))?;
    if col.null_count() > 0 {
        bail!("column '{name}' contains {} null values", col.null_count());
    }
    Ok(col)
}

fn f64_column(batch: &RecordBatch, name: &str) -> Result<Vec<f64>> {
    let col = column(batch, name)?;
    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        Ok(arr.values().to_vec())
    } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
        Ok(arr.values().iter().map(|&v| v as f64).collect())
    } else {
        bail!("column '{name}' is {:?}, expected Float64 or Float32", col.data_type())
    }
}

fn bool_column(batch: &RecordBatch, name: &str) -> Result<Vec<bool>> {
    let col = column(batch, name)?;
    let arr = col
        .as_any()
        .downcast_ref::<BooleanArray>()
        .with_context(|| format!("column '{name}' is {:?}, expected Boolean", col.data_type()))?;
    Ok(arr.iter().map(|v| v.unwrap_or(false)).collect())
}

fn date_column(batch: &RecordBatch, name: &str) -> Result<Vec<NaiveDate>> {
    let col = column(batch, name)?;
    match col.data_type() {
        DataType::Date32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Date32Array>()
                .context("expected Date32Array")?;
            (0..arr.len())
                .map(|i| {
                    arr.value_as_date(i)
                        .with_context(|| format!("row {i}: date out of range"))
                })
                .collect()
        }
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            arr.iter()
                .enumerate()
                .map(|(i, s)| parse_date_cell(i, s.unwrap_or("")))
                .collect()
        }
        DataType::LargeUtf8 => col
            .as_string::<i64>()
            .iter()
            .enumerate()
            .map(|(i, s)| parse_date_cell(i, s.unwrap_or("")))
            .collect(),
        other => bail!("column '{name}' is {other:?}, expected Date32 or string"),
    }
}

fn parse_date_cell(row: usize, s: &str) -> Result<NaiveDate> {
    parse_iso_date(s).with_context(|| format!("row {row}: '{s}' is not an ISO date"))
}

//! Data layer: core types, loading, and filtering.
//!
//! Architecture:
//! ```text
//!  latam_failure_pct / latam_ml_anomaly / arima_forecast
//!  (.parquet / .json / .csv)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse tables → DataStore (validated, read-only)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterState, inclusive date-range selection
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;

//! # anofox-signal
//!
//! Signal processing for daily price series.
//!
//! Separates trend, oscillation and noise with a bank of independent
//! estimators (centered moving average, zero-phase Butterworth low/high-pass,
//! Wiener and Kalman smoothing), estimates dominant periodicities from a
//! periodogram, flags residual anomalies against the smoothed trend and
//! produces a short autoregressive forecast.
//!
//! ```
//! use anofox_signal::prelude::*;
//! use chrono::{TimeZone, Utc};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let prices: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 / 5.0).sin()).collect();
//! let series = TimeSeries::daily(start, prices);
//!
//! let report = analyze(&series, &PipelineConfig::default()).unwrap();
//! assert_eq!(report.records().len(), 120);
//! assert_eq!(report.forecast.values.len(), 7);
//! ```

#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod filter;
pub mod models;
pub mod pipeline;
pub mod spectral;
pub mod utils;

pub use error::{Result, SignalError};

pub mod prelude {
    pub use crate::config::{MeasurementVariance, PipelineConfig};
    pub use crate::core::{MissingValuePolicy, SeriesSource, TimeSeries};
    pub use crate::detection::{detect_anomalies, AnomalyReport};
    pub use crate::error::{Result, SignalError};
    pub use crate::filter::{FilterResult, FilterStatus};
    pub use crate::models::autoregressive::{ArForecast, ArModel, ForecastStatus};
    pub use crate::pipeline::{analyze, analyze_source, AnalysisRecord, AnalysisReport};
    pub use crate::spectral::{SpectralPeak, Spectrum};
}

//! Detection utilities for time series analysis.

mod anomaly;

pub use anomaly::{detect_anomalies, AnomalyReport, DEFAULT_ANOMALY_K};

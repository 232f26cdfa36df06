//! Residual-based anomaly detection against a trend baseline.

use crate::error::{Result, SignalError};
use crate::utils::stats::population_std_dev;
use serde::Serialize;

/// Default number of standard deviations for flagging.
pub const DEFAULT_ANOMALY_K: f64 = 3.0;

/// Residuals against a baseline and the points that stand out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    /// `series - baseline`, aligned with the input.
    pub residual: Vec<f64>,
    /// `true` where `|residual| > k * std(residual)`.
    pub mask: Vec<bool>,
    /// Population standard deviation of the residual.
    pub residual_std: f64,
    /// Multiplier `k` used for flagging.
    pub k: f64,
}

impl AnomalyReport {
    /// Absolute residual above which a point is flagged.
    pub fn threshold(&self) -> f64 {
        self.k * self.residual_std
    }

    /// Indices of flagged points in ascending order.
    pub fn anomaly_indices(&self) -> Vec<usize> {
        self.mask
            .iter()
            .enumerate()
            .filter(|(_, &flagged)| flagged)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn anomaly_count(&self) -> usize {
        self.mask.iter().filter(|&&flagged| flagged).count()
    }

    /// Check if a specific index is flagged.
    pub fn is_anomaly(&self, index: usize) -> bool {
        self.mask.get(index).copied().unwrap_or(false)
    }
}

/// Flag points whose residual from `baseline` exceeds `k` standard deviations.
///
/// A residual with zero or non-finite spread flags nothing, and neither does
/// a constant series: any residual there is rounding left by the baseline.
///
/// # Errors
/// `DimensionMismatch` when `series` and `baseline` differ in length.
pub fn detect_anomalies(series: &[f64], baseline: &[f64], k: f64) -> Result<AnomalyReport> {
    if series.len() != baseline.len() {
        return Err(SignalError::DimensionMismatch {
            expected: series.len(),
            got: baseline.len(),
        });
    }

    let residual: Vec<f64> = series.iter().zip(baseline).map(|(y, b)| y - b).collect();
    let residual_std = if residual.is_empty() {
        0.0
    } else {
        population_std_dev(&residual)
    };

    let constant = series.windows(2).all(|w| w[0] == w[1]);
    let mask = if !constant && residual_std > 0.0 && residual_std.is_finite() {
        let threshold = k * residual_std;
        residual.iter().map(|r| r.abs() > threshold).collect()
    } else {
        vec![false; residual.len()]
    };

    Ok(AnomalyReport {
        residual,
        mask,
        residual_std,
        k,
    })
}

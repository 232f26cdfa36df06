//! Autoregressive AR(p) model fitted by least squares.

use crate::error::{Result, SignalError};
use crate::utils::lstsq::lstsq;
use crate::utils::stats::dot;
use serde::Serialize;

/// A fitted AR(p) model without intercept.
///
/// `coefficients[0]` multiplies the most recent value, `coefficients[1]` the
/// one before it, and so on.
#[derive(Debug, Clone, PartialEq)]
pub struct ArModel {
    coefficients: Vec<f64>,
}

impl ArModel {
    /// Fit an AR(`order`) model to `series` by least squares.
    ///
    /// Row `r` of the design matrix holds the `order` values preceding
    /// `series[order + r]`, most recent first. The minimum-norm solution is
    /// returned when lags are collinear.
    ///
    /// # Errors
    /// `InvalidParameter` for a zero order, `InsufficientData` when the series
    /// is not longer than the order, `ComputationError` when the solve fails.
    pub fn fit(series: &[f64], order: usize) -> Result<Self> {
        if order == 0 {
            return Err(SignalError::InvalidParameter(
                "lag order must be positive".to_string(),
            ));
        }
        let n = series.len();
        if n <= order {
            return Err(SignalError::InsufficientData {
                needed: order + 1,
                got: n,
            });
        }

        let design: Vec<Vec<f64>> = (order..n)
            .map(|t| (1..=order).map(|lag| series[t - lag]).collect())
            .collect();
        let target = &series[order..];

        let solution = lstsq(&design, target)?;
        if solution.rank < order {
            tracing::debug!(
                order,
                rank = solution.rank,
                "collinear lags, using minimum-norm coefficients"
            );
        }

        Ok(Self {
            coefficients: solution.coefficients,
        })
    }

    /// Build a model from known coefficients, most recent lag first.
    pub fn from_coefficients(coefficients: Vec<f64>) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(SignalError::InvalidParameter(
                "lag order must be positive".to_string(),
            ));
        }
        Ok(Self { coefficients })
    }

    pub fn order(&self) -> usize {
        self.coefficients.len()
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// One-step prediction from the last `order` values of `history`.
    fn step(&self, history: &[f64]) -> f64 {
        let p = self.order();
        let lags: Vec<f64> = history[history.len() - p..].iter().rev().copied().collect();
        dot(&lags, &self.coefficients)
    }

    /// Iterated multi-step forecast.
    ///
    /// Each prediction is appended to the history before the next one is
    /// computed, so later steps are conditioned on earlier forecasts.
    pub fn forecast(&self, history: &[f64], steps: usize) -> Result<Vec<f64>> {
        let p = self.order();
        if history.len() < p {
            return Err(SignalError::InsufficientData {
                needed: p,
                got: history.len(),
            });
        }

        let mut extended = history[history.len() - p..].to_vec();
        extended.reserve(steps);
        let mut predictions = Vec::with_capacity(steps);
        for _ in 0..steps {
            let next = self.step(&extended);
            predictions.push(next);
            extended.push(next);
        }
        Ok(predictions)
    }
}

/// Whether a forecast came from a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastStatus {
    Fitted,
    /// Last observed value repeated; `reason` is the error that caused it.
    Fallback { reason: String },
}

/// Forecast values plus how they were produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArForecast {
    pub values: Vec<f64>,
    pub status: ForecastStatus,
    /// Fitted coefficients when the model path succeeded.
    pub coefficients: Option<Vec<f64>>,
}

impl ArForecast {
    pub fn is_fallback(&self) -> bool {
        matches!(self.status, ForecastStatus::Fallback { .. })
    }
}

/// Fit and forecast, degrading to a flat forecast instead of failing.
///
/// On any error the forecast is the last observed value repeated `steps`
/// times (NaN for an empty series).
pub fn forecast_with_fallback(series: &[f64], order: usize, steps: usize) -> ArForecast {
    let attempt = ArModel::fit(series, order).and_then(|model| {
        let values = model.forecast(series, steps)?;
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SignalError::ComputationError(
                "forecast diverged to non-finite values".to_string(),
            ));
        }
        Ok((model, values))
    });

    match attempt {
        Ok((model, values)) => ArForecast {
            values,
            status: ForecastStatus::Fitted,
            coefficients: Some(model.coefficients),
        },
        Err(err) => {
            tracing::warn!(order, error = %err, "AR forecast fell back to last value");
            let last = series.last().copied().unwrap_or(f64::NAN);
            ArForecast {
                values: vec![last; steps],
                status: ForecastStatus::Fallback {
                    reason: err.to_string(),
                },
                coefficients: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    /// Pure sinusoid, which satisfies x[t] = 2cos(w) x[t-1] - x[t-2] exactly.
    fn sinusoid(n: usize, period: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * i as f64 / period).sin())
            .collect()
    }

    #[test]
    fn fit_recovers_ar2_coefficients() {
        let period = 12.0;
        let series = sinusoid(60, period);
        let model = ArModel::fit(&series, 2).unwrap();

        assert_eq!(model.order(), 2);
        assert_relative_eq!(
            model.coefficients()[0],
            2.0 * (2.0 * PI / period).cos(),
            epsilon = 1e-8
        );
        assert_relative_eq!(model.coefficients()[1], -1.0, epsilon = 1e-8);
    }

    #[test]
    fn constant_series_forecasts_flat() {
        let series = vec![25.0; 90];
        let model = ArModel::fit(&series, 10).unwrap();

        let sum: f64 = model.coefficients().iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-10);
        for value in model.forecast(&series, 7).unwrap() {
            assert_relative_eq!(value, 25.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn forecast_matches_true_continuation() {
        let period = 12.0;
        let full = sinusoid(72, period);
        let (history, future) = full.split_at(60);

        let model = ArModel::fit(history, 2).unwrap();
        let forecast = model.forecast(history, 12).unwrap();

        for (got, want) in forecast.iter().zip(future) {
            assert_relative_eq!(*got, *want, epsilon = 1e-6);
        }
    }

    #[test]
    fn overspecified_order_still_forecasts_exactly() {
        // Three lags on a two-lag process: the design is rank deficient.
        let full = sinusoid(80, 9.0);
        let (history, future) = full.split_at(70);

        let model = ArModel::fit(history, 3).unwrap();
        let forecast = model.forecast(history, 10).unwrap();

        for (got, want) in forecast.iter().zip(future) {
            assert_relative_eq!(*got, *want, epsilon = 1e-6);
        }
    }

    #[test]
    fn fit_rejects_short_series() {
        let err = ArModel::fit(&[1.0, 2.0, 3.0], 3).unwrap_err();
        assert_eq!(err, SignalError::InsufficientData { needed: 4, got: 3 });

        let err = ArModel::fit(&[1.0, 2.0, 3.0], 0).unwrap_err();
        assert!(matches!(err, SignalError::InvalidParameter(_)));
    }

    #[test]
    fn fit_on_minimum_length_series() {
        // One equation, one unknown: 4 = b * 2.
        let model = ArModel::fit(&[2.0, 4.0], 1).unwrap();
        assert_relative_eq!(model.coefficients()[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn forecast_compounds_previous_predictions() {
        let model = ArModel::from_coefficients(vec![2.0]).unwrap();
        let forecast = model.forecast(&[1.0, 3.0], 3).unwrap();
        assert_eq!(forecast, vec![6.0, 12.0, 24.0]);
    }

    #[test]
    fn forecast_uses_most_recent_lag_first() {
        let model = ArModel::from_coefficients(vec![1.0, 10.0]).unwrap();
        // next = 1.0 * 5 + 10.0 * 3
        let forecast = model.forecast(&[0.0, 3.0, 5.0], 1).unwrap();
        assert_eq!(forecast, vec![35.0]);
    }

    #[test]
    fn forecast_requires_enough_history() {
        let model = ArModel::from_coefficients(vec![0.5, 0.5, 0.5]).unwrap();
        assert!(model.forecast(&[1.0, 2.0], 3).is_err());
        assert!(model.forecast(&[1.0, 2.0, 3.0], 0).unwrap().is_empty());
        assert!(ArModel::from_coefficients(vec![]).is_err());
    }

    #[test]
    fn fallback_repeats_last_value_for_short_series() {
        let result = forecast_with_fallback(&[5.0, 6.0, 7.0], 10, 7);
        assert!(result.is_fallback());
        assert_eq!(result.values, vec![7.0; 7]);
        assert!(result.coefficients.is_none());
        match result.status {
            ForecastStatus::Fallback { reason } => assert!(reason.contains("insufficient data")),
            ForecastStatus::Fitted => panic!("expected fallback"),
        }
    }

    #[test]
    fn fallback_on_non_finite_input() {
        let mut series = sinusoid(40, 10.0);
        series[20] = f64::NAN;
        let result = forecast_with_fallback(&series, 2, 4);
        assert!(result.is_fallback());
        assert_eq!(result.values, vec![*series.last().unwrap(); 4]);
    }

    #[test]
    fn fallback_on_empty_series_is_nan() {
        let result = forecast_with_fallback(&[], 3, 2);
        assert!(result.is_fallback());
        assert_eq!(result.values.len(), 2);
        assert!(result.values.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn fitted_path_reports_coefficients() {
        let series = sinusoid(50, 8.0);
        let result = forecast_with_fallback(&series, 2, 5);
        assert_eq!(result.status, ForecastStatus::Fitted);
        assert_eq!(result.values.len(), 5);
        assert_eq!(result.coefficients.map(|c| c.len()), Some(2));
    }
}

//! Explicit configuration for an analysis run.

use crate::error::{Result, SignalError};
use crate::utils::stats::population_variance;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Floor added to a series-scaled measurement variance.
const MEASUREMENT_VAR_FLOOR: f64 = 1e-6;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Longest supported sampling interval, in milliseconds (100 years).
const MAX_INTERVAL_MILLIS: f64 = 36_500.0 * MILLIS_PER_DAY;

/// How the Kalman measurement variance is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementVariance {
    /// Use this value as is.
    Fixed(f64),
    /// `scale * var(series) + 1e-6`.
    ScaledToSeries(f64),
}

impl MeasurementVariance {
    /// Concrete variance for a given series.
    pub fn resolve(&self, values: &[f64]) -> f64 {
        match *self {
            MeasurementVariance::Fixed(var) => var,
            MeasurementVariance::ScaledToSeries(scale) => {
                let var = population_variance(values);
                let var = if var.is_finite() { var } else { 0.0 };
                var * scale + MEASUREMENT_VAR_FLOOR
            }
        }
    }
}

impl Default for MeasurementVariance {
    fn default() -> Self {
        MeasurementVariance::ScaledToSeries(0.1)
    }
}

/// Every tunable of the analysis pipeline.
///
/// Periods are in days and `sampling_rate` is in samples per day, so the
/// same configuration works for hourly data by setting `sampling_rate` to
/// 24.
///
/// # Example
///
/// ```
/// use anofox_signal::config::PipelineConfig;
///
/// let config = PipelineConfig::default()
///     .with_lowpass_cutoff_days(60.0)
///     .with_forecast_steps(14);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Low-pass cutoff period (trend keeps slower cycles).
    pub lowpass_cutoff_days: f64,
    /// High-pass cutoff period (oscillation keeps faster cycles).
    pub highpass_cutoff_days: f64,
    /// Butterworth filter order.
    pub filter_order: usize,
    /// Moving-average window used for smoothing and spectral detrending.
    pub ma_window: usize,
    /// Wiener neighbourhood size.
    pub wiener_window: usize,
    /// AR lag order.
    pub ar_lags: usize,
    /// Forecast horizon in samples.
    pub forecast_steps: usize,
    /// Anomaly threshold in residual standard deviations.
    pub anomaly_k: f64,
    /// Kalman process noise variance.
    pub kalman_process_var: f64,
    /// Kalman measurement noise variance.
    pub kalman_measurement_var: MeasurementVariance,
    /// Number of dominant periods to report.
    pub top_periods: usize,
    /// Samples per day.
    pub sampling_rate: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lowpass_cutoff_days: 30.0,
            highpass_cutoff_days: 7.0,
            filter_order: 4,
            ma_window: 7,
            wiener_window: 3,
            ar_lags: 10,
            forecast_steps: 7,
            anomaly_k: 3.0,
            kalman_process_var: 1e-2,
            kalman_measurement_var: MeasurementVariance::default(),
            top_periods: 8,
            sampling_rate: 1.0,
        }
    }
}

impl PipelineConfig {
    pub fn with_lowpass_cutoff_days(mut self, days: f64) -> Self {
        self.lowpass_cutoff_days = days;
        self
    }

    pub fn with_highpass_cutoff_days(mut self, days: f64) -> Self {
        self.highpass_cutoff_days = days;
        self
    }

    pub fn with_filter_order(mut self, order: usize) -> Self {
        self.filter_order = order;
        self
    }

    pub fn with_ma_window(mut self, window: usize) -> Self {
        self.ma_window = window;
        self
    }

    pub fn with_wiener_window(mut self, window: usize) -> Self {
        self.wiener_window = window;
        self
    }

    pub fn with_ar_lags(mut self, lags: usize) -> Self {
        self.ar_lags = lags;
        self
    }

    pub fn with_forecast_steps(mut self, steps: usize) -> Self {
        self.forecast_steps = steps;
        self
    }

    pub fn with_anomaly_k(mut self, k: f64) -> Self {
        self.anomaly_k = k;
        self
    }

    pub fn with_kalman_process_var(mut self, var: f64) -> Self {
        self.kalman_process_var = var;
        self
    }

    pub fn with_kalman_measurement_var(mut self, var: MeasurementVariance) -> Self {
        self.kalman_measurement_var = var;
        self
    }

    pub fn with_top_periods(mut self, n: usize) -> Self {
        self.top_periods = n;
        self
    }

    pub fn with_sampling_rate(mut self, samples_per_day: f64) -> Self {
        self.sampling_rate = samples_per_day;
        self
    }

    /// Time between samples implied by `sampling_rate`.
    ///
    /// Clamped to the range [`validate`](Self::validate) accepts, between one
    /// millisecond and one hundred years.
    pub fn sample_interval(&self) -> Duration {
        let millis = (MILLIS_PER_DAY / self.sampling_rate).round();
        let millis = if millis.is_nan() {
            1.0
        } else {
            millis.clamp(1.0, MAX_INTERVAL_MILLIS)
        };
        Duration::milliseconds(millis as i64)
    }

    /// Reject settings no estimator can work with.
    ///
    /// Cutoff periods are not checked here: an out-of-range cutoff is a
    /// degenerate filter input that passes the series through unchanged.
    pub fn validate(&self) -> Result<()> {
        fn invalid(msg: &str) -> Result<()> {
            Err(SignalError::InvalidParameter(msg.to_string()))
        }

        if !(self.sampling_rate.is_finite() && self.sampling_rate > 0.0) {
            return invalid("sampling_rate must be positive and finite");
        }
        let interval_millis = MILLIS_PER_DAY / self.sampling_rate;
        if !(1.0..=MAX_INTERVAL_MILLIS).contains(&interval_millis) {
            return invalid("sampling_rate must give an interval between 1 ms and 100 years");
        }
        if self.filter_order == 0 {
            return invalid("filter_order must be positive");
        }
        if self.ma_window == 0 {
            return invalid("ma_window must be positive");
        }
        if self.wiener_window == 0 {
            return invalid("wiener_window must be positive");
        }
        if self.ar_lags == 0 {
            return invalid("ar_lags must be positive");
        }
        if !(self.anomaly_k.is_finite() && self.anomaly_k >= 0.0) {
            return invalid("anomaly_k must be non-negative and finite");
        }
        if !(self.kalman_process_var.is_finite() && self.kalman_process_var >= 0.0) {
            return invalid("kalman_process_var must be non-negative and finite");
        }
        let measurement = match self.kalman_measurement_var {
            MeasurementVariance::Fixed(v) | MeasurementVariance::ScaledToSeries(v) => v,
        };
        if !(measurement.is_finite() && measurement >= 0.0) {
            return invalid("kalman_measurement_var must be non-negative and finite");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_config_uses_reference_constants() {
        let config = PipelineConfig::default();
        assert_relative_eq!(config.lowpass_cutoff_days, 30.0);
        assert_relative_eq!(config.highpass_cutoff_days, 7.0);
        assert_eq!(config.ma_window, 7);
        assert_eq!(config.ar_lags, 10);
        assert_eq!(config.forecast_steps, 7);
        assert_relative_eq!(config.anomaly_k, 3.0);
        assert_eq!(config.top_periods, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_methods_set_fields() {
        let config = PipelineConfig::default()
            .with_highpass_cutoff_days(5.0)
            .with_filter_order(2)
            .with_ma_window(5)
            .with_wiener_window(5)
            .with_ar_lags(3)
            .with_anomaly_k(2.5)
            .with_kalman_process_var(0.1)
            .with_kalman_measurement_var(MeasurementVariance::Fixed(2.0))
            .with_top_periods(3)
            .with_sampling_rate(24.0);

        assert_relative_eq!(config.highpass_cutoff_days, 5.0);
        assert_eq!(config.filter_order, 2);
        assert_eq!(config.ar_lags, 3);
        assert_eq!(config.kalman_measurement_var, MeasurementVariance::Fixed(2.0));
        assert_eq!(config.sample_interval(), Duration::hours(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unusable_settings() {
        let bad = [
            PipelineConfig::default().with_sampling_rate(0.0),
            PipelineConfig::default().with_sampling_rate(f64::NAN),
            PipelineConfig::default().with_sampling_rate(1e-9),
            PipelineConfig::default().with_sampling_rate(1e9),
            PipelineConfig::default().with_filter_order(0),
            PipelineConfig::default().with_ma_window(0),
            PipelineConfig::default().with_wiener_window(0),
            PipelineConfig::default().with_ar_lags(0),
            PipelineConfig::default().with_anomaly_k(-1.0),
            PipelineConfig::default().with_kalman_process_var(-0.1),
            PipelineConfig::default()
                .with_kalman_measurement_var(MeasurementVariance::ScaledToSeries(f64::INFINITY)),
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(SignalError::InvalidParameter(_))),
                "{:?} should be rejected",
                config
            );
        }
    }

    #[test]
    fn sample_interval_is_clamped_for_unvalidated_rates() {
        let slow = PipelineConfig::default().with_sampling_rate(1e-12);
        assert_eq!(slow.sample_interval(), Duration::days(36_500));

        let fast = PipelineConfig::default().with_sampling_rate(1e12);
        assert_eq!(fast.sample_interval(), Duration::milliseconds(1));
    }

    #[test]
    fn invalid_cutoff_is_not_a_config_error() {
        let config = PipelineConfig::default().with_highpass_cutoff_days(1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn measurement_variance_resolution() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(MeasurementVariance::Fixed(0.7).resolve(&values), 0.7);
        assert_relative_eq!(
            MeasurementVariance::ScaledToSeries(0.1).resolve(&values),
            0.2 + 1e-6,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            MeasurementVariance::ScaledToSeries(0.1).resolve(&[]),
            1e-6,
            epsilon = 1e-15
        );
    }

    #[test]
    fn config_deserializes_with_defaults_for_missing_fields() {
        let json = r#"{ "lowpass_cutoff_days": 45.0, "kalman_measurement_var": { "fixed": 3.0 } }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_relative_eq!(config.lowpass_cutoff_days, 45.0);
        assert_eq!(config.kalman_measurement_var, MeasurementVariance::Fixed(3.0));
        assert_eq!(config.ar_lags, 10);

        let round_trip: PipelineConfig =
            serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(round_trip, config);
    }
}

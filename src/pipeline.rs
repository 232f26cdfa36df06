//! End-to-end analysis of a single price series.
//!
//! The pipeline owns no numerics of its own: it sequences the filter bank,
//! spectral estimator, anomaly detector and AR forecaster, and collects
//! their outputs into an [`AnalysisReport`].

use crate::config::PipelineConfig;
use crate::core::{MissingValuePolicy, SeriesSource, TimeSeries};
use crate::detection::{detect_anomalies, AnomalyReport};
use crate::error::{Result, SignalError};
use crate::filter::{
    butterworth, kalman, moving_average, wiener, ButterworthSpec, Degradation, FilterResult,
};
use crate::models::autoregressive::{forecast_with_fallback, ArForecast};
use crate::spectral::{detrend_and_normalize, periodogram, top_periods, SpectralPeak, Spectrum};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Relative difference below which two sampling rates are the same.
const RATE_TOLERANCE: f64 = 1e-9;

/// Estimators of the filter bank that can degrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Estimator {
    MovingAverage,
    LowPass,
    HighPass,
    Wiener,
    Kalman,
}

impl fmt::Display for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Estimator::MovingAverage => "moving average",
            Estimator::LowPass => "low-pass",
            Estimator::HighPass => "high-pass",
            Estimator::Wiener => "wiener",
            Estimator::Kalman => "kalman",
        };
        f.write_str(name)
    }
}

/// A degradation together with the estimator that reported it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EstimatorDegradation {
    pub estimator: Estimator,
    pub degradation: Degradation,
}

/// One row of the per-timestamp output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub moving_average: f64,
    pub trend_low: f64,
    pub oscillation: f64,
    pub wiener: f64,
    pub kalman: f64,
    pub residual: f64,
    pub anomaly: bool,
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub label: Option<String>,
    /// Samples per day the estimators ran at.
    pub sampling_rate: f64,
    pub timestamps: Vec<DateTime<Utc>>,
    pub prices: Vec<f64>,
    pub moving_average: FilterResult,
    pub trend_low: FilterResult,
    pub oscillation: FilterResult,
    pub wiener: FilterResult,
    pub kalman: FilterResult,
    pub anomalies: AnomalyReport,
    pub spectrum: Spectrum,
    pub top_periods: Vec<SpectralPeak>,
    pub forecast: ArForecast,
    pub forecast_timestamps: Vec<DateTime<Utc>>,
}

impl AnalysisReport {
    /// Number of analysed samples.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Per-timestamp rows, in input order.
    pub fn records(&self) -> Vec<AnalysisRecord> {
        (0..self.len())
            .map(|i| AnalysisRecord {
                timestamp: self.timestamps[i],
                price: self.prices[i],
                moving_average: self.moving_average.values[i],
                trend_low: self.trend_low.values[i],
                oscillation: self.oscillation.values[i],
                wiener: self.wiener.values[i],
                kalman: self.kalman.values[i],
                residual: self.anomalies.residual[i],
                anomaly: self.anomalies.mask[i],
            })
            .collect()
    }

    /// Future timestamps paired with forecast values.
    pub fn forecast_points(&self) -> Vec<(DateTime<Utc>, f64)> {
        self.forecast_timestamps
            .iter()
            .copied()
            .zip(self.forecast.values.iter().copied())
            .collect()
    }

    /// Degradations reported by the filter bank, in estimator order.
    pub fn degradations(&self) -> Vec<EstimatorDegradation> {
        [
            (Estimator::MovingAverage, &self.moving_average),
            (Estimator::LowPass, &self.trend_low),
            (Estimator::HighPass, &self.oscillation),
            (Estimator::Wiener, &self.wiener),
            (Estimator::Kalman, &self.kalman),
        ]
        .into_iter()
        .filter_map(|(estimator, result)| {
            result.degradation().map(|degradation| EstimatorDegradation {
                estimator,
                degradation,
            })
        })
        .collect()
    }

    /// True when no estimator degraded and the forecast was fitted.
    pub fn is_complete(&self) -> bool {
        self.degradations().is_empty() && !self.forecast.is_fallback()
    }
}

/// Run the full analysis on an already regular, NaN-free series.
///
/// Degenerate estimator inputs never abort the run; they show up in
/// [`AnalysisReport::degradations`] and the forecast status instead.
///
/// # Errors
///
/// Returns an error for an invalid configuration, an empty series, or a
/// series that still contains missing values.
pub fn analyze(series: &TimeSeries, config: &PipelineConfig) -> Result<AnalysisReport> {
    config.validate()?;
    if series.is_empty() {
        return Err(SignalError::EmptyData);
    }
    if series.has_missing_values() {
        return Err(SignalError::MissingValues);
    }

    let y = series.values();
    let (interval, fs) = sampling_grid(series, config);
    debug!(
        len = y.len(),
        label = series.label().unwrap_or(""),
        sampling_rate = fs,
        "starting analysis"
    );

    let ma = moving_average(y, config.ma_window);
    let normalized = detrend_and_normalize(y, config.ma_window);
    let spectrum = periodogram(&normalized, fs);
    let peaks = top_periods(&spectrum, config.top_periods);
    debug!(bins = spectrum.len(), peaks = peaks.len(), "spectrum estimated");

    let low_spec =
        ButterworthSpec::low_pass(config.lowpass_cutoff_days).with_order(config.filter_order);
    let high_spec =
        ButterworthSpec::high_pass(config.highpass_cutoff_days).with_order(config.filter_order);
    let trend_low = butterworth(y, &low_spec, fs);
    let oscillation = butterworth(y, &high_spec, fs);
    let smoothed = wiener(y, config.wiener_window);
    let measurement_var = config.kalman_measurement_var.resolve(y);
    let tracked = kalman(y, config.kalman_process_var, measurement_var);
    debug!(measurement_var, "filter bank applied");

    let anomalies = detect_anomalies(y, &trend_low.values, config.anomaly_k)?;
    debug!(count = anomalies.anomaly_count(), "anomalies detected");

    let forecast = forecast_with_fallback(y, config.ar_lags, config.forecast_steps);
    let forecast_timestamps = series.future_timestamps(config.forecast_steps, interval)?;
    debug!(
        steps = forecast.values.len(),
        fallback = forecast.is_fallback(),
        "forecast produced"
    );

    Ok(AnalysisReport {
        label: series.label().map(str::to_string),
        sampling_rate: fs,
        timestamps: series.timestamps().to_vec(),
        prices: y.to_vec(),
        moving_average: ma,
        trend_low,
        oscillation,
        wiener: smoothed,
        kalman: tracked,
        anomalies,
        spectrum,
        top_periods: peaks,
        forecast,
        forecast_timestamps,
    })
}

/// Sampling interval and rate (samples per day) for a series.
///
/// The series' own interval, explicit or inferred, wins over
/// `config.sampling_rate`, which only applies to series without one.
fn sampling_grid(series: &TimeSeries, config: &PipelineConfig) -> (Duration, f64) {
    let Some(interval) = series
        .sampling_interval()
        .filter(|interval| interval.num_milliseconds() > 0)
    else {
        return (config.sample_interval(), config.sampling_rate);
    };

    let fs = MILLIS_PER_DAY / interval.num_milliseconds() as f64;
    if ((fs - config.sampling_rate) / config.sampling_rate).abs() > RATE_TOLERANCE {
        warn!(
            configured = config.sampling_rate,
            observed = fs,
            "series interval overrides configured sampling rate"
        );
    }
    (interval, fs)
}

/// Load a series, clean it the way a market-data loader would, and analyze it.
///
/// Missing values are forward-filled (leading gaps dropped), then the series
/// is put on a regular grid at its sampling interval, falling back to the
/// interval implied by `config.sampling_rate`.
pub fn analyze_source<S>(source: &S, config: &PipelineConfig) -> Result<AnalysisReport>
where
    S: SeriesSource + ?Sized,
{
    let raw = source.load()?;
    let cleaned = raw
        .sanitized(MissingValuePolicy::ForwardFill)
        .sanitized(MissingValuePolicy::Drop);
    if cleaned.is_empty() {
        return Err(SignalError::EmptyData);
    }
    let interval = cleaned
        .sampling_interval()
        .unwrap_or_else(|| config.sample_interval());
    let regular = cleaned.regularize(interval)?;
    debug!(
        raw = raw.len(),
        regular = regular.len(),
        interval_secs = interval.num_seconds(),
        "source prepared"
    );
    analyze(&regular, config)
}

//! TimeSeries data structure for representing sampled price data.

use crate::error::{Result, SignalError};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Policy for handling missing values (NaN/Inf).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissingValuePolicy {
    /// Drop observations with missing values.
    Drop,
    /// Forward fill (use previous valid value).
    ForwardFill,
}

/// A univariate time series with strictly increasing timestamps.
///
/// The analysis core only looks at [`TimeSeries::values`]; timestamps are
/// carried along so results can be aligned back to calendar time.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    label: Option<String>,
    frequency: Option<Duration>,
}

/// Builder for constructing TimeSeries.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesBuilder {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    label: Option<String>,
    frequency: Option<Duration>,
}

impl TimeSeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamps(mut self, timestamps: Vec<DateTime<Utc>>) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn values(mut self, values: Vec<f64>) -> Self {
        self.values = values;
        self
    }

    /// Set a label such as the ticker symbol.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn frequency(mut self, freq: Duration) -> Self {
        self.frequency = Some(freq);
        self
    }

    pub fn build(self) -> Result<TimeSeries> {
        let mut series = TimeSeries::new(self.timestamps, self.values)?;
        series.label = self.label;
        series.frequency = self.frequency;
        Ok(series)
    }
}

impl TimeSeries {
    /// Create a new series, validating ordering and lengths.
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(SignalError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(SignalError::TimestampError(
                    "timestamps must be strictly increasing".to_string(),
                ));
            }
        }

        Ok(Self {
            timestamps,
            values,
            label: None,
            frequency: None,
        })
    }

    /// Create a daily series starting at `start`.
    pub fn daily(start: DateTime<Utc>, values: Vec<f64>) -> Self {
        let timestamps = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        Self {
            timestamps,
            values,
            label: None,
            frequency: Some(Duration::days(1)),
        }
    }

    pub fn builder() -> TimeSeriesBuilder {
        TimeSeriesBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Dense value sequence consumed by the estimators.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn frequency(&self) -> Option<Duration> {
        self.frequency
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Return a sanitized copy with missing values handled.
    ///
    /// Forward fill leaves leading missing values untouched because there is
    /// nothing to carry forward yet.
    pub fn sanitized(&self, policy: MissingValuePolicy) -> TimeSeries {
        match policy {
            MissingValuePolicy::Drop => {
                let (timestamps, values): (Vec<_>, Vec<_>) = self
                    .timestamps
                    .iter()
                    .zip(&self.values)
                    .filter(|(_, v)| v.is_finite())
                    .map(|(t, v)| (*t, *v))
                    .unzip();
                self.with_data(timestamps, values)
            }
            MissingValuePolicy::ForwardFill => {
                let mut values = Vec::with_capacity(self.len());
                let mut last_valid = None;
                for &v in &self.values {
                    if v.is_finite() {
                        last_valid = Some(v);
                        values.push(v);
                    } else {
                        values.push(last_valid.unwrap_or(v));
                    }
                }
                self.with_data(self.timestamps.clone(), values)
            }
        }
    }

    /// Resample onto an evenly spaced grid, forward-filling gaps.
    ///
    /// The grid starts at the first timestamp and steps by `interval` up to
    /// the last timestamp. Each grid point takes the most recent observation
    /// at or before it.
    pub fn regularize(&self, interval: Duration) -> Result<TimeSeries> {
        if interval <= Duration::zero() {
            return Err(SignalError::InvalidParameter(
                "sampling interval must be positive".to_string(),
            ));
        }
        let (first, last) = match (self.timestamps.first(), self.timestamps.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(SignalError::EmptyData),
        };

        let mut timestamps = Vec::new();
        let mut values = Vec::new();
        let mut cursor = 0;
        let mut grid_point = first;
        while grid_point <= last {
            while cursor + 1 < self.len() && self.timestamps[cursor + 1] <= grid_point {
                cursor += 1;
            }
            timestamps.push(grid_point);
            values.push(self.values[cursor]);
            grid_point += interval;
        }

        let mut series = self.with_data(timestamps, values);
        series.frequency = Some(interval);
        Ok(series)
    }

    /// Infer the sampling interval as the modal spacing between timestamps.
    pub fn infer_frequency(&self, tolerance: f64) -> Result<Duration> {
        if self.len() < 2 {
            return Err(SignalError::InsufficientData {
                needed: 2,
                got: self.len(),
            });
        }

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for w in self.timestamps.windows(2) {
            *counts.entry((w[1] - w[0]).num_seconds()).or_insert(0) += 1;
        }

        // Ties resolve to the shorter spacing so the result is deterministic.
        let (modal_diff, modal_count) = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(&diff, &count)| (diff, count))
            .ok_or(SignalError::FrequencyInference(
                "empty spacing data".to_string(),
            ))?;

        let total_count: usize = counts.values().sum();
        if (modal_count as f64 / total_count as f64) < tolerance {
            return Err(SignalError::FrequencyInference(
                "no unique modal spacing found".to_string(),
            ));
        }

        Ok(Duration::seconds(modal_diff))
    }

    /// Explicit frequency if set, otherwise the inferred modal spacing.
    pub fn sampling_interval(&self) -> Option<Duration> {
        self.frequency.or_else(|| self.infer_frequency(0.5).ok())
    }

    /// Timestamps for `steps` samples following the end of the series.
    ///
    /// # Errors
    /// `TimestampError` when a step falls outside the representable range.
    pub fn future_timestamps(
        &self,
        steps: usize,
        interval: Duration,
    ) -> Result<Vec<DateTime<Utc>>> {
        let Some(mut cursor) = self.last_timestamp() else {
            return Ok(Vec::new());
        };
        let mut future = Vec::with_capacity(steps);
        for step in 1..=steps {
            cursor = cursor.checked_add_signed(interval).ok_or_else(|| {
                SignalError::TimestampError(format!(
                    "forecast step {step} overflows the timestamp range"
                ))
            })?;
            future.push(cursor);
        }
        Ok(future)
    }

    fn with_data(&self, timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> TimeSeries {
        TimeSeries {
            timestamps,
            values,
            label: self.label.clone(),
            frequency: self.frequency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn make_daily_timestamps(n: usize) -> Vec<DateTime<Utc>> {
        (0..n).map(|i| start() + Duration::days(i as i64)).collect()
    }

    #[test]
    fn time_series_constructs_univariate_data() {
        let timestamps = make_daily_timestamps(5);
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];

        let ts = TimeSeries::new(timestamps.clone(), values.clone()).unwrap();

        assert_eq!(ts.len(), 5);
        assert!(!ts.is_empty());
        assert_eq!(ts.values(), &values);
        assert_eq!(ts.timestamps(), &timestamps);
        assert_eq!(ts.last_value(), Some(5.0));
        assert!(ts.frequency().is_none());
    }

    #[test]
    fn builder_sets_label_and_frequency() {
        let ts = TimeSeries::builder()
            .timestamps(make_daily_timestamps(3))
            .values(vec![1.0, 2.0, 3.0])
            .label("BTC-USD")
            .frequency(Duration::days(1))
            .build()
            .unwrap();

        assert_eq!(ts.label(), Some("BTC-USD"));
        assert_eq!(ts.frequency(), Some(Duration::days(1)));
    }

    #[test]
    fn time_series_rejects_non_increasing_timestamps() {
        let mut timestamps = make_daily_timestamps(3);
        timestamps[2] = timestamps[1];
        let result = TimeSeries::new(timestamps, vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(SignalError::TimestampError(_))));
    }

    #[test]
    fn time_series_rejects_length_mismatch() {
        let result = TimeSeries::new(make_daily_timestamps(3), vec![1.0, 2.0]);
        assert_eq!(
            result.unwrap_err(),
            SignalError::DimensionMismatch {
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn time_series_sanitizes_missing_values() {
        let ts = TimeSeries::daily(start(), vec![f64::NAN, 1.0, f64::NAN, 3.0]);

        assert!(ts.has_missing_values());

        let dropped = ts.sanitized(MissingValuePolicy::Drop);
        assert_eq!(dropped.values(), &[1.0, 3.0]);
        assert_eq!(dropped.len(), 2);
        assert!(!dropped.has_missing_values());

        let ffilled = ts.sanitized(MissingValuePolicy::ForwardFill);
        assert!(ffilled.values()[0].is_nan());
        assert_eq!(&ffilled.values()[1..], &[1.0, 1.0, 3.0]);
    }

    #[test]
    fn regularize_forward_fills_gaps() {
        // Weekend gap: Friday then Monday.
        let timestamps = vec![
            start(),
            start() + Duration::days(1),
            start() + Duration::days(4),
        ];
        let ts = TimeSeries::new(timestamps, vec![10.0, 11.0, 14.0]).unwrap();

        let regular = ts.regularize(Duration::days(1)).unwrap();

        assert_eq!(regular.len(), 5);
        assert_eq!(regular.values(), &[10.0, 11.0, 11.0, 11.0, 14.0]);
        assert_eq!(regular.frequency(), Some(Duration::days(1)));
        assert_eq!(regular.timestamps()[3], start() + Duration::days(3));
    }

    #[test]
    fn regularize_rejects_bad_interval_and_empty_series() {
        let ts = TimeSeries::daily(start(), vec![1.0, 2.0]);
        assert!(ts.regularize(Duration::zero()).is_err());

        let empty = TimeSeries::daily(start(), vec![]);
        assert_eq!(
            empty.regularize(Duration::days(1)).unwrap_err(),
            SignalError::EmptyData
        );
    }

    #[test]
    fn time_series_infers_regular_frequency() {
        let ts = TimeSeries::new(make_daily_timestamps(10), vec![0.0; 10]).unwrap();
        let freq = ts.infer_frequency(0.8).unwrap();
        assert_eq!(freq, Duration::days(1));
        assert_eq!(ts.sampling_interval(), Some(Duration::days(1)));
    }

    #[test]
    fn frequency_inference_requires_unique_modal_spacing() {
        let timestamps = vec![
            start(),
            start() + Duration::days(1),
            start() + Duration::days(3),
            start() + Duration::days(6),
        ];
        let ts = TimeSeries::new(timestamps, vec![0.0; 4]).unwrap();
        assert!(matches!(
            ts.infer_frequency(0.5),
            Err(SignalError::FrequencyInference(_))
        ));

        let single = TimeSeries::daily(start(), vec![1.0]);
        assert!(single.infer_frequency(0.5).is_err());
    }

    #[test]
    fn future_timestamps_follow_last_observation() {
        let ts = TimeSeries::daily(start(), vec![1.0, 2.0, 3.0]);
        let future = ts.future_timestamps(2, Duration::days(1)).unwrap();
        assert_eq!(
            future,
            vec![start() + Duration::days(3), start() + Duration::days(4)]
        );

        let empty = TimeSeries::daily(start(), vec![]);
        assert!(empty.future_timestamps(3, Duration::days(1)).unwrap().is_empty());
    }

    #[test]
    fn future_timestamps_report_overflow() {
        let ts = TimeSeries::daily(start(), vec![1.0]);
        let err = ts
            .future_timestamps(2, Duration::days(100_000_000))
            .unwrap_err();
        assert!(matches!(err, SignalError::TimestampError(_)));
        assert_relative_eq!(ts.values()[2], 3.0);
    }
}

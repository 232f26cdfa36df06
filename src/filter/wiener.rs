//! Adaptive Wiener smoothing.

use crate::filter::{moving_average, Degradation, FilterResult};

/// Default neighbourhood size.
pub const DEFAULT_WIENER_WINDOW: usize = 3;

/// Local-statistics Wiener filter (the `scipy.signal.wiener` estimator).
///
/// For each sample the mean and variance of a `window`-sized neighbourhood
/// are computed with zero padding at the edges. The noise power is the mean
/// of all local variances. Where the local variance is below the noise the
/// local mean is returned; elsewhere the sample is shrunk towards the local
/// mean by `1 - noise / variance`.
///
/// If any intermediate value is not finite the moving average over the same
/// window is returned instead, so this never fails.
pub fn wiener(data: &[f64], window: usize) -> FilterResult {
    let window = window.max(1);
    match wiener_values(data, window) {
        Some(values) => FilterResult::computed(values),
        None => {
            tracing::warn!(window, "{}", Degradation::MovingAverageFallback);
            FilterResult::degraded(
                moving_average(data, window).into_values(),
                Degradation::MovingAverageFallback,
            )
        }
    }
}

fn wiener_values(data: &[f64], window: usize) -> Option<Vec<f64>> {
    let n = data.len();
    if n == 0 {
        return Some(Vec::new());
    }

    let before = window / 2;
    let after = (window - 1) / 2;
    let size = window as f64;

    let mut local_mean = Vec::with_capacity(n);
    let mut local_var = Vec::with_capacity(n);
    for i in 0..n {
        let start = i.saturating_sub(before);
        let end = (i + after + 1).min(n);
        let (sum, sum_sq) = data[start..end]
            .iter()
            .fold((0.0, 0.0), |(s, sq), &x| (s + x, sq + x * x));
        // Out-of-range neighbours count as zeros.
        let mean = sum / size;
        local_mean.push(mean);
        local_var.push(sum_sq / size - mean * mean);
    }

    let noise = local_var.iter().sum::<f64>() / n as f64;
    if !noise.is_finite() {
        return None;
    }

    let mut output = Vec::with_capacity(n);
    for i in 0..n {
        let value = if local_var[i] < noise {
            local_mean[i]
        } else {
            local_mean[i] + (1.0 - noise / local_var[i]) * (data[i] - local_mean[i])
        };
        if !value.is_finite() {
            return None;
        }
        output.push(value);
    }
    Some(output)
}

//! Statistical utility functions.

use statrs::statistics::Statistics;

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().mean()
}

/// Population variance (n denominator), matching `numpy.var`.
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().population_variance()
}

/// Population standard deviation (n denominator), matching `numpy.std`.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().population_std_dev()
}

/// Remove the least-squares straight line from a sequence.
///
/// Sequences shorter than two samples are centered on their mean instead.
pub fn linear_detrend(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    if n < 2 {
        let m = mean(values);
        return values.iter().map(|v| v - m).collect();
    }

    let t_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dt = i as f64 - t_mean;
        sxy += dt * (y - y_mean);
        sxx += dt * dt;
    }
    let slope = sxy / sxx;

    values
        .iter()
        .enumerate()
        .map(|(i, &y)| y - (y_mean + slope * (i as f64 - t_mean)))
        .collect()
}

/// Dot product of two equal-length slices.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

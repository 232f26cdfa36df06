//! Centered moving average.

use crate::filter::FilterResult;

/// Centered rolling mean with shrinking edge windows.
///
/// The window for index `i` spans `[i - window/2, i + window - window/2)`,
/// clipped to the sequence. Edge windows therefore hold fewer samples (at
/// least one) and the output never contains NaN. A window of 0 is treated
/// as 1.
pub fn moving_average(data: &[f64], window: usize) -> FilterResult {
    FilterResult::computed(centered_mean(data, window.max(1)))
}

fn centered_mean(data: &[f64], window: usize) -> Vec<f64> {
    let n = data.len();
    let half = window / 2;

    // Prefix sums keep this O(n) for large windows.
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    let mut acc = 0.0;
    for &x in data {
        acc += x;
        prefix.push(acc);
    }

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + window - half).min(n);
            (prefix[end] - prefix[start]) / (end - start) as f64
        })
        .collect()
}

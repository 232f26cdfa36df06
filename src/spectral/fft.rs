//! FFT helpers for spectral estimation.

use rustfft::{num_complex::Complex64, FftPlanner};
use std::f64::consts::PI;

/// Compute the FFT of a real-valued signal.
///
/// Only the non-negative frequency half (bins 0 to N/2) is returned since
/// the spectrum of a real signal is symmetric.
pub fn fft_real(signal: &[f64]) -> Vec<Complex64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    let mut buffer: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    buffer.truncate(n / 2 + 1);
    buffer
}

/// Periodic Hann window, the FFT-friendly variant.
///
/// A single-sample window is `[1.0]`.
pub fn hann_window(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => (0..n)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos())
            .collect(),
    }
}

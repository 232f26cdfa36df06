//! Spectral estimation: periodogram and dominant periods.

mod fft;
mod periodogram;

pub use fft::{fft_real, hann_window};
pub use periodogram::{detrend_and_normalize, periodogram, top_periods, SpectralPeak, Spectrum};

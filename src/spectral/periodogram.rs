//! Periodogram estimate and dominant-period extraction.

use crate::filter::moving_average;
use crate::spectral::fft::{fft_real, hann_window};
use crate::utils::stats::{linear_detrend, mean, population_std_dev};
use serde::Serialize;

/// Guard added to the standard deviation when normalizing.
const NORMALIZE_EPSILON: f64 = 1e-12;

/// One-sided power spectral density.
///
/// The three vectors are parallel, one entry per frequency bin from DC to
/// Nyquist. Frequencies are in cycles per day and periods in days; the DC
/// bin has an infinite period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    pub power: Vec<f64>,
    pub periods: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Frequency spacing between adjacent bins.
    pub fn resolution(&self) -> Option<f64> {
        self.frequencies.get(1).map(|f| f - self.frequencies[0])
    }
}

/// A spectral peak: `(frequency, period, power)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectralPeak {
    pub frequency: f64,
    pub period: f64,
    pub power: f64,
}

/// Periodogram with linear detrending, a Hann window and density scaling.
///
/// `sampling_rate` is in samples per day. Power is scaled by
/// `1 / (fs * sum(w^2))` and doubled for every bin except DC and, for even
/// lengths, Nyquist, so it matches `scipy.signal.periodogram(x, fs,
/// window='hann', detrend='linear')`.
pub fn periodogram(signal: &[f64], sampling_rate: f64) -> Spectrum {
    let n = signal.len();
    if n == 0 {
        return Spectrum::default();
    }

    let window = hann_window(n);
    let detrended = linear_detrend(signal);
    let windowed: Vec<f64> = detrended.iter().zip(&window).map(|(x, w)| x * w).collect();

    let window_power: f64 = window.iter().map(|w| w * w).sum();
    let scale = 1.0 / (sampling_rate * window_power);
    let nyquist_bin = if n % 2 == 0 { Some(n / 2) } else { None };

    let bins = fft_real(&windowed);
    let mut spectrum = Spectrum {
        frequencies: Vec::with_capacity(bins.len()),
        power: Vec::with_capacity(bins.len()),
        periods: Vec::with_capacity(bins.len()),
    };

    for (k, bin) in bins.iter().enumerate() {
        let frequency = k as f64 * sampling_rate / n as f64;
        let mut power = bin.norm_sqr() * scale;
        if k > 0 && Some(k) != nyquist_bin {
            power *= 2.0;
        }

        spectrum.frequencies.push(frequency);
        spectrum.power.push(power);
        spectrum.periods.push(if frequency > 0.0 {
            1.0 / frequency
        } else {
            f64::INFINITY
        });
    }

    spectrum
}

/// The `top_n` positive-frequency bins with the highest power.
///
/// Sorted by power, highest first. Bins with equal power keep ascending
/// bin order. Empty when the spectrum has no positive frequency.
pub fn top_periods(spectrum: &Spectrum, top_n: usize) -> Vec<SpectralPeak> {
    let mut candidates: Vec<usize> = (0..spectrum.len())
        .filter(|&k| spectrum.frequencies[k] > 0.0)
        .collect();

    // Stable sort: ties stay in bin order.
    candidates.sort_by(|&a, &b| spectrum.power[b].total_cmp(&spectrum.power[a]));

    candidates
        .into_iter()
        .take(top_n)
        .map(|k| SpectralPeak {
            frequency: spectrum.frequencies[k],
            period: spectrum.periods[k],
            power: spectrum.power[k],
        })
        .collect()
}

/// Remove the moving-average trend and z-score the remainder.
///
/// This is the pre-processing applied before the periodogram so slow price
/// drift does not swamp the cycles of interest.
pub fn detrend_and_normalize(data: &[f64], window: usize) -> Vec<f64> {
    if data.is_empty() {
        return Vec::new();
    }
    let trend = moving_average(data, window);
    let detrended: Vec<f64> = data
        .iter()
        .zip(&trend.values)
        .map(|(y, t)| y - t)
        .collect();

    let center = mean(&detrended);
    let spread = population_std_dev(&detrended) + NORMALIZE_EPSILON;
    detrended.iter().map(|d| (d - center) / spread).collect()
}

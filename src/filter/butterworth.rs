//! Zero-phase Butterworth low-pass and high-pass filtering.
//!
//! The digital filter is designed from the analog Butterworth prototype via
//! the bilinear transform with frequency pre-warping, then applied forward
//! and backward so the output carries no group delay. Coefficients match
//! `scipy.signal.butter` and application matches `scipy.signal.filtfilt`
//! with odd padding.

use crate::error::{Result, SignalError};
use crate::filter::{Degradation, FilterResult};
use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Shortest input the zero-phase filter accepts.
pub const MIN_FILTER_LEN: usize = 3;

/// Pass band of a Butterworth filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    LowPass,
    HighPass,
}

/// Parameters of a Butterworth filter expressed in calendar terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButterworthSpec {
    /// Cutoff period in days; the cutoff frequency is its reciprocal.
    pub cutoff_period: f64,
    pub kind: FilterKind,
    pub order: usize,
}

impl ButterworthSpec {
    /// Fourth-order low-pass keeping cycles longer than `cutoff_period`.
    pub fn low_pass(cutoff_period: f64) -> Self {
        Self {
            cutoff_period,
            kind: FilterKind::LowPass,
            order: 4,
        }
    }

    /// Fourth-order high-pass keeping cycles shorter than `cutoff_period`.
    pub fn high_pass(cutoff_period: f64) -> Self {
        Self {
            cutoff_period,
            kind: FilterKind::HighPass,
            order: 4,
        }
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Cutoff as a fraction of the Nyquist frequency.
    ///
    /// `sampling_rate` is in samples per day.
    pub fn normalized_cutoff(&self, sampling_rate: f64) -> f64 {
        let cutoff = 1.0 / self.cutoff_period;
        let nyquist = 0.5 * sampling_rate;
        cutoff / nyquist
    }
}

/// Transfer function coefficients `b` (numerator) and `a` (denominator).
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}

impl Coefficients {
    fn taps(&self) -> usize {
        self.a.len().max(self.b.len())
    }
}

/// Design a digital Butterworth filter.
///
/// `wn` is the cutoff normalized to Nyquist and must lie strictly inside
/// (0, 1).
pub fn design(order: usize, wn: f64, kind: FilterKind) -> Result<Coefficients> {
    if order == 0 {
        return Err(SignalError::InvalidParameter(
            "filter order must be positive".to_string(),
        ));
    }
    if !(wn > 0.0 && wn < 1.0) {
        return Err(SignalError::InvalidParameter(format!(
            "normalized cutoff {wn} must lie in (0, 1)"
        )));
    }

    let warped = (PI * wn / 2.0).tan();
    let n = order as f64;

    let poles: Vec<Complex64> = (0..order)
        .map(|k| {
            let theta = PI * (2.0 * k as f64 + n + 1.0) / (2.0 * n);
            let prototype = Complex64::from_polar(1.0, theta);
            let analog = match kind {
                FilterKind::LowPass => prototype * warped,
                FilterKind::HighPass => Complex64::new(warped, 0.0) / prototype,
            };
            (1.0 + analog) / (1.0 - analog)
        })
        .collect();

    let a: Vec<f64> = poly(&poles).iter().map(|c| c.re).collect();

    let binomial = binomial_row(order);
    let scale = 2f64.powi(order as i32);
    let b = match kind {
        FilterKind::LowPass => {
            // Unity gain at DC: H(1) = sum(b) / sum(a).
            let gain = a.iter().sum::<f64>() / scale;
            binomial.iter().map(|c| c * gain).collect()
        }
        FilterKind::HighPass => {
            // Unity gain at Nyquist: H(-1).
            let alternating = |i: usize| if i % 2 == 0 { 1.0 } else { -1.0 };
            let gain = a
                .iter()
                .enumerate()
                .map(|(i, ai)| ai * alternating(i))
                .sum::<f64>()
                / scale;
            binomial
                .iter()
                .enumerate()
                .map(|(i, c)| c * alternating(i) * gain)
                .collect()
        }
    };

    Ok(Coefficients { b, a })
}

/// Zero-phase Butterworth filter over a daily series.
///
/// Never fails: too-short input, an out-of-range cutoff and a zero order
/// return the input unchanged, and a non-finite zero-phase result falls back
/// to a single causal pass. The returned status records which path ran.
pub fn butterworth(data: &[f64], spec: &ButterworthSpec, sampling_rate: f64) -> FilterResult {
    let n = data.len();
    if n < MIN_FILTER_LEN {
        return passthrough(
            data,
            Degradation::TooShort {
                len: n,
                min: MIN_FILTER_LEN,
            },
        );
    }
    if spec.order == 0 {
        return passthrough(data, Degradation::InvalidOrder);
    }

    let wn = spec.normalized_cutoff(sampling_rate);
    let coeffs = match design(spec.order, wn, spec.kind) {
        Ok(coeffs) => coeffs,
        Err(_) => return passthrough(data, Degradation::InvalidCutoff { normalized: wn }),
    };

    let padlen = (3 * coeffs.taps()).min(n - 1);
    let smoothed = filtfilt(&coeffs, data, padlen);
    if smoothed.iter().all(|v| v.is_finite()) {
        return FilterResult::computed(smoothed);
    }

    tracing::warn!(
        kind = ?spec.kind,
        cutoff_period = spec.cutoff_period,
        "{}",
        Degradation::CausalFallback
    );
    FilterResult::degraded(lfilter(&coeffs, data, None), Degradation::CausalFallback)
}

fn passthrough(data: &[f64], reason: Degradation) -> FilterResult {
    tracing::warn!("{}", reason);
    FilterResult::degraded(data.to_vec(), reason)
}

/// Forward-backward filtering with odd extension at both ends.
pub fn filtfilt(coeffs: &Coefficients, data: &[f64], padlen: usize) -> Vec<f64> {
    let n = data.len();
    if n == 0 {
        return Vec::new();
    }
    let padlen = padlen.min(n - 1);
    let extended = odd_extension(data, padlen);
    let zi = steady_state(coeffs);

    let scaled = |x0: f64| -> Vec<f64> { zi.iter().map(|z| z * x0).collect() };

    let forward = lfilter(coeffs, &extended, Some(&scaled(extended[0])));
    let mut reversed: Vec<f64> = forward.into_iter().rev().collect();
    let backward = lfilter(coeffs, &reversed, Some(&scaled(reversed[0])));
    reversed = backward.into_iter().rev().collect();

    reversed[padlen..padlen + n].to_vec()
}

/// Single causal pass in transposed direct form II.
///
/// `initial` holds the delay-line state; `None` starts from rest.
pub fn lfilter(coeffs: &Coefficients, data: &[f64], initial: Option<&[f64]>) -> Vec<f64> {
    let taps = coeffs.taps();
    let a0 = coeffs.a[0];
    let b: Vec<f64> = (0..taps)
        .map(|i| coeffs.b.get(i).copied().unwrap_or(0.0) / a0)
        .collect();
    let a: Vec<f64> = (0..taps)
        .map(|i| coeffs.a.get(i).copied().unwrap_or(0.0) / a0)
        .collect();

    let mut state = vec![0.0; taps.saturating_sub(1)];
    if let Some(initial) = initial {
        for (s, z) in state.iter_mut().zip(initial) {
            *s = *z;
        }
    }

    let mut output = Vec::with_capacity(data.len());
    for &x in data {
        let y = b[0] * x + state.first().copied().unwrap_or(0.0);
        let last = state.len();
        for i in 0..last {
            let next = if i + 1 < last { state[i + 1] } else { 0.0 };
            state[i] = b[i + 1] * x + next - a[i + 1] * y;
        }
        output.push(y);
    }
    output
}

/// Delay-line state of a unit step response at steady state.
///
/// Scaling it by the first sample starts the filter as if the signal had
/// been constant forever, which removes the start-up transient.
fn steady_state(coeffs: &Coefficients) -> Vec<f64> {
    let taps = coeffs.taps();
    let a0 = coeffs.a[0];
    let b: Vec<f64> = (0..taps)
        .map(|i| coeffs.b.get(i).copied().unwrap_or(0.0) / a0)
        .collect();
    let a: Vec<f64> = (0..taps)
        .map(|i| coeffs.a.get(i).copied().unwrap_or(0.0) / a0)
        .collect();

    let dc_gain = b.iter().sum::<f64>() / a.iter().sum::<f64>();
    (0..taps.saturating_sub(1))
        .map(|i| {
            (i + 1..taps)
                .map(|k| b[k] - a[k] * dc_gain)
                .sum::<f64>()
        })
        .collect()
}

fn odd_extension(data: &[f64], padlen: usize) -> Vec<f64> {
    let n = data.len();
    let first = data[0];
    let last = data[n - 1];

    let mut extended = Vec::with_capacity(n + 2 * padlen);
    extended.extend((1..=padlen).rev().map(|j| 2.0 * first - data[j]));
    extended.extend_from_slice(data);
    extended.extend((1..=padlen).map(|j| 2.0 * last - data[n - 1 - j]));
    extended
}

/// Expand a monic polynomial from its roots, highest power first.
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for root in roots {
        let mut next = coeffs.clone();
        next.push(Complex64::new(0.0, 0.0));
        for i in 1..next.len() {
            next[i] -= root * coeffs[i - 1];
        }
        coeffs = next;
    }
    coeffs
}

fn binomial_row(order: usize) -> Vec<f64> {
    let mut row = vec![1.0];
    for k in 0..order {
        let next = row[k] * (order - k) as f64 / (k + 1) as f64;
        row.push(next);
    }
    row
}

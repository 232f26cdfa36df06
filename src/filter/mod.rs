//! Filter bank: independent trend and smoothing estimators.
//!
//! Every estimator takes a dense value sequence and returns a
//! [`FilterResult`] of the same length. Degenerate inputs never produce an
//! error; the estimator falls back to a documented output and records why
//! in [`FilterStatus`].
//!
//! # Example
//!
//! ```
//! use anofox_signal::filter::{butterworth, kalman, moving_average, ButterworthSpec};
//!
//! let prices: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 / 9.0).sin()).collect();
//!
//! let ma = moving_average(&prices, 7);
//! let trend = butterworth(&prices, &ButterworthSpec::low_pass(30.0), 1.0);
//! let smooth = kalman(&prices, 1e-2, 0.5);
//!
//! assert_eq!(ma.len(), prices.len());
//! assert!(!trend.is_degraded());
//! assert_eq!(smooth.len(), prices.len());
//! ```

mod butterworth;
mod kalman;
mod moving_average;
mod result;
mod wiener;

pub use butterworth::{
    butterworth, design, filtfilt, lfilter, ButterworthSpec, Coefficients, FilterKind,
    MIN_FILTER_LEN,
};
pub use kalman::kalman;
pub use moving_average::moving_average;
pub use result::{Degradation, FilterResult, FilterStatus};
pub use wiener::{wiener, DEFAULT_WIENER_WINDOW};

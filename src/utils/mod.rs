//! Numerical helpers shared by the estimators.

pub mod lstsq;
pub mod stats;

pub use lstsq::{lstsq, LstsqResult};
pub use stats::{linear_detrend, mean, population_std_dev, population_variance};

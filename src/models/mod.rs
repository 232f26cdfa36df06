//! Forecasting models.

pub mod autoregressive;

pub use autoregressive::{forecast_with_fallback, ArForecast, ArModel, ForecastStatus};

//! Core data structures for time series analysis.

mod source;
mod time_series;

pub use source::SeriesSource;
pub use time_series::{MissingValuePolicy, TimeSeries, TimeSeriesBuilder};

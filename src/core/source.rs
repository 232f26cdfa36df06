//! Boundary to market-data providers.

use crate::core::TimeSeries;
use crate::error::Result;

/// Anything that can hand over a price series for analysis.
///
/// Provider adapters (HTTP clients, CSV readers, database queries) live
/// outside this crate and implement this trait. The returned series may be
/// irregular or contain missing values; [`crate::pipeline::analyze_source`]
/// regularizes it before any estimator runs.
pub trait SeriesSource {
    /// Fetch the series.
    fn load(&self) -> Result<TimeSeries>;
}

impl SeriesSource for TimeSeries {
    fn load(&self) -> Result<TimeSeries> {
        Ok(self.clone())
    }
}

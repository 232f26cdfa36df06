//! Error types for the anofox-signal library.

use thiserror::Error;

/// Result type alias for signal analysis operations.
pub type Result<T> = std::result::Result<T, SignalError>;

/// Errors that can occur during signal analysis.
///
/// Degenerate inputs to the filter bank are not errors; they are reported
/// through [`crate::filter::FilterStatus`] instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Missing values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// Frequency inference failed.
    #[error("could not infer frequency: {0}")]
    FrequencyInference(String),

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}

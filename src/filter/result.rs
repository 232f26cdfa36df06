//! Output type shared by every estimator in the filter bank.

use serde::Serialize;
use std::fmt;

/// Why an estimator returned a fallback instead of its regular output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// Input shorter than the estimator can handle; input returned unchanged.
    TooShort { len: usize, min: usize },
    /// Normalized cutoff outside (0, 1); input returned unchanged.
    InvalidCutoff { normalized: f64 },
    /// Filter order of zero; input returned unchanged.
    InvalidOrder,
    /// Zero-phase filtering failed; a forward-only pass was used.
    CausalFallback,
    /// Wiener smoothing failed; the moving average was used.
    MovingAverageFallback,
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::TooShort { len, min } => {
                write!(f, "input too short for filtering ({len} < {min}), returned unchanged")
            }
            Degradation::InvalidCutoff { normalized } => {
                write!(f, "normalized cutoff {normalized:.4} outside (0, 1), returned unchanged")
            }
            Degradation::InvalidOrder => write!(f, "filter order must be positive, returned unchanged"),
            Degradation::CausalFallback => write!(f, "zero-phase filter failed, used causal filter"),
            Degradation::MovingAverageFallback => {
                write!(f, "wiener smoothing failed, used moving average")
            }
        }
    }
}

/// Whether an estimator ran normally or fell back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FilterStatus {
    Computed,
    Degraded(Degradation),
}

/// A filtered sequence, always the same length as its input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterResult {
    pub values: Vec<f64>,
    pub status: FilterStatus,
}

impl FilterResult {
    pub fn computed(values: Vec<f64>) -> Self {
        Self {
            values,
            status: FilterStatus::Computed,
        }
    }

    pub fn degraded(values: Vec<f64>, reason: Degradation) -> Self {
        Self {
            values,
            status: FilterStatus::Degraded(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.status, FilterStatus::Degraded(_))
    }

    /// The fallback reason, if any.
    pub fn degradation(&self) -> Option<Degradation> {
        match self.status {
            FilterStatus::Computed => None,
            FilterStatus::Degraded(reason) => Some(reason),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accessors() {
        let ok = FilterResult::computed(vec![1.0, 2.0]);
        assert!(!ok.is_degraded());
        assert_eq!(ok.degradation(), None);
        assert_eq!(ok.len(), 2);

        let bad = FilterResult::degraded(vec![1.0], Degradation::CausalFallback);
        assert!(bad.is_degraded());
        assert_eq!(bad.degradation(), Some(Degradation::CausalFallback));
        assert_eq!(bad.into_values(), vec![1.0]);
    }

    #[test]
    fn degradation_messages() {
        let msg = Degradation::TooShort { len: 2, min: 3 }.to_string();
        assert_eq!(msg, "input too short for filtering (2 < 3), returned unchanged");

        let msg = Degradation::InvalidCutoff { normalized: 2.0 }.to_string();
        assert!(msg.contains("2.0000"));
    }
}

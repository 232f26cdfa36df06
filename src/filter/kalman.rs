//! One-dimensional Kalman smoothing of a random-walk state.

use crate::filter::FilterResult;

/// Recursive Kalman filter with a scalar random-walk state model.
///
/// The state starts at the first observation with unit covariance. Each step
/// predicts the previous state, inflates the covariance by `process_var`,
/// and blends in the next observation with gain
/// `P / (P + measurement_var)`. Empty input yields empty output.
pub fn kalman(observations: &[f64], process_var: f64, measurement_var: f64) -> FilterResult {
    let n = observations.len();
    let mut estimates = Vec::with_capacity(n);
    let Some(&first) = observations.first() else {
        return FilterResult::computed(estimates);
    };

    let mut state = first;
    let mut covariance = 1.0;
    estimates.push(state);

    for &observation in &observations[1..] {
        let predicted_state = state;
        let predicted_cov = covariance + process_var;

        // With no uncertainty on either side the observation is exact.
        let innovation_cov = predicted_cov + measurement_var;
        let gain = if innovation_cov > 0.0 {
            predicted_cov / innovation_cov
        } else {
            1.0
        };
        state = predicted_state + gain * (observation - predicted_state);
        covariance = (1.0 - gain) * predicted_cov;

        estimates.push(state);
    }

    FilterResult::computed(estimates)
}

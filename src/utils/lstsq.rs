//! Least-squares solver for possibly rank-deficient design matrices.
//!
//! Used by the autoregressive model, whose lagged design matrix becomes
//! nearly collinear on smooth price series.

use crate::error::{Result, SignalError};
use nalgebra::{DMatrix, DVector};

/// Solution of a least-squares problem.
#[derive(Debug, Clone)]
pub struct LstsqResult {
    /// Minimum-norm coefficient vector.
    pub coefficients: Vec<f64>,
    /// Effective rank after the singular value cutoff.
    pub rank: usize,
}

/// Solve `min ||X b - y||` for `b`, returning the minimum-norm solution.
///
/// `design` is row-major with `rows` rows of equal length. Singular values
/// below `eps * max(rows, cols) * sigma_max` are treated as zero, which is
/// the numpy `lstsq(rcond=None)` convention.
pub fn lstsq(design: &[Vec<f64>], target: &[f64]) -> Result<LstsqResult> {
    let rows = design.len();
    if rows == 0 {
        return Err(SignalError::EmptyData);
    }
    if target.len() != rows {
        return Err(SignalError::DimensionMismatch {
            expected: rows,
            got: target.len(),
        });
    }
    let cols = design[0].len();
    if cols == 0 {
        return Err(SignalError::InvalidParameter(
            "design matrix has no columns".to_string(),
        ));
    }
    if let Some(row) = design.iter().find(|row| row.len() != cols) {
        return Err(SignalError::DimensionMismatch {
            expected: cols,
            got: row.len(),
        });
    }
    if design.iter().flatten().chain(target).any(|v| !v.is_finite()) {
        return Err(SignalError::ComputationError(
            "non-finite values in least-squares input".to_string(),
        ));
    }

    let y = DVector::from_column_slice(target);
    let (beta, rank) = if rows >= cols {
        // X^T = U S V^T, so the pseudo-inverse of X is U S^+ V^T.
        let xt = DMatrix::from_fn(cols, rows, |c, r| design[r][c]);
        let (u, sigma, v_t) = wide_svd(xt)?;
        let (scaled, rank) = pseudo_scale(v_t * &y, &sigma, rows.max(cols));
        (u * scaled, rank)
    } else {
        // X = U S V^T, so the pseudo-inverse of X is V S^+ U^T.
        let x = DMatrix::from_fn(rows, cols, |r, c| design[r][c]);
        let (u, sigma, v_t) = wide_svd(x)?;
        let (scaled, rank) = pseudo_scale(u.transpose() * &y, &sigma, rows.max(cols));
        (v_t.transpose() * scaled, rank)
    };

    let coefficients: Vec<f64> = beta.iter().copied().collect();
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(SignalError::ComputationError(
            "least-squares solution is not finite".to_string(),
        ));
    }

    Ok(LstsqResult { coefficients, rank })
}

/// Thin SVD of a matrix with no more rows than columns.
///
/// nalgebra's bidiagonalization misreports the leading singular value of
/// tall rank-deficient matrices, so callers only decompose the wide side.
fn wide_svd(matrix: DMatrix<f64>) -> Result<(DMatrix<f64>, DVector<f64>, DMatrix<f64>)> {
    let svd = matrix.svd(true, true);
    match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => Ok((u, svd.singular_values, v_t)),
        _ => Err(SignalError::ComputationError(
            "singular vectors were not computed".to_string(),
        )),
    }
}

/// Divide each projected component by its singular value, zeroing those at or
/// below `eps * dim * sigma_max`. Returns the scaled vector and the rank.
fn pseudo_scale(
    mut projected: DVector<f64>,
    sigma: &DVector<f64>,
    dim: usize,
) -> (DVector<f64>, usize) {
    let sigma_max = sigma.iter().copied().fold(0.0_f64, f64::max);
    let cutoff = f64::EPSILON * dim as f64 * sigma_max;
    let mut rank = 0;
    for (p, &s) in projected.iter_mut().zip(sigma.iter()) {
        if s > cutoff {
            *p /= s;
            rank += 1;
        } else {
            *p = 0.0;
        }
    }
    (projected, rank)
}

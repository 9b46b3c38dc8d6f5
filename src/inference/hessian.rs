//! inference::hessian — covariance of fitted parameters from NLL curvature.
//!
//! Purpose
//! -------
//! Turn the Hessian of a negative log-likelihood at its minimum into the
//! covariance matrix of the floating parameters, optionally corrected for
//! weighted events with the sum-of-weights-squared sandwich `V C V`.
//!
//! Key behaviors
//! -------------
//! - [`calc_covariance`] differences the analytic NLL gradient with
//!   [`compute_hessian_scaled`] to obtain `H`, inverts it, and, when a second
//!   gradient evaluated with squared weights is supplied, returns
//!   `V = H⁻¹ C H⁻¹` with `C` the Hessian of that second NLL.
//! - [`invert_information`] inverts a symmetric matrix through the
//!   `nalgebra` symmetric eigendecomposition and refuses matrices whose
//!   smallest eigenvalue is at or below `EIGEN_EPS · max|λ|`.
//! - [`standard_errors`] reads `sqrt(diag V)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Hessians arrive symmetric (enforced by `symmetrize_hess`) and finite.
//! - Covariances are on the **sum** NLL scale, so they describe the
//!   uncertainty of the full dataset, not a per-event average.
//!
//! Conventions
//! -----------
//! - No explicit LU inverse is formed; `H⁻¹ = Q diag(1/λ) Qᵀ`.
//! - A zero-dimensional problem yields an empty covariance.
//!
//! Downstream usage
//! ----------------
//! - The fit engine maps `NotPositiveDefinite` to its
//!   `HessianNotPositiveDefinite` status and any other failure to
//!   `CovarianceFailed`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the `ndarray` → `DMatrix` copy, inversion of a known
//!   matrix, rejection of an indefinite matrix, and the sandwich scaling
//!   for uniformly weighted quadratics.
use crate::{
    inference::errors::{InferenceError, InferenceResult},
    optimization::{
        errors::OptResult,
        loglik_optimizer::{Covariance, Grad, Hessian, Theta, compute_hessian_scaled},
        numerical_stability::transformations::EIGEN_EPS,
    },
};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

/// calc_covariance — covariance of the parameters at an NLL minimum.
///
/// Parameters
/// ----------
/// - `grad`: gradient of the NLL with respect to the external floating
///   parameters.
/// - `x_hat`: external parameter values at the minimum.
/// - `grad_w2`: optional gradient of the same NLL built with squared event
///   weights; when present the result is the sandwich `V C V`.
///
/// Returns
/// -------
/// A symmetric `k × k` covariance for `k = x_hat.len()`.
///
/// Errors
/// ------
/// - `NotPositiveDefinite` when `H` has a non-positive direction.
/// - `CurvatureUnavailable` when either Hessian cannot be evaluated.
pub fn calc_covariance<G, W>(
    grad: &G, x_hat: &Theta, grad_w2: Option<&W>,
) -> InferenceResult<Covariance>
where
    G: Fn(&Theta) -> OptResult<Grad>,
    W: Fn(&Theta) -> OptResult<Grad>,
{
    let k = x_hat.len();
    if k == 0 {
        return Ok(Array2::zeros((0, 0)));
    }
    let hess = compute_hessian_scaled(grad, x_hat)?;
    let v = invert_information(&hess)?;
    match grad_w2 {
        Some(g2) => {
            let c = compute_hessian_scaled(g2, x_hat)?;
            sandwich_covariance(&v, &c)
        }
        None => Ok(v),
    }
}

/// invert_information — eigen-based inverse of a symmetric positive-definite
/// matrix.
///
/// Errors
/// ------
/// - `DimensionMismatch` for a non-square input.
/// - `NotPositiveDefinite` when `min λ ≤ EIGEN_EPS · max|λ|`.
pub fn invert_information(hess: &Hessian) -> InferenceResult<Covariance> {
    let n = hess.nrows();
    if hess.ncols() != n {
        return Err(InferenceError::DimensionMismatch {
            expected: n,
            found: (hess.nrows(), hess.ncols()),
        });
    }
    let mut hess_nalg = DMatrix::<f64>::zeros(n, n);
    fill_dmatrix(hess, &mut hess_nalg);

    let eigen_decomp = hess_nalg.symmetric_eigen();
    let q = eigen_decomp.eigenvectors;
    let eigenvals = eigen_decomp.eigenvalues;
    let scale = eigenvals.iter().fold(0.0_f64, |acc, l| acc.max(l.abs()));
    let min_eigenvalue = eigenvals.iter().cloned().fold(f64::INFINITY, f64::min);
    let degenerate = scale.is_nan() || scale <= 0.0 || !min_eigenvalue.is_finite();
    if degenerate || min_eigenvalue <= EIGEN_EPS * scale {
        return Err(InferenceError::NotPositiveDefinite { min_eigenvalue });
    }

    let mut cov = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let v: f64 = eigenvals
                .iter()
                .enumerate()
                .map(|(k, &lambda)| q[(i, k)] * q[(j, k)] / lambda)
                .sum();
            cov[[i, j]] = v;
            cov[[j, i]] = v;
        }
    }
    Ok(cov)
}

/// sandwich_covariance — `V C V` for a bread `V` and a meat `C`.
///
/// Errors
/// ------
/// - `DimensionMismatch` when the shapes differ.
pub fn sandwich_covariance(v: &Covariance, c: &Hessian) -> InferenceResult<Covariance> {
    let n = v.nrows();
    if c.nrows() != n || c.ncols() != n || v.ncols() != n {
        return Err(InferenceError::DimensionMismatch { expected: n, found: (c.nrows(), c.ncols()) });
    }
    let mut out = v.dot(c).dot(v);
    for i in 0..n {
        for j in 0..i {
            let avg = 0.5 * (out[[i, j]] + out[[j, i]]);
            out[[i, j]] = avg;
            out[[j, i]] = avg;
        }
    }
    Ok(out)
}

/// Square roots of the covariance diagonal. Negative round-off is floored
/// at zero.
pub fn standard_errors(cov: &Covariance) -> Array1<f64> {
    cov.diag().mapv(|v| v.max(0.0).sqrt())
}

// ---- Helper methods ----

fn fill_dmatrix(hess: &Array2<f64>, hess_nalg: &mut DMatrix<f64>) {
    let n = hess.ncols();
    for j in 0..n {
        for i in j..n {
            if j == i {
                hess_nalg[(i, i)] = hess[[i, i]];
            } else {
                hess_nalg[(i, j)] = hess[[i, j]];
                hess_nalg[(j, i)] = hess[[j, i]];
            }
        }
    }
}

//! loglik_optimizer::finite_diff — finite-difference gradient and Hessian helpers.
//!
//! Purpose
//! -------
//! Provide derivative approximations for the optimizer and the covariance
//! step: a forward-difference gradient with error capture for models without
//! an analytic gradient, and a Hessian built by differencing an analytic
//! gradient with steps scaled to each coordinate.
//!
//! Key behaviors
//! -------------
//! - [`run_fd_diff`] takes a forward-difference gradient through `finitediff`
//!   and turns any error captured inside the objective back into an
//!   [`OptError`](crate::optimization::errors::OptError).
//! - [`compute_hessian_scaled`] differences a fallible gradient function with
//!   relative steps `h_j = REL_STEP · max(|x_j|, 1)`, centrally when both
//!   sides evaluate and one-sided otherwise, then symmetrizes the result.
//!
//! Invariants & assumptions
//! ------------------------
//! - Returned gradients satisfy [`validate_grad`]; returned Hessians satisfy
//!   [`validate_hessian`] and are exactly symmetric.
//! - Parameters of very different magnitude (yields in the thousands next
//!   to a width of a few GeV) are the reason steps are relative, not the
//!   fixed `sqrt(ε)` steps used by `finitediff`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the quadratic case, error capture, the one-sided
//!   fallback, and symmetrization.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use ndarray::Array2;
use std::cell::RefCell;

/// Relative step used by [`compute_hessian_scaled`].
pub const REL_STEP: f64 = 1e-5;

/// run_fd_diff — forward-difference gradient with error capture and validation.
///
/// Parameters
/// ----------
/// - `theta`: point of evaluation; its length is the gradient dimension.
/// - `func`: scalar objective. It must store the first evaluation error in
///   `closure_err` and return `NaN`.
/// - `closure_err`: shared error slot, cleared on entry.
///
/// Returns
/// -------
/// The validated gradient.
///
/// Errors
/// ------
/// - The captured evaluation error, converted to `OptError`.
/// - `GradientDimMismatch` / `InvalidGradient` from [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// compute_hessian_scaled — Hessian from differences of a gradient function.
///
/// Purpose
/// -------
/// Approximate `∂²f/∂x_i∂x_j` at `x` by differencing `grad(x)` one coordinate
/// at a time.
///
/// Parameters
/// ----------
/// - `grad`: fallible gradient of the scalar function being differentiated.
/// - `x`: point of evaluation.
///
/// Returns
/// -------
/// A symmetric `n × n` matrix with all finite entries.
///
/// Errors
/// ------
/// - The first gradient error when neither a central nor a one-sided
///   difference can be formed for a column.
/// - `InvalidHessian` when an entry is not finite.
///
/// Notes
/// -----
/// - Column `j` uses `(g(x + h e_j) - g(x - h e_j)) / 2h` when both sides
///   evaluate, otherwise the available one-sided difference against `g(x)`.
pub fn compute_hessian_scaled<G>(grad: &G, x: &Theta) -> OptResult<Hessian>
where
    G: Fn(&Theta) -> OptResult<Grad>,
{
    let n = x.len();
    let g0 = grad(x)?;
    validate_grad(&g0, n)?;
    let mut hess = Array2::<f64>::zeros((n, n));

    for j in 0..n {
        let h = REL_STEP * x[j].abs().max(1.0);
        let mut up = x.clone();
        up[j] += h;
        let mut down = x.clone();
        down[j] -= h;

        let column = match (grad(&up), grad(&down)) {
            (Ok(gu), Ok(gd)) => (&gu - &gd) / (2.0 * h),
            (Ok(gu), Err(_)) => (&gu - &g0) / h,
            (Err(_), Ok(gd)) => (&g0 - &gd) / h,
            (Err(e), Err(_)) => return Err(e),
        };
        validate_grad(&column, n)?;
        hess.column_mut(j).assign(&column);
    }

    validate_hessian(&hess, n)?;
    symmetrize_hess(&mut hess);
    Ok(hess)
}

/// Replace each off-diagonal pair with its average. Diagonal untouched.
pub fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}

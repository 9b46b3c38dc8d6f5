//! loglik_optimizer::builders — L-BFGS solver construction.
//!
//! Purpose
//! -------
//! Build L-BFGS solvers for the spectrum fitter with either line search and
//! wire in the optional gradient and cost-change tolerances from
//! [`MLEOptions`]. The initial point and the iteration ceiling are runtime
//! concerns applied by [`run_lbfgs`](super::run::run_lbfgs).
//!
//! Conventions
//! -----------
//! - History size is `opts.lbfgs_mem` or [`DEFAULT_LBFGS_MEM`].
//! - Argmin rejections of a tolerance surface as [`OptError`](crate::optimization::errors::OptError)
//!   through `From<argmin::core::Error>`.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// Construct L-BFGS with the Hager–Zhang line search.
///
/// Errors
/// ------
/// - `OptError` when argmin rejects a configured tolerance.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// Construct L-BFGS with the More–Thuente line search.
///
/// Errors
/// ------
/// - `OptError` when argmin rejects a configured tolerance.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// configure_lbfgs — apply optional tolerances to an L-BFGS solver.
///
/// Parameters
/// ----------
/// - `solver`: pre-constructed L-BFGS with any line search `L`.
/// - `opts`: source of `tol_grad` / `tol_cost`; `None` keeps argmin defaults.
///
/// Returns
/// -------
/// The solver with tolerances applied.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::traits::{LineSearcher, Tolerances};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Solver construction for both line searches and tolerance wiring. Full
    // solves are exercised by the fit tests.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Both builders succeed with default and explicit history sizes.
    //
    // Given
    // -----
    // - Valid tolerances, `lbfgs_mem` of `None` and `Some(11)`.
    //
    // Expect
    // ------
    // - All four builds return `Ok`.
    fn builders_accept_default_and_explicit_memory() {
        // Arrange
        let tols = Tolerances::new(Some(1e-6), Some(1e-9), Some(50)).expect("valid tolerances");
        let default_mem =
            MLEOptions::new(tols, LineSearcher::HagerZhang, None).expect("valid options");
        let explicit_mem =
            MLEOptions::new(tols, LineSearcher::MoreThuente, Some(11)).expect("valid options");

        // Act + Assert
        assert!(build_optimizer_hager_zhang(&default_mem).is_ok());
        assert!(build_optimizer_hager_zhang(&explicit_mem).is_ok());
        assert!(build_optimizer_more_thuente(&default_mem).is_ok());
        assert!(build_optimizer_more_thuente(&explicit_mem).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // `configure_lbfgs` leaves argmin defaults in place when only an
    // iteration ceiling is configured.
    fn configure_lbfgs_respects_absent_tolerances() {
        // Arrange
        let raw = LBFGS::new(MoreThuenteLS::new(), DEFAULT_LBFGS_MEM);
        let tols = Tolerances::new(None, None, Some(50)).expect("valid tolerances");
        let opts = MLEOptions::new(tols, LineSearcher::MoreThuente, None).expect("valid options");

        // Act
        let configured = configure_lbfgs(raw, &opts);

        // Assert
        assert!(configured.is_ok());
    }
}

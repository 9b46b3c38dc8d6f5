//! High-level entry point for maximizing a [`LogLikelihood`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
    },
};

/// Maximize `ℓ(θ)` with L-BFGS and the line search chosen in `opts`.
///
/// # Behavior
/// - Calls `f.check(theta0, data)` once.
/// - Minimizes `c(θ) = -ℓ(θ)` through [`ArgMinAdapter`].
/// - Delegates execution to [`run_lbfgs`].
///
/// # Errors
/// - Errors from `f.check`, solver construction, or the argmin run.
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use diphoton_fit::optimization::errors::OptResult;
/// use diphoton_fit::optimization::loglik_optimizer::{maximize, LogLikelihood, MLEOptions, Theta};
///
/// struct Parabola;
/// impl LogLikelihood for Parabola {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = maximize(&Parabola, array![0.1, -0.2], &(), &MLEOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), diphoton_fit::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::OptError,
        loglik_optimizer::{Grad, traits::Tolerances},
    };
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // End-to-end maximization of a concave toy log-likelihood with both line
    // searches, and early rejection by `check`.
    // -------------------------------------------------------------------------

    struct ShiftedBowl;

    impl LogLikelihood for ShiftedBowl {
        type Data = [f64; 2];

        fn value(&self, theta: &Theta, c: &[f64; 2]) -> OptResult<f64> {
            Ok(-(theta[0] - c[0]).powi(2) - 3.0 * (theta[1] - c[1]).powi(2))
        }

        fn check(&self, theta: &Theta, _c: &[f64; 2]) -> OptResult<()> {
            if theta.len() != 2 {
                return Err(OptError::ThetaLengthMismatch { expected: 2, actual: theta.len() });
            }
            Ok(())
        }

        fn grad(&self, theta: &Theta, c: &[f64; 2]) -> OptResult<Grad> {
            Ok(array![-2.0 * (theta[0] - c[0]), -6.0 * (theta[1] - c[1])])
        }
    }

    #[test]
    // Purpose
    // -------
    // Both line searches find the maximizer of a separable concave bowl.
    //
    // Given
    // -----
    // - ℓ(θ) = -(θ₀-1)² - 3(θ₁+2)², start at the origin.
    //
    // Expect
    // ------
    // - θ̂ ≈ (1, -2), ℓ(θ̂) ≈ 0, converged.
    fn maximize_finds_bowl_center_with_both_line_searches() {
        for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            // Arrange
            let tols = Tolerances::new(Some(1e-8), None, Some(200)).expect("valid tolerances");
            let opts = MLEOptions::new(tols, ls, None).expect("valid options");

            // Act
            let out = maximize(&ShiftedBowl, array![0.0, 0.0], &[1.0, -2.0], &opts)
                .expect("optimization should succeed");

            // Assert
            assert!(out.converged, "{ls:?} did not converge: {}", out.status);
            assert_relative_eq!(out.theta_hat[0], 1.0, epsilon = 1e-6);
            assert_relative_eq!(out.theta_hat[1], -2.0, epsilon = 1e-6);
            assert_relative_eq!(out.value, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    // Purpose
    // -------
    // `check` runs before any solver work.
    fn maximize_propagates_check_failure() {
        // Act
        let result =
            maximize(&ShiftedBowl, array![0.0], &[1.0, -2.0], &MLEOptions::default());

        // Assert
        assert_eq!(result, Err(OptError::ThetaLengthMismatch { expected: 2, actual: 1 }));
    }
}

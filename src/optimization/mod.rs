//! optimization — MLE stack, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Provide the optimization layer behind spectrum fits: an argmin-backed
//! log-likelihood maximizer, guarded transforms between bounded external
//! parameters and an unconstrained internal space, and a single error and
//! result surface.
//!
//! Key behaviors
//! -------------
//! - `loglik_optimizer` maximizes `ℓ(θ)` with L-BFGS (More–Thuente or
//!   Hager–Zhang line search) and normalizes the solver state into an
//!   `OptimOutcome` with a structured termination reason.
//! - `loglik_optimizer::finite_diff` provides the relative-step Hessian used
//!   for parameter uncertainties.
//! - `numerical_stability` maps parameter bounds to smooth transforms.
//! - `errors::OptError` unifies configuration problems, numerical failures
//!   and argmin backend errors.
//!
//! Invariants & assumptions
//! ------------------------
//! - The solver works in unconstrained `θ`; the fit layer decodes `θ` into
//!   bounded values before evaluating densities.
//! - Invalid states are reported as `OptError`, not panics.
//!
//! Conventions
//! -----------
//! - Solvers maximize `ℓ(θ)` by minimizing `c(θ) = -ℓ(θ)`; user-facing
//!   outcomes are expressed in terms of `ℓ`.
//! - Vectors and matrices are `ndarray` aliases (`Theta`, `Grad`, `Hessian`).
//! - Diagnostics go through the `log` facade; the per-iteration observer is
//!   available behind the `obs_slog` feature.
//!
//! Downstream usage
//! ----------------
//! - `spectrum::models::FitModel` implements `LogLikelihood` and calls
//!   `maximize`.
//! - `inference` differentiates the model gradient with
//!   `compute_hessian_scaled` and inverts the result.
//!
//! Testing notes
//! -------------
//! - Submodule tests cover tolerance validation, the adapter's sign
//!   conventions, toy maximizations with both line searches, Hessian
//!   differencing, and the bound transforms.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}

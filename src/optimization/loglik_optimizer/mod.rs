//! loglik_optimizer — argmin-powered log-likelihood maximizer.
//!
//! Purpose
//! -------
//! Maximize log-likelihoods `ℓ(θ)` with L-BFGS. Callers implement
//! [`LogLikelihood`] and call [`maximize`] with an initial `θ`, a data
//! payload and [`MLEOptions`].
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] exposes `c(θ) = -ℓ(θ)` to argmin, with a
//!   finite-difference fallback when no analytic gradient exists.
//! - [`builders`] construct the L-BFGS solver for the chosen
//!   [`LineSearcher`]; [`run::run_lbfgs`] executes it.
//! - [`OptimOutcome`] records the best `θ`, `ℓ(θ̂)`, iteration counts and a
//!   [`Termination`] that separates convergence from the iteration ceiling.
//! - [`finite_diff`] holds the derivative helpers, [`validation`] the
//!   shape and finiteness checks.
//!
//! Invariants & assumptions
//! ------------------------
//! - [`LogLikelihood::value`] and [`LogLikelihood::grad`] report invalid
//!   inputs as [`OptError`](crate::optimization::errors::OptError) values.
//! - Tolerances are validated on construction.
//!
//! Testing notes
//! -------------
//! - Toy concave problems in [`api`] run the full solver path; the other
//!   submodules test their own concerns.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::finite_diff::compute_hessian_scaled;
pub use self::traits::{
    LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Termination, Tolerances,
};
pub use self::types::{Cost, Covariance, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Hessian, Theta};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{
        LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Termination, Tolerances,
    };
    pub use super::types::{Cost, Grad, Theta};
}

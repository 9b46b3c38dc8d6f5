//! numerical_stability — guarded scalar transforms and bound handling.
//!
//! Purpose
//! -------
//! Collect the small numeric helpers the fitter needs to run an
//! unconstrained optimizer on bounded parameters: overflow-safe softplus and
//! logistic functions, the [`BoundTransform`] map between internal and
//! external parameter values, and shared tolerances.
//!
//! Key behaviors
//! -------------
//! - `safe_softplus` / `safe_softplus_inv` / `safe_logistic` keep `f64`
//!   arithmetic well conditioned in the tails.
//! - [`BoundTransform`] chooses identity, softplus or sine mappings from the
//!   bounds of a parameter and supplies `dx/dt` for the chain rule.
//! - `EIGEN_EPS` and `GENERAL_TOL` are the shared thresholds for
//!   positive-definiteness checks and boundary clamping.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite; validation happens in the optimizer and fit layers.
//! - Two-sided bounds satisfy `lo < hi`; this is checked when parameters
//!   are registered.
//!
//! Conventions
//! -----------
//! - Pure functions only: no logging and no I/O.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] compare against naive formulas,
//!   round-trip each transform, and check derivatives by central
//!   differences.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    BoundTransform, EIGEN_EPS, GENERAL_TOL, safe_logistic, safe_softplus, safe_softplus_inv,
};

pub mod prelude {
    pub use super::transformations::{BoundTransform, EIGEN_EPS, GENERAL_TOL};
}

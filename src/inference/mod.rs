//! inference — parameter covariance and derived significance for fits.
//!
//! Purpose
//! -------
//! Provide post-estimation uncertainty for spectrum fits: covariance of the
//! floating parameters from the curvature of the negative log-likelihood,
//! the sum-of-weights-squared correction for weighted events, and the
//! point-estimate significance of a fitted yield.
//!
//! Key behaviors
//! -------------
//! - [`calc_covariance`] builds `H` by differencing the analytic NLL
//!   gradient, inverts it with a symmetric eigendecomposition, and applies
//!   the `V C V` sandwich when a squared-weight gradient is supplied.
//! - [`significance`] returns `value / error` or an explicit
//!   [`Significance::Undefined`] sentinel.
//! - [`InferenceError`] separates non-positive-definite curvature from
//!   curvature that could not be evaluated.
//!
//! Invariants & assumptions
//! ------------------------
//! - Covariances are expressed in **external** parameter space (the
//!   bounded physical values), never in the optimizer's internal space.
//! - All routines return [`InferenceError`] on failure rather than panic.
//!
//! Downstream usage
//! ----------------
//! - `spectrum::models::FitModel` calls [`calc_covariance`] after the
//!   optimizer converges and maps failures to fit status codes.
//! - `report` formats [`Significance`] for the summary box.
//!
//! Testing notes
//! -------------
//! - Unit tests cover inversion, rejection of indefinite matrices, the
//!   weighted sandwich scaling, and the significance sentinel. End-to-end
//!   error behavior on weighted datasets is tested in the fit engine.

pub mod errors;
pub mod hessian;
pub mod significance;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::errors::{InferenceError, InferenceResult};
pub use self::hessian::{calc_covariance, invert_information, sandwich_covariance, standard_errors};
pub use self::significance::{Significance, significance};

pub mod prelude {
    pub use super::errors::{InferenceError, InferenceResult};
    pub use super::hessian::{calc_covariance, standard_errors};
    pub use super::significance::{Significance, significance};
}

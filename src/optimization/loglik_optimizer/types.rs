//! loglik_optimizer::types — numeric aliases and L-BFGS wiring.
//!
//! Purpose
//! -------
//! Name the vector, matrix and solver shapes used by the spectrum fitter so
//! the rest of the optimizer never spells out `ndarray` or argmin generics.
//!
//! Conventions
//! -----------
//! - `Theta` lives in the unconstrained internal space; the fit layer maps it
//!   to bounded external parameter values.
//! - `Hessian` and `Covariance` are dense `k × k` matrices over the floating
//!   parameters only.
//! - `DEFAULT_LBFGS_MEM` is the history size used when options leave it unset.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Internal (unconstrained) parameter vector.
pub type Theta = Array1<f64>;

/// Gradient vector matching the shape of [`Theta`].
pub type Grad = Array1<f64>;

/// Dense second-derivative matrix.
pub type Hessian = Array2<f64>;

/// Dense covariance matrix of the floating parameters.
pub type Covariance = Array2<f64>;

/// Scalar objective value. Internally the cost `c(θ) = -ℓ(θ)`.
pub type Cost = f64;

/// Function-evaluation counters as reported by argmin (`"cost_count"`, ...).
pub type FnEvalMap = HashMap<String, u64>;

pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;

//! pdf — component densities of the spectrum model.
//!
//! Purpose
//! -------
//! Provide the two parametric shapes used in diphoton fits, a truncated
//! Gaussian signal and a Chebyshev-series background, and the additive
//! [`SpectrumModel`] that combines them with yields.
//!
//! Key behaviors
//! -------------
//! - [`Shape`] names a family and the registry indices of its parameters.
//! - [`Shape::prepare`] reads those parameters from a value slice and
//!   returns a [`Kernel`] with all per-point constants (normalizations,
//!   `∂ ln Z` terms) computed once.
//! - Kernels evaluate densities, bin masses, and their analytic gradients
//!   with respect to the shape's own parameters.
//!
//! Invariants & assumptions
//! ------------------------
//! - Densities are normalized to one over the observable range.
//! - Gradient slots follow [`Shape::param_indices`].
//! - A parameter point outside a shape's valid region fails `prepare` with
//!   [`FitError::InvalidShapeParameter`](crate::spectrum::errors::FitError).

pub mod chebyshev;
pub mod composite;
pub mod gaussian;

use crate::spectrum::{core::observable::Observable, errors::FitResult};

pub use self::chebyshev::{ChebyshevSeries, MAX_CHEBYSHEV_ORDER};
pub use self::composite::SpectrumModel;
pub use self::gaussian::TruncatedGaussian;

/// Shape family with parameters given as registry indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Gaussian { mean: usize, sigma: usize },
    Chebyshev { coefficients: Vec<usize> },
}

impl Shape {
    /// Registry indices in gradient-slot order.
    pub fn param_indices(&self) -> Vec<usize> {
        match self {
            Shape::Gaussian { mean, sigma } => vec![*mean, *sigma],
            Shape::Chebyshev { coefficients } => coefficients.clone(),
        }
    }

    pub fn n_params(&self) -> usize {
        match self {
            Shape::Gaussian { .. } => 2,
            Shape::Chebyshev { coefficients } => coefficients.len(),
        }
    }

    /// Build the kernel for the parameter values in `values` on the range of
    /// `observable`.
    pub fn prepare(&self, values: &[f64], observable: &Observable) -> FitResult<Kernel> {
        match self {
            Shape::Gaussian { mean, sigma } => Ok(Kernel::Gaussian(TruncatedGaussian::new(
                values[*mean],
                values[*sigma],
                observable.min,
                observable.max,
            )?)),
            Shape::Chebyshev { coefficients } => {
                let c: Vec<f64> = coefficients.iter().map(|&i| values[i]).collect();
                Ok(Kernel::Chebyshev(ChebyshevSeries::new(&c, observable.min, observable.max)?))
            }
        }
    }
}

/// Prepared density for one parameter point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kernel {
    Gaussian(TruncatedGaussian),
    Chebyshev(ChebyshevSeries),
}

impl Kernel {
    pub fn density(&self, x: f64) -> f64 {
        match self {
            Kernel::Gaussian(g) => g.density(x),
            Kernel::Chebyshev(c) => c.density(x),
        }
    }

    pub fn density_and_grad(&self, x: f64, grad: &mut [f64]) -> f64 {
        match self {
            Kernel::Gaussian(g) => g.density_and_grad(x, grad),
            Kernel::Chebyshev(c) => c.density_and_grad(x, grad),
        }
    }

    pub fn bin_mass(&self, lo: f64, hi: f64) -> f64 {
        match self {
            Kernel::Gaussian(g) => g.bin_mass(lo, hi),
            Kernel::Chebyshev(c) => c.bin_mass(lo, hi),
        }
    }

    pub fn bin_mass_and_grad(&self, lo: f64, hi: f64, grad: &mut [f64]) -> f64 {
        match self {
            Kernel::Gaussian(g) => g.bin_mass_and_grad(lo, hi, grad),
            Kernel::Chebyshev(c) => c.bin_mass_and_grad(lo, hi, grad),
        }
    }
}

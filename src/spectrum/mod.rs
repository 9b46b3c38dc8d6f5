//! spectrum — signal+background maximum-likelihood fits of a mass spectrum.
//!
//! Purpose
//! -------
//! Fit parametric models to a one-dimensional invariant-mass spectrum:
//! a truncated Gaussian signal and a Chebyshev background combined with
//! yields, estimated by an extended (or shape-only), optionally weighted,
//! unbinned or binned maximum likelihood.
//!
//! Key behaviors
//! -------------
//! - [`core`] validates inputs: observable, datasets, histograms, parameter
//!   declarations and the fit configuration.
//! - [`pdf`] evaluates component densities, bin masses and their analytic
//!   gradients, and the additive [`SpectrumModel`].
//! - [`models`] holds the likelihoods, the [`FitModel`] engine and the
//!   [`FitOutcome`] it returns.
//! - [`workflow`] provides the two-stage simulation → data presets.
//!
//! Invariants & assumptions
//! ------------------------
//! - Configuration errors surface as [`FitError`] before minimization;
//!   minimization failures are [`FitStatus`] values on a returned outcome.
//! - Parameter values flow into densities as a read-only slice; a fit never
//!   mutates its model or dataset.
//!
//! Downstream usage
//! ----------------
//! - Build a [`FitConfig`], call [`FitConfig::fit`] on a [`MassDataset`],
//!   and pass the outcome to `report` for the summary and projections.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests; end-to-end round trips on sampled
//!   spectra live in `tests/integration_fit_pipeline.rs`.

pub mod core;
pub mod errors;
pub mod models;
pub mod pdf;
pub mod workflow;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    ComponentSpec, DomainPolicy, FitConfig, FitOptions, Histogram, LikelihoodKind, MassDataset,
    Observable, Parameter, ParameterSet, ParameterSpec, ShapeSpec,
};
pub use self::errors::{FitError, FitResult};
pub use self::models::{FitModel, FitOutcome, FitState, FitStatus, FittedParameter, fit};
pub use self::pdf::SpectrumModel;

pub mod prelude {
    pub use super::{
        ComponentSpec, DomainPolicy, FitConfig, FitError, FitOptions, FitOutcome, FitResult,
        FitStatus, LikelihoodKind, MassDataset, Observable, ParameterSpec, SpectrumModel, fit,
    };
}

//! diphoton_fit — signal+background maximum-likelihood fits of diphoton mass
//! spectra, with optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the two-stage diphoton fit to Python via the `_diphoton_fit`
//! extension module when the `python-bindings` feature is enabled.
//!
//! Key behaviors
//! -------------
//! - Re-export the core modules: `preprocess` (records → dataset),
//!   `spectrum` (models and the fit engine), `report` (summary and
//!   projections), plus the `optimization` and `inference` layers they run
//!   on.
//! - Define the `FitResult` `#[pyclass]`, the `fit_diphoton` function and the
//!   `#[pymodule]` initializer.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input conversion and error mapping.
//! - Errors from the inner modules are converted to `PyErr` at the boundary.
//!
//! Downstream usage
//! ----------------
//! - Rust callers use [`spectrum::FitConfig`] or the presets in
//!   [`spectrum::workflow`] and can ignore the feature-gated items.
//! - Python callers import `_diphoton_fit.fits` (usually through a thin
//!   Python facade).
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and by
//!   `tests/integration_fit_pipeline.rs`.

pub mod inference;
pub mod optimization;
pub mod preprocess;
pub mod report;
pub mod spectrum;
pub mod utils;

#[cfg(feature = "python-bindings")]
use std::collections::HashMap;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    report::FitSummary,
    spectrum::{
        core::observable::Observable,
        models::outcome::FitOutcome,
        workflow::{data_fit_config, signal_shape_config},
    },
    utils::{extract_dataset, extract_mle_opts},
};

/// FitResult — Python-facing view of a [`FitOutcome`].
///
/// Key behaviors
/// -------------
/// - Expose status, minimized NLL, iteration count and the approximate
///   significance as properties.
/// - Return parameter values and errors as `dict[str, float]`.
/// - Render the text summary via `summary()` and `str()`.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "diphoton_fit.fits", name = "FitResult")]
pub struct PyFitResult {
    inner: FitOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyFitResult {
    /// Numeric status code; `0` is success.
    #[getter]
    pub fn status(&self) -> i32 {
        self.inner.status.code()
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.is_converged()
    }

    #[getter]
    pub fn nll(&self) -> f64 {
        self.inner.nll
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.iterations
    }

    /// Approximate significance of the first component's yield, `0.0` when
    /// undefined, `None` for shape-only fits.
    #[getter]
    pub fn significance(&self) -> Option<f64> {
        self.inner.significance.map(|s| s.value_or_zero())
    }

    pub fn values(&self) -> HashMap<String, f64> {
        self.inner.parameters.iter().map(|p| (p.name.clone(), p.value)).collect()
    }

    pub fn errors(&self) -> HashMap<String, f64> {
        self.inner.parameters.iter().map(|p| (p.name.clone(), p.error)).collect()
    }

    /// Names of the parameters held constant.
    pub fn fixed(&self) -> Vec<String> {
        self.inner.parameters.iter().filter(|p| p.constant).map(|p| p.name.clone()).collect()
    }

    pub fn summary(&self) -> String {
        FitSummary::new(&self.inner).to_string()
    }

    fn __str__(&self) -> String {
        self.summary()
    }
}

/// Two-stage diphoton fit from Python arrays.
///
/// Stage one fits the signal shape to the weighted simulation; stage two
/// fits data with the shape fixed. Returns `(signal, data)` results.
///
/// Errors
/// ------
/// - `ValueError` for invalid observables, datasets or optimizer options and
///   for degenerate datasets.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (
        data_masses,
        sim_masses,
        sim_weights = None,
        mass_min = 105.0,
        mass_max = 160.0,
        bins = 30,
        strict = false,
        tol_grad = None,
        tol_cost = None,
        max_iter = None,
        line_searcher = None,
        lbfgs_mem = None,
    ),
    text_signature = "(data_masses, sim_masses, /, sim_weights=None, mass_min=105.0, \
                      mass_max=160.0, bins=30, strict=False, tol_grad=None, tol_cost=None, \
                      max_iter=None, line_searcher=None, lbfgs_mem=None)"
)]
#[allow(clippy::too_many_arguments)]
pub fn fit_diphoton<'py>(
    py: Python<'py>, data_masses: &Bound<'py, PyAny>, sim_masses: &Bound<'py, PyAny>,
    sim_weights: Option<&Bound<'py, PyAny>>, mass_min: f64, mass_max: f64, bins: usize,
    strict: bool, tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
) -> PyResult<(PyFitResult, PyFitResult)> {
    let observable = Observable::new("mass", mass_min, mass_max, bins)?;
    let mle = extract_mle_opts(tol_grad, tol_cost, max_iter, line_searcher, lbfgs_mem)?;
    let simulation = extract_dataset(py, &observable, sim_masses, sim_weights, strict)?;
    let data = extract_dataset(py, &observable, data_masses, None, strict)?;

    let (signal, result) = py.allow_threads(|| {
        let mut sig_cfg = signal_shape_config(observable.clone());
        sig_cfg.options = sig_cfg.options.with_mle(mle.clone());
        let signal = sig_cfg.fit(&simulation)?;

        let mut data_cfg = data_fit_config(observable.clone(), &signal, data.len())?;
        data_cfg.options = data_cfg.options.with_mle(mle);
        let result = data_cfg.fit(&data)?;
        Ok::<_, crate::spectrum::errors::FitError>((signal, result))
    })?;
    Ok((PyFitResult { inner: signal }, PyFitResult { inner: result }))
}

/// _diphoton_fit — PyO3 module initializer.
///
/// Creates the `fits` submodule, attaches it to the parent module and
/// registers it in `sys.modules` so `diphoton_fit.fits` imports work.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _diphoton_fit<'py>(py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let fits_mod = PyModule::new(py, "fits")?;
    fits(py, m, &fits_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    py.import("sys")?.getattr("modules")?.set_item("diphoton_fit.fits", fits_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn fits<'py>(
    _py: Python, diphoton_fit: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PyFitResult>()?;
    m.add_function(wrap_pyfunction!(fit_diphoton, m)?)?;
    diphoton_fit.add_submodule(m)?;
    Ok(())
}

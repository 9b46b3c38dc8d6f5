//! Conversion helpers for the Python bindings.
//!
//! Every item here is compiled only with the `python-bindings` feature and
//! maps Python inputs onto validated Rust types, converting failures into
//! `PyErr` through the crate's error enums.

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    optimization::loglik_optimizer::traits::{LineSearcher, MLEOptions, Tolerances},
    spectrum::{
        core::{
            data::{DomainPolicy, MassDataset},
            observable::Observable,
        },
        errors::FitError,
    },
};

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArrayMethods, PyReadonlyArray1};

/// Accept a 1-D float64 numpy array, a pandas Series, or a sequence of
/// floats, returning a contiguous read-only view.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

#[cfg(feature = "python-bindings")]
fn extract_vec<'py>(py: Python<'py>, raw: &Bound<'py, PyAny>, what: &str) -> PyResult<Vec<f64>> {
    let arr = extract_f64_array(py, raw)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{what} must be a 1-D contiguous float64 array or sequence"))
    })?;
    Ok(slice.to_vec())
}

/// Build a [`MassDataset`] from Python masses and optional weights.
///
/// `strict = true` rejects masses outside the observable; otherwise they are
/// dropped.
#[cfg(feature = "python-bindings")]
pub fn extract_dataset<'py>(
    py: Python<'py>, observable: &Observable, masses: &Bound<'py, PyAny>,
    weights: Option<&Bound<'py, PyAny>>, strict: bool,
) -> PyResult<MassDataset> {
    let masses = extract_vec(py, masses, "masses")?;
    let weights = weights.map(|w| extract_vec(py, w, "weights")).transpose()?;
    let policy = if strict { DomainPolicy::Strict } else { DomainPolicy::Exclude };
    Ok(MassDataset::new(observable.clone(), masses, weights, policy)?)
}

/// Optimizer options from keyword arguments; unset values keep the
/// defaults of [`MLEOptions`].
#[cfg(feature = "python-bindings")]
pub fn extract_mle_opts(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
) -> PyResult<MLEOptions> {
    use std::str::FromStr;

    if tol_grad.is_none()
        && tol_cost.is_none()
        && max_iter.is_none()
        && line_searcher.is_none()
        && lbfgs_mem.is_none()
    {
        return Ok(MLEOptions::default());
    }
    let defaults = MLEOptions::default().tols;
    let tols = Tolerances::new(
        tol_grad.or(defaults.tol_grad),
        tol_cost.or(defaults.tol_cost),
        max_iter.or(defaults.max_iter),
    )
    .map_err(FitError::from)?;
    let ls = match line_searcher {
        Some(name) => LineSearcher::from_str(name).map_err(FitError::from)?,
        None => LineSearcher::MoreThuente,
    };
    Ok(MLEOptions::new(tols, ls, lbfgs_mem).map_err(FitError::from)?)
}

//! Negative log-likelihoods of a spectrum model.
//!
//! Purpose
//! -------
//! Evaluate the unbinned or binned negative log-likelihood of a
//! [`SpectrumModel`] for a parameter point, optionally together with its
//! analytic gradient with respect to every registry parameter.
//!
//! Key behaviors
//! -------------
//! - Unbinned, extended: `-Σ_i w_i ln D(x_i) + N`.
//! - Unbinned, non-extended: `-Σ_i w_i ln D(x_i) + W ln N`, which equals
//!   `-Σ_i w_i ln(D(x_i)/N)`.
//! - Binned, extended: `Σ_b [ν_b - n_b ln ν_b]`.
//! - Binned, non-extended: `-Σ_b n_b ln ν_b + W ln N`.
//!
//! Here `D(x) = Σ_k n_k f_k(x)`, `N = Σ_k n_k` (one for a shape-only model),
//! `W` is the total event weight, `n_b` the weighted bin content, and
//! `ν_b = Σ_k n_k F_k(b)` with `F_k(b)` the mass of component `k` in bin `b`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `D(x_i) > 0` for every event and `ν_b > 0` for every non-empty bin;
//!   otherwise [`FitError::InvalidDensity`] is returned. The fit engine
//!   turns that error into a penalty while minimizing.
//! - Gradients are written into a slice indexed by registry position and
//!   are accumulated, so shared parameters receive every contribution.
use crate::spectrum::{
    core::{
        data::MassDataset, histogram::Histogram, observable::Observable, options::LikelihoodKind,
    },
    errors::{FitError, FitResult},
    pdf::{Kernel, composite::SpectrumModel},
};

/// Data in the form a likelihood consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum LikelihoodInput {
    Unbinned(MassDataset),
    Binned(Histogram),
}

impl LikelihoodInput {
    /// Event list or histogram over `observable`, per `kind`.
    pub fn new(data: &MassDataset, kind: LikelihoodKind, observable: &Observable) -> Self {
        match kind {
            LikelihoodKind::Unbinned => LikelihoodInput::Unbinned(data.clone()),
            LikelihoodKind::Binned => {
                LikelihoodInput::Binned(Histogram::from_dataset(data, observable))
            }
        }
    }

    /// Total event weight `W`.
    pub fn sum_weights(&self) -> f64 {
        match self {
            LikelihoodInput::Unbinned(d) => d.sum_weights(),
            LikelihoodInput::Binned(h) => h.total(),
        }
    }
}

/// Negative log-likelihood at `values`, with the gradient accumulated into
/// `grad` when given.
///
/// Parameters
/// ----------
/// - `model`: resolved spectrum model.
/// - `input`: events or histogram.
/// - `values`: full registry values.
/// - `extended`: include the Poisson term of the total yield.
/// - `grad`: optional output of length `values.len()`; overwritten.
///
/// Errors
/// ------
/// - `InvalidShapeParameter` when a component cannot be prepared at
///   `values`.
/// - `InvalidDensity` for a non-positive or non-finite density, expected
///   bin count, or total yield where a logarithm is needed.
pub fn negative_log_likelihood(
    model: &SpectrumModel, input: &LikelihoodInput, values: &[f64], extended: bool,
    grad: Option<&mut [f64]>,
) -> FitResult<f64> {
    let kernels = model.prepare(values)?;
    let yields = model.yields(values);
    let total: f64 = yields.iter().sum();
    let weight = input.sum_weights();

    let mut grad = grad;
    if let Some(g) = grad.as_deref_mut() {
        g.iter_mut().for_each(|v| *v = 0.0);
    }

    let mut nll = match input {
        LikelihoodInput::Unbinned(data) => {
            unbinned_terms(model, &kernels, &yields, data, grad.as_deref_mut())?
        }
        LikelihoodInput::Binned(hist) => {
            binned_terms(model, &kernels, &yields, hist, extended, grad.as_deref_mut())?
        }
    };

    // Normalization term; the binned extended form already carries Σ ν_b.
    let unbinned = matches!(input, LikelihoodInput::Unbinned(_));
    if extended {
        if unbinned {
            nll += total;
            if let Some(g) = grad.as_deref_mut() {
                for i in model.yield_indices() {
                    g[i] += 1.0;
                }
            }
        }
    } else {
        if !total.is_finite() || total <= 0.0 {
            return Err(FitError::InvalidDensity { x: f64::NAN, value: total });
        }
        nll += weight * total.ln();
        if let Some(g) = grad.as_deref_mut() {
            for i in model.yield_indices() {
                g[i] += weight / total;
            }
        }
    }
    Ok(nll)
}

fn unbinned_terms(
    model: &SpectrumModel, kernels: &[Kernel], yields: &[f64], data: &MassDataset,
    mut grad: Option<&mut [f64]>,
) -> FitResult<f64> {
    let width = model.components.iter().map(|c| c.shape.n_params()).max().unwrap_or(0);
    let mut comp_f = vec![0.0; kernels.len()];
    let mut comp_g = vec![0.0; kernels.len() * width];
    let mut nll = 0.0;

    for (&x, &w) in data.masses.iter().zip(data.weights.iter()) {
        let mut dens = 0.0;
        for (k, kernel) in kernels.iter().enumerate() {
            comp_f[k] = if grad.is_some() {
                kernel.density_and_grad(x, &mut comp_g[k * width..(k + 1) * width])
            } else {
                kernel.density(x)
            };
            dens += yields[k] * comp_f[k];
        }
        if !dens.is_finite() || dens <= 0.0 {
            return Err(FitError::InvalidDensity { x, value: dens });
        }
        nll -= w * dens.ln();

        if let Some(g) = grad.as_deref_mut() {
            let c = -w / dens;
            for (k, comp) in model.components.iter().enumerate() {
                if let Some(iy) = comp.yield_index {
                    g[iy] += c * comp_f[k];
                }
                for (j, p) in comp.shape.param_indices().into_iter().enumerate() {
                    g[p] += c * yields[k] * comp_g[k * width + j];
                }
            }
        }
    }
    Ok(nll)
}

fn binned_terms(
    model: &SpectrumModel, kernels: &[Kernel], yields: &[f64], hist: &Histogram, extended: bool,
    mut grad: Option<&mut [f64]>,
) -> FitResult<f64> {
    let width = model.components.iter().map(|c| c.shape.n_params()).max().unwrap_or(0);
    let mut comp_m = vec![0.0; kernels.len()];
    let mut comp_g = vec![0.0; kernels.len() * width];
    let edges = hist.bin_edges();
    let mut nll = 0.0;

    for (b, &n_b) in hist.contents.iter().enumerate() {
        let (lo, hi) = (edges[b], edges[b + 1]);
        let mut nu = 0.0;
        for (k, kernel) in kernels.iter().enumerate() {
            comp_m[k] = if grad.is_some() {
                kernel.bin_mass_and_grad(lo, hi, &mut comp_g[k * width..(k + 1) * width])
            } else {
                kernel.bin_mass(lo, hi)
            };
            nu += yields[k] * comp_m[k];
        }
        let has_content = n_b != 0.0;
        if has_content && (!nu.is_finite() || nu <= 0.0) {
            return Err(FitError::InvalidDensity { x: 0.5 * (lo + hi), value: nu });
        }
        if extended {
            nll += nu;
        }
        if has_content {
            nll -= n_b * nu.ln();
        }

        if let Some(g) = grad.as_deref_mut() {
            let ratio = if has_content { n_b / nu } else { 0.0 };
            let c = if extended { 1.0 - ratio } else { -ratio };
            for (k, comp) in model.components.iter().enumerate() {
                if let Some(iy) = comp.yield_index {
                    g[iy] += c * comp_m[k];
                }
                for (j, p) in comp.shape.param_indices().into_iter().enumerate() {
                    g[p] += c * yields[k] * comp_g[k * width + j];
                }
            }
        }
    }
    Ok(nll)
}

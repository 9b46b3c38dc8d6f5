//! Plot-ready projections of a fitted model onto the data histogram.
//!
//! Purpose
//! -------
//! Produce the numbers a plotting front end needs to draw the usual
//! spectrum figure: data points with `sqrt(Σw²)` errors, the total model
//! curve and one curve per component. Drawing is left to the caller.
//!
//! Conventions
//! -----------
//! - Curves are in events per bin: the model density (events per unit of
//!   the observable) times the bin width. A shape-only model is scaled by the
//!   data's sum of weights.
//! - Curve abscissae are `n_points` equally spaced values spanning
//!   `[min, max]` inclusive.
use crate::spectrum::{
    core::{data::MassDataset, histogram::Histogram},
    errors::{FitError, FitResult},
    pdf::SpectrumModel,
};
use ndarray::Array1;

/// Curve of one model component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentCurve {
    pub name: String,
    pub y: Array1<f64>,
}

/// `Projection` — data points and model curves on a common scale.
///
/// Fields
/// ------
/// - `bin_centers`, `contents`, `errors`: the data histogram.
/// - `x`: curve abscissae.
/// - `total`: total model curve at `x`.
/// - `components`: per-component curves at `x`, in model order.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub bin_centers: Array1<f64>,
    pub contents: Array1<f64>,
    pub errors: Array1<f64>,
    pub x: Array1<f64>,
    pub total: Array1<f64>,
    pub components: Vec<ComponentCurve>,
}

/// Project `model` at `values` onto the histogram of `data`.
///
/// Parameters
/// ----------
/// - `model`: fitted model; its observable fixes the binning.
/// - `values`: registry values, e.g. [`FitOutcome::values`].
/// - `data`: dataset shown as points.
/// - `n_points`: curve resolution, at least 2.
///
/// Errors
/// ------
/// - `InvalidModel` when `n_points < 2`.
/// - Density errors when `values` is not a valid parameter point.
///
/// [`FitOutcome::values`]: crate::spectrum::models::outcome::FitOutcome::values
pub fn project(
    model: &SpectrumModel, values: &[f64], data: &MassDataset, n_points: usize,
) -> FitResult<Projection> {
    if n_points < 2 {
        return Err(FitError::InvalidModel { reason: "A projection needs at least two curve points." });
    }
    let obs = &model.observable;
    let hist = Histogram::from_dataset(data, obs);

    let scale = if model.is_shape_only() {
        obs.bin_width() * data.sum_weights()
    } else {
        obs.bin_width()
    };
    let x = Array1::linspace(obs.min, obs.max, n_points);

    let mut total = Array1::<f64>::zeros(n_points);
    let mut components = Vec::with_capacity(model.components.len());
    for (k, comp) in model.components.iter().enumerate() {
        let y = x
            .iter()
            .map(|&xi| model.component_density(k, xi, values).map(|d| d * scale))
            .collect::<FitResult<Vec<f64>>>()?;
        let y = Array1::from(y);
        total += &y;
        components.push(ComponentCurve { name: comp.name.clone(), y });
    }

    Ok(Projection {
        bin_centers: hist.bin_centers(),
        contents: hist.contents.clone(),
        errors: hist.errors(),
        x,
        total,
        components,
    })
}

//! Additive signal+background model.
//!
//! Purpose
//! -------
//! Combine component shapes into the expected event density
//! `D(x) = Σ_k n_k f_k(x)`, where the yields `n_k` carry the absolute
//! normalization. A single component without a yield is a shape-only model
//! with `D(x) = f(x)`.
//!
//! Key behaviors
//! -------------
//! - [`SpectrumModel::from_config`] resolves every parameter name to a
//!   registry index once; evaluation afterwards works on indices and a value
//!   slice only.
//! - [`SpectrumModel::density`] and [`SpectrumModel::component_density`]
//!   are the public evaluation surface used by plotting and reporting.
//!
//! Invariants & assumptions
//! ------------------------
//! - Either every component has a yield or there is exactly one component
//!   and it has none.
//! - Chebyshev orders lie in `1..=MAX_CHEBYSHEV_ORDER`.
use crate::spectrum::{
    core::{
        config::{FitConfig, ShapeSpec},
        observable::Observable,
        params::ParameterSet,
    },
    errors::{FitError, FitResult},
    pdf::{Kernel, MAX_CHEBYSHEV_ORDER, Shape},
};

/// One resolved component.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub name: String,
    pub shape: Shape,
    /// Registry index of the yield, `None` for a shape-only model.
    pub yield_index: Option<usize>,
}

/// `SpectrumModel` — observable, parameter registry and components.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumModel {
    pub observable: Observable,
    pub parameters: ParameterSet,
    pub components: Vec<Component>,
}

impl SpectrumModel {
    /// Resolve a [`FitConfig`] into a model.
    ///
    /// Errors
    /// ------
    /// - Parameter resolution errors from
    ///   [`ParameterSet::from_specs`].
    /// - `UnknownParameter` for a component referring to an undeclared name.
    /// - `InvalidModel` for an empty component list, a Chebyshev order out of
    ///   range, or a mix of yield and shape-only components.
    pub fn from_config(config: &FitConfig) -> FitResult<Self> {
        let parameters = ParameterSet::from_specs(&config.parameters)?;
        if config.components.is_empty() {
            return Err(FitError::InvalidModel { reason: "At least one component is required." });
        }

        let mut components = Vec::with_capacity(config.components.len());
        for spec in &config.components {
            let shape = match &spec.shape {
                ShapeSpec::Gaussian { mean, sigma } => Shape::Gaussian {
                    mean: parameters.index_of(mean)?,
                    sigma: parameters.index_of(sigma)?,
                },
                ShapeSpec::Chebyshev { coefficients } => {
                    if coefficients.is_empty() || coefficients.len() > MAX_CHEBYSHEV_ORDER {
                        return Err(FitError::InvalidModel {
                            reason: "Chebyshev order must lie between 1 and 8.",
                        });
                    }
                    let idx = coefficients
                        .iter()
                        .map(|name| parameters.index_of(name))
                        .collect::<FitResult<Vec<usize>>>()?;
                    Shape::Chebyshev { coefficients: idx }
                }
            };
            let yield_index = match &spec.yield_param {
                Some(name) => Some(parameters.index_of(name)?),
                None => None,
            };
            components.push(Component { name: spec.name.clone(), shape, yield_index });
        }

        let with_yield = components.iter().filter(|c| c.yield_index.is_some()).count();
        if with_yield != components.len() && !(components.len() == 1 && with_yield == 0) {
            return Err(FitError::InvalidModel {
                reason: "Every component needs a yield unless the model is a single shape-only component.",
            });
        }

        Ok(SpectrumModel { observable: config.observable.clone(), parameters, components })
    }

    pub fn is_shape_only(&self) -> bool {
        self.components.iter().all(|c| c.yield_index.is_none())
    }

    /// Registry indices of the yield parameters.
    pub fn yield_indices(&self) -> Vec<usize> {
        self.components.iter().filter_map(|c| c.yield_index).collect()
    }

    /// Yield of every component; `[1.0]` for a shape-only model.
    pub fn yields(&self, values: &[f64]) -> Vec<f64> {
        self.components.iter().map(|c| c.yield_index.map_or(1.0, |i| values[i])).collect()
    }

    pub fn total_yield(&self, values: &[f64]) -> f64 {
        self.yields(values).iter().sum()
    }

    /// Kernels of every component at `values`.
    pub fn prepare(&self, values: &[f64]) -> FitResult<Vec<Kernel>> {
        self.components.iter().map(|c| c.shape.prepare(values, &self.observable)).collect()
    }

    /// Expected event density at `x` (events per unit of the observable);
    /// the normalized density for a shape-only model. Zero outside the range.
    pub fn density(&self, x: f64, values: &[f64]) -> FitResult<f64> {
        if !self.observable.contains(x) {
            return Ok(0.0);
        }
        let kernels = self.prepare(values)?;
        Ok(self.yields(values).iter().zip(kernels.iter()).map(|(n, k)| n * k.density(x)).sum())
    }

    /// Contribution of component `k` to [`SpectrumModel::density`].
    pub fn component_density(&self, k: usize, x: f64, values: &[f64]) -> FitResult<f64> {
        let comp = self
            .components
            .get(k)
            .ok_or(FitError::InvalidModel { reason: "Component index out of range." })?;
        if !self.observable.contains(x) {
            return Ok(0.0);
        }
        let kernel = comp.shape.prepare(values, &self.observable)?;
        Ok(comp.yield_index.map_or(1.0, |i| values[i]) * kernel.density(x))
    }

    /// Index of the component called `name`.
    pub fn component_index(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.name == name)
    }
}

//! Declarative fit configuration.
//!
//! Purpose
//! -------
//! Describe a spectrum fit as plain data: the observable, the parameter
//! declarations, the components with their shapes and optional yields, and
//! the [`FitOptions`]. A [`FitConfig`] is turned into a
//! [`SpectrumModel`] once, which resolves every name to a registry index.
//!
//! Conventions
//! -----------
//! - Components are evaluated in declaration order; the first component is
//!   the one whose yield drives the reported significance.
//! - A component without a yield makes the model shape-only; shape-only
//!   models have exactly one component.
use crate::spectrum::{
    core::{data::MassDataset, observable::Observable, options::FitOptions, params::ParameterSpec},
    errors::FitResult,
    models::{fit::fit, outcome::FitOutcome},
    pdf::composite::SpectrumModel,
};

/// Parametric shape of one component, with parameters referenced by name.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeSpec {
    /// Gaussian truncated to the observable range.
    Gaussian { mean: String, sigma: String },
    /// Chebyshev series `1 + Σ c_k T_k`, one name per coefficient.
    Chebyshev { coefficients: Vec<String> },
}

/// One additive component of the spectrum model.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpec {
    pub name: String,
    pub shape: ShapeSpec,
    pub yield_param: Option<String>,
}

impl ComponentSpec {
    pub fn gaussian(name: impl Into<String>, mean: &str, sigma: &str) -> Self {
        ComponentSpec {
            name: name.into(),
            shape: ShapeSpec::Gaussian { mean: mean.to_string(), sigma: sigma.to_string() },
            yield_param: None,
        }
    }

    pub fn chebyshev(name: impl Into<String>, coefficients: &[&str]) -> Self {
        ComponentSpec {
            name: name.into(),
            shape: ShapeSpec::Chebyshev {
                coefficients: coefficients.iter().map(|c| c.to_string()).collect(),
            },
            yield_param: None,
        }
    }

    pub fn with_yield(mut self, yield_param: &str) -> Self {
        self.yield_param = Some(yield_param.to_string());
        self
    }
}

/// `FitConfig` — everything needed to build a model and run a fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    pub observable: Observable,
    pub parameters: Vec<ParameterSpec>,
    pub components: Vec<ComponentSpec>,
    pub options: FitOptions,
}

impl FitConfig {
    pub fn new(observable: Observable, options: FitOptions) -> Self {
        FitConfig { observable, parameters: Vec::new(), components: Vec::new(), options }
    }

    pub fn with_parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    pub fn with_component(mut self, component: ComponentSpec) -> Self {
        self.components.push(component);
        self
    }

    /// Resolve names and parameters into a [`SpectrumModel`].
    ///
    /// Errors
    /// ------
    /// - Parameter resolution errors, `UnknownParameter` and `InvalidModel`
    ///   from [`SpectrumModel::from_config`].
    pub fn build_model(&self) -> FitResult<SpectrumModel> {
        SpectrumModel::from_config(self)
    }

    /// Build the model and fit `data` with this configuration's options.
    pub fn fit(&self, data: &MassDataset) -> FitResult<FitOutcome> {
        let model = self.build_model()?;
        fit(&model, data, &self.options)
    }

    /// Copy of this configuration that starts every parameter from its value
    /// in `outcome`. Parameters missing from the outcome keep their `init`.
    pub fn refit_from(&self, outcome: &FitOutcome) -> FitConfig {
        let mut out = self.clone();
        for spec in out.parameters.iter_mut() {
            if let Some(v) = outcome.value(&spec.name) {
                spec.init = Some(v);
            }
        }
        out
    }
}

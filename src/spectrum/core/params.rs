//! Parameter specifications and the resolved parameter registry.
//!
//! Purpose
//! -------
//! Turn user-facing [`ParameterSpec`] declarations into a [`ParameterSet`]:
//! an ordered registry of tagged [`Parameter`] variants addressed by index.
//! Densities read parameter values from a plain slice of this registry at
//! evaluation time; nothing in the registry is shared or mutated during a
//! fit.
//!
//! Key behaviors
//! -------------
//! - [`ParameterSpec::resolve`] validates bounds and the initial value and
//!   produces `Floating` or `Fixed`.
//! - [`ParameterSet`] maps names to indices, lists the floating parameters,
//!   and converts between full external values and the optimizer's
//!   unconstrained vector through [`BoundTransform`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Names are unique within a set.
//! - A floating parameter's value lies within its bounds.
//! - Bounds, when present, are finite with `lower < upper`.
//!
//! Conventions
//! -----------
//! - "External" values are the physical parameter values; "internal" values
//!   are the unconstrained coordinates the optimizer moves.
//! - The optimizer vector holds floating parameters only, in registry order.
use crate::{
    optimization::{loglik_optimizer::Theta, numerical_stability::transformations::BoundTransform},
    spectrum::errors::{FitError, FitResult},
};
use std::collections::HashMap;

/// Optional lower and upper limits of a floating parameter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl Bounds {
    pub fn contains(&self, x: f64) -> bool {
        self.lower.map_or(true, |lo| x >= lo) && self.upper.map_or(true, |hi| x <= hi)
    }

    pub fn transform(&self) -> BoundTransform {
        BoundTransform::from_bounds(self.lower, self.upper)
    }
}

/// Resolved parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parameter {
    Floating { value: f64, bounds: Bounds },
    Fixed { value: f64 },
}

impl Parameter {
    pub fn value(&self) -> f64 {
        match *self {
            Parameter::Floating { value, .. } | Parameter::Fixed { value } => value,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Parameter::Fixed { .. })
    }
}

/// User declaration of a parameter.
///
/// Fields
/// ------
/// - `name`: unique key that components refer to.
/// - `init`: starting value; `None` takes the midpoint of two-sided bounds.
/// - `bounds`: optional limits for a floating parameter.
/// - `constant`: when `true` the parameter is held at `init` during the fit.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub init: Option<f64>,
    pub bounds: Bounds,
    pub constant: bool,
}

impl ParameterSpec {
    /// Unbounded floating parameter starting at `init`.
    pub fn new(name: impl Into<String>, init: f64) -> Self {
        ParameterSpec { name: name.into(), init: Some(init), bounds: Bounds::default(), constant: false }
    }

    /// Floating parameter on `[lower, upper]` starting at the midpoint.
    pub fn bounded(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        ParameterSpec {
            name: name.into(),
            init: None,
            bounds: Bounds { lower: Some(lower), upper: Some(upper) },
            constant: false,
        }
    }

    /// Parameter held at `value`.
    pub fn fixed(name: impl Into<String>, value: f64) -> Self {
        ParameterSpec { name: name.into(), init: Some(value), bounds: Bounds::default(), constant: true }
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.bounds = Bounds { lower: Some(lower), upper: Some(upper) };
        self
    }

    pub fn with_lower(mut self, lower: f64) -> Self {
        self.bounds.lower = Some(lower);
        self
    }

    pub fn with_init(mut self, init: f64) -> Self {
        self.init = Some(init);
        self
    }

    pub fn constant(mut self, constant: bool) -> Self {
        self.constant = constant;
        self
    }

    /// Validate the declaration and produce a [`Parameter`].
    ///
    /// Errors
    /// ------
    /// - `InvalidParameterConfiguration` when a bound or the initial value is
    ///   not finite, when `lower >= upper`, when a floating initial value
    ///   lies outside its bounds, or when no initial value can be derived.
    pub fn resolve(&self) -> FitResult<Parameter> {
        let err = |reason: &'static str| FitError::InvalidParameterConfiguration {
            name: self.name.clone(),
            reason,
        };
        let Bounds { lower, upper } = self.bounds;
        if lower.is_some_and(|v| !v.is_finite()) || upper.is_some_and(|v| !v.is_finite()) {
            return Err(err("Bounds must be finite."));
        }
        if let (Some(lo), Some(hi)) = (lower, upper) {
            if lo >= hi {
                return Err(err("Lower bound must be strictly below the upper bound."));
            }
        }
        if self.constant && self.init.is_none() {
            return Err(err("A constant parameter needs a fixed value."));
        }
        let value = match (self.init, lower, upper) {
            (Some(v), _, _) => v,
            (None, Some(lo), Some(hi)) => 0.5 * (lo + hi),
            (None, _, _) => {
                return Err(err("No initial value given and no two-sided bounds to derive one."));
            }
        };
        if !value.is_finite() {
            return Err(err("Initial value must be finite."));
        }
        if self.constant {
            return Ok(Parameter::Fixed { value });
        }
        if !self.bounds.contains(value) {
            return Err(err("Initial value lies outside the bounds."));
        }
        Ok(Parameter::Floating { value, bounds: self.bounds })
    }
}

/// `ParameterSet` — ordered registry of resolved parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    names: Vec<String>,
    params: Vec<Parameter>,
    index: HashMap<String, usize>,
}

impl ParameterSet {
    /// Resolve every spec, in order.
    ///
    /// Errors
    /// ------
    /// - Any error of [`ParameterSpec::resolve`].
    /// - `InvalidParameterConfiguration` for a duplicate name.
    pub fn from_specs(specs: &[ParameterSpec]) -> FitResult<Self> {
        let mut names = Vec::with_capacity(specs.len());
        let mut params = Vec::with_capacity(specs.len());
        let mut index = HashMap::with_capacity(specs.len());
        for spec in specs {
            if index.contains_key(&spec.name) {
                return Err(FitError::InvalidParameterConfiguration {
                    name: spec.name.clone(),
                    reason: "Duplicate parameter name.",
                });
            }
            params.push(spec.resolve()?);
            index.insert(spec.name.clone(), names.len());
            names.push(spec.name.clone());
        }
        Ok(ParameterSet { names, params, index })
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, i: usize) -> &str {
        &self.names[i]
    }

    pub fn get(&self, i: usize) -> &Parameter {
        &self.params[i]
    }

    /// Registry index of `name`.
    ///
    /// Errors
    /// ------
    /// - `UnknownParameter` when the name was never declared.
    pub fn index_of(&self, name: &str) -> FitResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| FitError::UnknownParameter { name: name.to_string() })
    }

    /// Current external values of every parameter, in registry order.
    pub fn values(&self) -> Vec<f64> {
        self.params.iter().map(Parameter::value).collect()
    }

    /// Registry indices of the floating parameters.
    pub fn floating_indices(&self) -> Vec<usize> {
        self.params.iter().enumerate().filter(|(_, p)| !p.is_fixed()).map(|(i, _)| i).collect()
    }

    /// Bound transforms of the floating parameters, in optimizer order.
    pub fn transforms(&self) -> Vec<BoundTransform> {
        self.params
            .iter()
            .filter_map(|p| match p {
                Parameter::Floating { bounds, .. } => Some(bounds.transform()),
                Parameter::Fixed { .. } => None,
            })
            .collect()
    }

    /// Internal optimizer vector for the current floating values.
    pub fn encode(&self) -> Theta {
        self.params
            .iter()
            .filter_map(|p| match *p {
                Parameter::Floating { value, bounds } => Some(bounds.transform().to_internal(value)),
                Parameter::Fixed { .. } => None,
            })
            .collect()
    }

    /// Full external value vector for an optimizer vector `theta`.
    ///
    /// Fixed entries keep their registry values. `theta` must hold one entry
    /// per floating parameter.
    pub fn decode(&self, theta: &Theta) -> Vec<f64> {
        let mut out = self.values();
        let mut k = 0;
        for (i, p) in self.params.iter().enumerate() {
            if let Parameter::Floating { bounds, .. } = p {
                out[i] = bounds.transform().to_external(theta[k]);
                k += 1;
            }
        }
        out
    }

    /// Copy of the registry with every value replaced by `values`.
    ///
    /// Floating values are clamped into their bounds.
    pub fn with_values(&self, values: &[f64]) -> ParameterSet {
        let params = self
            .params
            .iter()
            .zip(values.iter())
            .map(|(p, &v)| match *p {
                Parameter::Floating { bounds, .. } => {
                    let lo = bounds.lower.unwrap_or(f64::NEG_INFINITY);
                    let hi = bounds.upper.unwrap_or(f64::INFINITY);
                    Parameter::Floating { value: v.clamp(lo, hi), bounds }
                }
                Parameter::Fixed { .. } => Parameter::Fixed { value: v },
            })
            .collect();
        ParameterSet { names: self.names.clone(), params, index: self.index.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Resolution rules of `ParameterSpec` (midpoint default, bound checks,
    //   constant parameters).
    // - Registry lookup, duplicate detection, and encode/decode through the
    //   bound transforms.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A two-sided spec without `init` starts at the midpoint; a one-sided
    // spec without `init` is rejected.
    fn resolve_derives_midpoint_or_fails() {
        // Act
        let mid = ParameterSpec::bounded("mean", 120.0, 130.0).resolve().expect("midpoint");
        let one_sided = ParameterSpec {
            name: "sigma".to_string(),
            init: None,
            bounds: Bounds { lower: Some(0.1), upper: None },
            constant: false,
        }
        .resolve();

        // Assert
        assert_relative_eq!(mid.value(), 125.0);
        assert!(matches!(one_sided, Err(FitError::InvalidParameterConfiguration { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Inverted bounds and an out-of-bounds floating init are rejected, while
    // a constant parameter ignores its bounds.
    fn resolve_checks_bounds_and_init() {
        let inverted = ParameterSpec::new("a", 0.0).with_bounds(1.0, -1.0).resolve();
        let outside = ParameterSpec::new("a", 3.0).with_bounds(-2.0, 2.0).resolve();
        let fixed = ParameterSpec::new("a", 3.0).with_bounds(-2.0, 2.0).constant(true).resolve();

        assert!(inverted.is_err());
        assert!(outside.is_err());
        assert_eq!(fixed.expect("constant"), Parameter::Fixed { value: 3.0 });
    }

    #[test]
    // Purpose
    // -------
    // A constant parameter without a value is a configuration error even
    // when its bounds would give a midpoint.
    fn constant_without_value_is_rejected() {
        let res = ParameterSpec::bounded("mean", 120.0, 130.0).constant(true).resolve();

        assert!(matches!(
            res,
            Err(FitError::InvalidParameterConfiguration { ref name, .. }) if name == "mean"
        ));
    }

    #[test]
    // Purpose
    // -------
    // Duplicate names are rejected and unknown names are reported.
    fn registry_detects_duplicates_and_unknown_names() {
        let dup = ParameterSet::from_specs(&[ParameterSpec::new("x", 1.0), ParameterSpec::new("x", 2.0)]);
        let set = ParameterSet::from_specs(&[ParameterSpec::new("x", 1.0)]).expect("valid set");

        assert!(matches!(dup, Err(FitError::InvalidParameterConfiguration { .. })));
        assert!(matches!(set.index_of("y"), Err(FitError::UnknownParameter { .. })));
        assert_eq!(set.index_of("x").expect("declared"), 0);
    }

    #[test]
    // Purpose
    // -------
    // `decode(encode())` reproduces the registry values, and fixed
    // parameters never enter the optimizer vector.
    //
    // Given
    // -----
    // - One fixed, one unbounded, one lower-bounded and one two-sided
    //   parameter.
    fn encode_decode_round_trip_skips_fixed_parameters() {
        // Arrange
        let set = ParameterSet::from_specs(&[
            ParameterSpec::fixed("mean", 125.0),
            ParameterSpec::new("c1", -0.5),
            ParameterSpec::new("sigma", 2.0).with_lower(0.1),
            ParameterSpec::new("nsig", 50.0).with_bounds(-500.0, 2000.0),
        ])
        .expect("valid set");

        // Act
        let theta = set.encode();
        let values = set.decode(&theta);

        // Assert
        assert_eq!(theta.len(), 3);
        assert_eq!(set.floating_indices(), vec![1, 2, 3]);
        assert_eq!(set.transforms().len(), 3);
        for (a, b) in values.iter().zip(array![125.0, -0.5, 2.0, 50.0].iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    // Purpose
    // -------
    // `with_values` replaces values and clamps floating ones into bounds.
    fn with_values_clamps_into_bounds() {
        let set = ParameterSet::from_specs(&[
            ParameterSpec::new("a", 0.0).with_bounds(-1.0, 1.0),
            ParameterSpec::fixed("b", 4.0),
        ])
        .expect("valid set");

        let moved = set.with_values(&[3.0, 5.0]);

        assert_relative_eq!(moved.values()[0], 1.0);
        assert_relative_eq!(moved.values()[1], 5.0);
    }
}

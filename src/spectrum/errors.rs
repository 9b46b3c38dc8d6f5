//! Errors for spectrum fits (observable and dataset validation, parameter
//! configuration, density evaluation, and optimizer failures).
//!
//! This module defines [`FitError`], the error type of the spectrum layer,
//! and the alias [`FitResult`]. Configuration problems are reported before
//! any minimization starts; failures *during* minimization are not errors
//! but statuses recorded on the returned fit outcome.
//!
//! ## Conventions
//! - **Indices are 0-based** and refer to the event order of the input.
//! - Masses are in GeV; weights may be negative but must be finite.
//! - Invalid densities inside the minimizer are handled by the fit engine;
//!   [`FitError::is_invalid_region`] identifies them.
use crate::optimization::errors::OptError;

/// Result alias for spectrum-layer operations.
pub type FitResult<T> = Result<T, FitError>;

/// Unified error type for spectrum fitting.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    // ---- Observable / dataset ----
    /// Observable range or binning is unusable.
    InvalidObservable { min: f64, max: f64, bins: usize, reason: &'static str },

    /// Mass or weight of an event is NaN/±inf.
    NonFiniteEvent { index: usize, field: &'static str, value: f64 },

    /// Masses and weights have different lengths.
    LengthMismatch { masses: usize, weights: usize },

    /// Event lies outside the observable range under a strict domain policy.
    DomainMismatch { index: usize, value: f64, min: f64, max: f64 },

    /// No events, or a total weight that is not positive enough to fit.
    DegenerateDataset { events: usize, sum_weights: f64 },

    // ---- Parameters ----
    /// A parameter specification is inconsistent (bounds, initial value,
    /// duplicate name, or incompatible with the fit options).
    InvalidParameterConfiguration { name: String, reason: &'static str },

    /// A component refers to a parameter name that was never declared.
    UnknownParameter { name: String },

    // ---- Model ----
    /// The component layout cannot form a model.
    InvalidModel { reason: &'static str },

    /// A shape parameter is outside the region where the density exists
    /// (e.g. a non-positive width).
    InvalidShapeParameter { name: &'static str, value: f64 },

    /// The model density at `x` is non-positive or non-finite.
    InvalidDensity { x: f64, value: f64 },

    // ---- Estimation / optimizer ----
    /// Optimizer configuration or backend failure.
    Optimization(OptError),
}

impl FitError {
    /// `true` for errors that only mean "this parameter point is outside the
    /// region where the likelihood exists".
    pub fn is_invalid_region(&self) -> bool {
        matches!(self, FitError::InvalidDensity { .. } | FitError::InvalidShapeParameter { .. })
    }
}

impl std::error::Error for FitError {}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Observable / dataset ----
            FitError::InvalidObservable { min, max, bins, reason } => {
                write!(f, "Invalid observable [{min}, {max}] with {bins} bins: {reason}")
            }
            FitError::NonFiniteEvent { index, field, value } => {
                write!(f, "Non-finite {field} at event {index}: {value}")
            }
            FitError::LengthMismatch { masses, weights } => {
                write!(f, "Got {masses} masses but {weights} weights")
            }
            FitError::DomainMismatch { index, value, min, max } => {
                write!(f, "Event {index} with mass {value} lies outside [{min}, {max}]")
            }
            FitError::DegenerateDataset { events, sum_weights } => write!(
                f,
                "Degenerate dataset: {events} events with total weight {sum_weights}"
            ),

            // ---- Parameters ----
            FitError::InvalidParameterConfiguration { name, reason } => {
                write!(f, "Invalid configuration for parameter '{name}': {reason}")
            }
            FitError::UnknownParameter { name } => write!(f, "Unknown parameter '{name}'"),

            // ---- Model ----
            FitError::InvalidModel { reason } => write!(f, "Invalid model: {reason}"),
            FitError::InvalidShapeParameter { name, value } => {
                write!(f, "Shape parameter {name} = {value} is outside its valid range")
            }
            FitError::InvalidDensity { x, value } => {
                write!(f, "Model density at x = {x} must be finite and > 0, got {value}")
            }

            // ---- Estimation / optimizer ----
            FitError::Optimization(err) => write!(f, "Optimization error: {err}"),
        }
    }
}

impl From<OptError> for FitError {
    fn from(err: OptError) -> Self {
        FitError::Optimization(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<FitError> for pyo3::PyErr {
    fn from(err: FitError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Conversions between the fit and optimizer error surfaces and the
    // invalid-region classification.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Density failures cross into the optimizer as `InvalidDensity`, and
    // wrapped optimizer errors unwrap instead of nesting.
    fn fit_errors_convert_into_optimizer_errors() {
        // Arrange
        let density = FitError::InvalidDensity { x: 110.0, value: -0.5 };
        let wrapped = FitError::Optimization(OptError::NoTolerancesProvided);
        let other = FitError::UnknownParameter { name: "nsig".to_string() };

        // Act
        let a: OptError = density.into();
        let b: OptError = wrapped.into();
        let c: OptError = other.into();

        // Assert
        assert_eq!(a, OptError::InvalidDensity { value: -0.5 });
        assert_eq!(b, OptError::NoTolerancesProvided);
        assert!(matches!(c, OptError::ModelEvaluation { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Only density and shape-range errors count as an invalid region.
    fn invalid_region_classification() {
        assert!(FitError::InvalidDensity { x: 0.0, value: 0.0 }.is_invalid_region());
        assert!(FitError::InvalidShapeParameter { name: "sigma", value: -1.0 }.is_invalid_region());
        assert!(!FitError::DegenerateDataset { events: 0, sum_weights: 0.0 }.is_invalid_region());
    }
}

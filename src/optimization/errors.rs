//! optimization::errors — error surface of the optimizer layer.
//!
//! Covers option validation, gradient/Hessian checks, outcome validation
//! and errors raised inside argmin. Likelihood failures coming from the
//! spectrum layer are folded in through `From<FitError>`.
use argmin::core::{ArgminError, Error};

use crate::spectrum::errors::FitError;

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Implies that FD should be used
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- MLEOptions ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    /// Cost change tolerance needs to be positive and finite.
    InvalidTolCost {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// At least one tolerance must be provided.
    NoTolerancesProvided,

    /// Invalid line searcher name.
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },

    /// lbfgs_mem needs to be at least 1.
    InvalidLBFGSMem {
        mem: usize,
        reason: &'static str,
    },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Theta hat is missing
    MissingThetaHat,

    // ---- Argmin ----
    /// An error raised inside argmin, tagged with its argmin kind
    /// (`"condition violated"`, `"invalid parameter"`, ...). Line-search
    /// breakdowns surface here.
    Backend {
        kind: &'static str,
        text: String,
    },

    // ---- Finite Diffs ----
    /// Hessian matrix dimensions do not match parameter dimensions.
    HessianDimMismatch {
        expected: usize,
        found: (usize, usize),
    },

    /// Hessian values need to be finite.
    InvalidHessian {
        row: usize,
        col: usize,
        value: f64,
    },

    // ---- Parameter transforms ----
    /// Theta length mismatch for the floating parameter set.
    ThetaLengthMismatch {
        expected: usize,
        actual: usize,
    },

    /// Unconstrained optimization input must have finite values.
    InvalidThetaInput {
        index: usize,
        value: f64,
    },

    // ---- Likelihood evaluation ----
    /// Model density evaluated to a non-positive or non-finite value.
    InvalidDensity {
        value: f64,
    },

    /// Any other model-side failure raised while evaluating the likelihood.
    ModelEvaluation {
        text: String,
    },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => {
                write!(f, "Gradient optimization not implemented")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- MLEOptions ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost function change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing estimated parameters (theta hat)")
            }

            // ---- Argmin ----
            OptError::Backend { kind, text } => write!(f, "Optimizer backend ({kind}): {text}"),

            // ---- Finite Diffs ----
            OptError::HessianDimMismatch { expected, found } => {
                write!(
                    f,
                    "Hessian dimension mismatch: expected ({expected}, {expected}), found {found:?}"
                )
            }
            OptError::InvalidHessian { row, col, value } => {
                write!(f, "Invalid Hessian at ({row}, {col}): {value}, must be finite")
            }

            // ---- Parameter transforms ----
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, actual {actual}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid theta input at index {index}: {value}, must be finite")
            }

            // ---- Likelihood evaluation ----
            OptError::InvalidDensity { value } => {
                write!(f, "Model density must be finite and > 0, got {value}")
            }
            OptError::ModelEvaluation { text } => {
                write!(f, "Model evaluation failed: {text}")
            }
        }
    }
}

/// Argmin errors keep their kind; an [`OptError`] raised by our own
/// cost/gradient closures and carried through argmin is unwrapped unchanged.
impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        let err = match err.downcast::<OptError>() {
            Ok(own) => return own,
            Err(err) => err,
        };
        match err.downcast::<ArgminError>() {
            Ok(argmin_err) => {
                let (kind, text) = match argmin_err {
                    ArgminError::InvalidParameter { text } => ("invalid parameter", text),
                    ArgminError::NotImplemented { text } => ("not implemented", text),
                    ArgminError::NotInitialized { text } => ("not initialized", text),
                    ArgminError::ConditionViolated { text } => ("condition violated", text),
                    ArgminError::CheckpointNotFound { text } => ("checkpoint not found", text),
                    ArgminError::PotentialBug { text } => ("potential bug", text),
                    ArgminError::ImpossibleError { text } => ("impossible error", text),
                    other => ("other", other.to_string()),
                };
                OptError::Backend { kind, text }
            }
            Err(err) => OptError::Backend { kind: "other", text: err.to_string() },
        }
    }
}

impl From<FitError> for OptError {
    fn from(err: FitError) -> Self {
        match err {
            FitError::InvalidDensity { value, .. } => OptError::InvalidDensity { value },
            FitError::Optimization(inner) => inner,
            other => OptError::ModelEvaluation { text: other.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Density failures keep their value, wrapped optimizer errors unwrap,
    // and other fit errors become `ModelEvaluation`.
    fn fit_errors_fold_into_opt_errors() {
        let density = FitError::InvalidDensity { x: 120.0, value: -1.0 };
        let wrapped = FitError::Optimization(OptError::NoTolerancesProvided);
        let other = FitError::InvalidModel { reason: "empty" };

        assert_eq!(OptError::from(density), OptError::InvalidDensity { value: -1.0 });
        assert_eq!(OptError::from(wrapped), OptError::NoTolerancesProvided);
        assert!(matches!(OptError::from(other), OptError::ModelEvaluation { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Argmin errors keep their kind; our own errors survive the round trip
    // through `argmin::core::Error`.
    fn argmin_errors_are_tagged() {
        let cond: Error = ArgminError::ConditionViolated { text: "no descent".into() }.into();
        let own: Error = OptError::NonFiniteCost { value: f64::INFINITY }.into();

        assert_eq!(
            OptError::from(cond),
            OptError::Backend { kind: "condition violated", text: "no descent".into() }
        );
        assert_eq!(OptError::from(own), OptError::NonFiniteCost { value: f64::INFINITY });
    }
}

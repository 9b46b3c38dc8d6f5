//! Unified error handling for covariance estimation.
//!
//! `InferenceError` covers the ways turning an NLL Hessian into a covariance
//! matrix can fail: curvature that is not positive definite, curvature that
//! could not be evaluated, and shape mismatches. `InferenceResult<T>` is the
//! matching result alias.
use crate::optimization::errors::OptError;

/// Unified error type for covariance routines.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Curvature ----
    /// The Hessian has an eigenvalue at or below the relative cutoff.
    NotPositiveDefinite {
        min_eigenvalue: f64,
    },

    /// The Hessian could not be evaluated (non-finite entries or failing
    /// gradient evaluations).
    CurvatureUnavailable {
        text: String,
    },

    /// Matrix shapes do not agree.
    DimensionMismatch {
        expected: usize,
        found: (usize, usize),
    },
}

pub type InferenceResult<T> = Result<T, InferenceError>;

impl std::error::Error for InferenceError {}

impl From<OptError> for InferenceError {
    fn from(err: OptError) -> Self {
        InferenceError::CurvatureUnavailable { text: err.to_string() }
    }
}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Curvature ----
            InferenceError::NotPositiveDefinite { min_eigenvalue } => write!(
                f,
                "Inference Error: Hessian is not positive definite (min eigenvalue = {})",
                min_eigenvalue
            ),
            InferenceError::CurvatureUnavailable { text } => {
                write!(f, "Inference Error: Hessian could not be evaluated: {}", text)
            }
            InferenceError::DimensionMismatch { expected, found } => write!(
                f,
                "Inference Error: expected a {}x{} matrix, found {:?}",
                expected, expected, found
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Optimizer failures during curvature evaluation keep their message.
    fn conversions_keep_messages() {
        let from_opt = InferenceError::from(OptError::NonFiniteCost { value: f64::NAN });

        assert!(matches!(&from_opt, InferenceError::CurvatureUnavailable { text } if text.contains("Non-finite")));
        assert!(from_opt.to_string().starts_with("Inference Error: Hessian could not be evaluated"));
    }
}

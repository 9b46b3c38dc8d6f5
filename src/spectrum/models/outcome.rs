//! Fit results: status codes, fitted parameters and derived quantities.
use crate::{
    inference::Significance,
    optimization::loglik_optimizer::Covariance,
};

/// Final status of a fit.
///
/// Numeric codes are stable: `0` success, one distinct nonzero code per
/// failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStatus {
    Converged,
    /// The optimizer stopped without meeting a convergence tolerance (line
    /// search breakdown or another non-convergent exit).
    LineSearchFailed,
    /// The optimizer converged but the NLL curvature is not positive
    /// definite at the minimum.
    HessianNotPositiveDefinite,
    MaxIterationsReached,
    /// The optimizer converged but the curvature could not be evaluated.
    CovarianceFailed,
}

impl FitStatus {
    pub fn code(&self) -> i32 {
        match self {
            FitStatus::Converged => 0,
            FitStatus::LineSearchFailed => 1,
            FitStatus::HessianNotPositiveDefinite => 2,
            FitStatus::MaxIterationsReached => 3,
            FitStatus::CovarianceFailed => 4,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FitStatus::Converged)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FitStatus::Converged => "converged",
            FitStatus::LineSearchFailed => "line search failed",
            FitStatus::HessianNotPositiveDefinite => "Hessian not positive definite",
            FitStatus::MaxIterationsReached => "maximum iterations reached",
            FitStatus::CovarianceFailed => "covariance failed",
        }
    }
}

impl std::fmt::Display for FitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.label(), self.code())
    }
}

/// A parameter after the fit.
///
/// `error` is `0.0` for constant parameters and `NaN` for floating ones
/// whose covariance is unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedParameter {
    pub name: String,
    pub value: f64,
    pub error: f64,
    pub constant: bool,
}

/// `FitOutcome` — everything a fit reports.
///
/// Fields
/// ------
/// - `status`: final [`FitStatus`].
/// - `parameters`: every registry parameter, in declaration order.
/// - `covariance`: covariance of the floating parameters (order of
///   `floating`), when available.
/// - `floating`: names of the floating parameters.
/// - `nll`: minimized negative log-likelihood (the last accepted value for
///   failed fits).
/// - `iterations`: optimizer iterations.
/// - `significance`: yield/error of the first component, if it has a yield.
/// - `message`: optimizer termination text.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    pub status: FitStatus,
    pub parameters: Vec<FittedParameter>,
    pub covariance: Option<Covariance>,
    pub floating: Vec<String>,
    pub nll: f64,
    pub iterations: usize,
    pub significance: Option<Significance>,
    pub message: String,
}

impl FitOutcome {
    pub fn parameter(&self, name: &str) -> Option<&FittedParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.parameter(name).map(|p| p.value)
    }

    pub fn error(&self, name: &str) -> Option<f64> {
        self.parameter(name).map(|p| p.error)
    }

    /// Values of every parameter in registry order.
    pub fn values(&self) -> Vec<f64> {
        self.parameters.iter().map(|p| p.value).collect()
    }

    pub fn is_converged(&self) -> bool {
        self.status.is_success()
    }

    /// Covariance entry for two floating parameters.
    pub fn covariance_of(&self, a: &str, b: &str) -> Option<f64> {
        let cov = self.covariance.as_ref()?;
        let i = self.floating.iter().position(|n| n == a)?;
        let j = self.floating.iter().position(|n| n == b)?;
        Some(cov[[i, j]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Status codes are distinct and only `Converged` is a success.
    fn status_codes_are_distinct() {
        let all = [
            FitStatus::Converged,
            FitStatus::LineSearchFailed,
            FitStatus::HessianNotPositiveDefinite,
            FitStatus::MaxIterationsReached,
            FitStatus::CovarianceFailed,
        ];
        let codes: Vec<i32> = all.iter().map(FitStatus::code).collect();

        assert_eq!(codes, vec![0, 1, 2, 3, 4]);
        assert_eq!(all.iter().filter(|s| s.is_success()).count(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Lookups by name reach parameters and covariance entries.
    fn lookups_by_name() {
        let outcome = FitOutcome {
            status: FitStatus::Converged,
            parameters: vec![
                FittedParameter { name: "mean".into(), value: 125.0, error: 0.0, constant: true },
                FittedParameter { name: "nsig".into(), value: 180.0, error: 40.0, constant: false },
                FittedParameter { name: "nbkg".into(), value: 990.0, error: 35.0, constant: false },
            ],
            covariance: Some(array![[1600.0, -300.0], [-300.0, 1225.0]]),
            floating: vec!["nsig".into(), "nbkg".into()],
            nll: -1234.5,
            iterations: 12,
            significance: None,
            message: String::new(),
        };

        assert_eq!(outcome.value("nsig"), Some(180.0));
        assert_eq!(outcome.error("mean"), Some(0.0));
        assert_eq!(outcome.covariance_of("nbkg", "nsig"), Some(-300.0));
        assert_eq!(outcome.covariance_of("mean", "nsig"), None);
        assert_eq!(outcome.values(), vec![125.0, 180.0, 990.0]);
    }
}

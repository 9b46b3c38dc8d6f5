//! Fit options: likelihood form, error treatment and optimizer settings.
use crate::{optimization::loglik_optimizer::MLEOptions, spectrum::core::data::DomainPolicy};

/// Unbinned event-by-event likelihood or binned Poisson likelihood over the
/// observable's bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LikelihoodKind {
    #[default]
    Unbinned,
    Binned,
}

/// `FitOptions` — switches that select the likelihood and its uncertainties.
///
/// Fields
/// ------
/// - `extended`: include the Poisson term for the total yield. Requires at
///   least one yield parameter.
/// - `weighted_errors`: apply the sum-of-weights-squared covariance
///   correction for weighted datasets.
/// - `likelihood`: unbinned or binned.
/// - `domain_policy`: handling of events outside the model's observable.
/// - `mle`: optimizer tolerances and line search.
///
/// Default
/// -------
/// Extended, unbinned, no weight correction, `Exclude`, default optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    pub extended: bool,
    pub weighted_errors: bool,
    pub likelihood: LikelihoodKind,
    pub domain_policy: DomainPolicy,
    pub mle: MLEOptions,
}

impl FitOptions {
    pub fn new(extended: bool, weighted_errors: bool) -> Self {
        FitOptions { extended, weighted_errors, ..FitOptions::default() }
    }

    pub fn with_likelihood(mut self, likelihood: LikelihoodKind) -> Self {
        self.likelihood = likelihood;
        self
    }

    pub fn with_domain_policy(mut self, policy: DomainPolicy) -> Self {
        self.domain_policy = policy;
        self
    }

    pub fn with_mle(mut self, mle: MLEOptions) -> Self {
        self.mle = mle;
        self
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions {
            extended: true,
            weighted_errors: false,
            likelihood: LikelihoodKind::Unbinned,
            domain_policy: DomainPolicy::Exclude,
            mle: MLEOptions::default(),
        }
    }
}

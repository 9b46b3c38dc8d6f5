//! models — likelihoods, the fit engine, and fit results.
//!
//! - [`likelihood`]: unbinned and binned negative log-likelihoods with
//!   analytic gradients.
//! - [`fit`]: [`FitModel`] and the [`fit`](fit::fit) entry point.
//! - [`outcome`]: [`FitOutcome`], [`FitStatus`] and [`FittedParameter`].

pub mod fit;
pub mod likelihood;
pub mod outcome;

pub use self::fit::{FitModel, FitState, fit};
pub use self::likelihood::{LikelihoodInput, negative_log_likelihood};
pub use self::outcome::{FitOutcome, FitStatus, FittedParameter};

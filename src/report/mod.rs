//! report — human-readable summaries and plot projections of fit results.
//!
//! Purpose
//! -------
//! Turn a [`FitOutcome`] into the outputs an analysis shows: the printed
//! fit summary and the numbers behind the spectrum figure.
//!
//! Key behaviors
//! -------------
//! - [`FitSummary`] formats status, fixed and floating parameters and the
//!   approximate significance.
//! - [`project`] evaluates data points and model curves through the public
//!   density surface of [`SpectrumModel`].
//!
//! Downstream usage
//! ----------------
//! - `println!("{}", FitSummary::new(&outcome))` after a fit; feed
//!   [`Projection`] to any plotting library.
//!
//! [`FitOutcome`]: crate::spectrum::models::outcome::FitOutcome
//! [`SpectrumModel`]: crate::spectrum::pdf::SpectrumModel

pub mod projection;
pub mod summary;

pub use self::projection::{ComponentCurve, Projection, project};
pub use self::summary::FitSummary;

pub mod prelude {
    pub use super::{FitSummary, Projection, project};
}

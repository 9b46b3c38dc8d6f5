//! The fitted observable: a named scalar on a closed range with fixed binning.
//!
//! Purpose
//! -------
//! Describe the measured quantity (the diphoton invariant mass by default)
//! together with its fit range and the binning used for binned likelihoods,
//! histograms and plot projections.
//!
//! Invariants & assumptions
//! ------------------------
//! - `min < max`, both finite, `bins >= 1`; enforced by [`Observable::new`].
//! - The range is closed: `max` itself belongs to the last bin.
//!
//! Conventions
//! -----------
//! - Units are GeV for the diphoton mass.
use crate::spectrum::errors::{FitError, FitResult};
use ndarray::Array1;

/// Default diphoton mass window and binning.
pub const DEFAULT_MASS_MIN: f64 = 105.0;
pub const DEFAULT_MASS_MAX: f64 = 160.0;
pub const DEFAULT_MASS_BINS: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Observable {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub bins: usize,
}

impl Observable {
    /// Validate and build an observable.
    ///
    /// # Errors
    /// [`FitError::InvalidObservable`] for non-finite or inverted bounds and
    /// for zero bins.
    pub fn new(name: impl Into<String>, min: f64, max: f64, bins: usize) -> FitResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(FitError::InvalidObservable {
                min,
                max,
                bins,
                reason: "Bounds must be finite.",
            });
        }
        if min >= max {
            return Err(FitError::InvalidObservable {
                min,
                max,
                bins,
                reason: "Lower bound must be strictly below the upper bound.",
            });
        }
        if bins == 0 {
            return Err(FitError::InvalidObservable {
                min,
                max,
                bins,
                reason: "At least one bin is required.",
            });
        }
        Ok(Observable { name: name.into(), min, max, bins })
    }

    /// `m_yy` on [105, 160] GeV with 30 bins.
    pub fn diphoton_mass() -> Self {
        Observable {
            name: "m_yy".to_string(),
            min: DEFAULT_MASS_MIN,
            max: DEFAULT_MASS_MAX,
            bins: DEFAULT_MASS_BINS,
        }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn bin_width(&self) -> f64 {
        self.width() / self.bins as f64
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }

    /// Bin holding `x`, or `None` outside the range.
    pub fn bin_index(&self, x: f64) -> Option<usize> {
        if !self.contains(x) {
            return None;
        }
        let idx = ((x - self.min) / self.bin_width()).floor() as usize;
        Some(idx.min(self.bins - 1))
    }

    /// `bins + 1` edges; the last edge is exactly `max`.
    pub fn bin_edges(&self) -> Array1<f64> {
        let w = self.bin_width();
        let mut edges = Array1::from_shape_fn(self.bins + 1, |i| self.min + w * i as f64);
        edges[self.bins] = self.max;
        edges
    }

    pub fn bin_centers(&self) -> Array1<f64> {
        let w = self.bin_width();
        Array1::from_shape_fn(self.bins, |i| self.min + w * (i as f64 + 0.5))
    }
}

impl Default for Observable {
    fn default() -> Self {
        Observable::diphoton_mass()
    }
}

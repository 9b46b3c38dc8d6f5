//! Event datasets for spectrum fits.
//!
//! Purpose
//! -------
//! Hold the per-event observable values and weights that a fit consumes,
//! validated once at construction so the likelihood code can assume clean
//! inputs.
//!
//! Key behaviors
//! -------------
//! - [`MassDataset::new`] checks lengths and finiteness and applies a
//!   [`DomainPolicy`] against the observable range.
//! - Summary accessors expose the event count, `Σw` and `Σw²`.
//! - [`MassDataset::with_squared_weights`] derives the companion dataset used
//!   by the sum-of-weights-squared covariance correction.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every stored mass is finite and lies inside the observable range.
//! - Every stored weight is finite; negative weights are allowed.
//! - The dataset may be empty. Emptiness is a fit-time error, not a
//!   construction error.
//! - Immutable after construction; `Send + Sync`.
//!
//! Conventions
//! -----------
//! - Unweighted datasets store an explicit vector of ones and report
//!   `is_weighted() == false`.
use crate::spectrum::{
    core::observable::Observable,
    errors::{FitError, FitResult},
};
use ndarray::Array1;

/// What to do with events outside the observable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DomainPolicy {
    /// Reject the dataset with [`FitError::DomainMismatch`].
    Strict,
    /// Drop out-of-range events and count them.
    #[default]
    Exclude,
}

/// `MassDataset` — validated, immutable collection of weighted events.
///
/// Fields
/// ------
/// - `observable`: range and binning the events belong to.
/// - `masses`: observable values, all inside the range.
/// - `weights`: per-event weights, same length as `masses`.
/// - `weighted`: `false` when the weights were defaulted to one.
/// - `excluded`: number of events dropped by [`DomainPolicy::Exclude`].
#[derive(Debug, Clone, PartialEq)]
pub struct MassDataset {
    pub observable: Observable,
    pub masses: Array1<f64>,
    pub weights: Array1<f64>,
    weighted: bool,
    excluded: usize,
}

impl MassDataset {
    /// Build a dataset from raw masses and optional weights.
    ///
    /// Parameters
    /// ----------
    /// - `observable`: range the events must fall into.
    /// - `masses`: raw observable values.
    /// - `weights`: per-event weights; `None` means unit weights.
    /// - `policy`: handling of out-of-range events.
    ///
    /// Errors
    /// ------
    /// - `LengthMismatch` when the weight vector has a different length.
    /// - `NonFiniteEvent` for a NaN/±inf mass or weight (first offender).
    /// - `DomainMismatch` for an out-of-range mass under `Strict`.
    pub fn new(
        observable: Observable, masses: Vec<f64>, weights: Option<Vec<f64>>, policy: DomainPolicy,
    ) -> FitResult<Self> {
        let weighted = weights.is_some();
        let weights = match weights {
            Some(w) => {
                if w.len() != masses.len() {
                    return Err(FitError::LengthMismatch { masses: masses.len(), weights: w.len() });
                }
                w
            }
            None => vec![1.0; masses.len()],
        };

        let mut kept_m = Vec::with_capacity(masses.len());
        let mut kept_w = Vec::with_capacity(masses.len());
        let mut excluded = 0;
        for (index, (&m, &w)) in masses.iter().zip(weights.iter()).enumerate() {
            if !m.is_finite() {
                return Err(FitError::NonFiniteEvent { index, field: "mass", value: m });
            }
            if !w.is_finite() {
                return Err(FitError::NonFiniteEvent { index, field: "weight", value: w });
            }
            if !observable.contains(m) {
                match policy {
                    DomainPolicy::Strict => {
                        return Err(FitError::DomainMismatch {
                            index,
                            value: m,
                            min: observable.min,
                            max: observable.max,
                        });
                    }
                    DomainPolicy::Exclude => {
                        excluded += 1;
                        continue;
                    }
                }
            }
            kept_m.push(m);
            kept_w.push(w);
        }

        Ok(MassDataset {
            observable,
            masses: Array1::from(kept_m),
            weights: Array1::from(kept_w),
            weighted,
            excluded,
        })
    }

    /// Unit-weight dataset.
    pub fn unweighted(
        observable: Observable, masses: Vec<f64>, policy: DomainPolicy,
    ) -> FitResult<Self> {
        Self::new(observable, masses, None, policy)
    }

    /// Weighted dataset from `(mass, weight)` pairs.
    pub fn from_pairs(
        observable: Observable, pairs: &[(f64, f64)], policy: DomainPolicy,
    ) -> FitResult<Self> {
        let (masses, weights): (Vec<f64>, Vec<f64>) = pairs.iter().cloned().unzip();
        Self::new(observable, masses, Some(weights), policy)
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// Events dropped at construction (or re-binding) for lying out of range.
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    pub fn sum_weights(&self) -> f64 {
        self.weights.sum()
    }

    pub fn sum_weights_squared(&self) -> f64 {
        self.weights.iter().map(|w| w * w).sum()
    }

    /// Same events with every weight replaced by its square.
    pub fn with_squared_weights(&self) -> MassDataset {
        MassDataset {
            observable: self.observable.clone(),
            masses: self.masses.clone(),
            weights: self.weights.mapv(|w| w * w),
            weighted: true,
            excluded: self.excluded,
        }
    }

    /// Re-validate the events against another observable (the model's).
    ///
    /// Returns a clone when the ranges already agree. Otherwise applies
    /// `policy` as in [`MassDataset::new`]; the excluded count accumulates.
    pub fn apply_domain(&self, observable: &Observable, policy: DomainPolicy) -> FitResult<Self> {
        if self.observable.min == observable.min && self.observable.max == observable.max {
            let mut out = self.clone();
            out.observable = observable.clone();
            return Ok(out);
        }
        let weights = if self.weighted { Some(self.weights.to_vec()) } else { None };
        let mut out = Self::new(observable.clone(), self.masses.to_vec(), weights, policy)?;
        out.excluded += self.excluded;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation of lengths, finiteness and the domain policy.
    // - Weight summaries and the squared-weight companion.
    // - Re-binding to a narrower observable.
    //
    // They intentionally DO NOT cover:
    // - Degenerate-dataset detection, which belongs to the fit engine.
    // -------------------------------------------------------------------------

    fn obs() -> Observable {
        Observable::diphoton_mass()
    }

    #[test]
    // Purpose
    // -------
    // Out-of-range events are dropped under `Exclude` and rejected under
    // `Strict`; the boundaries themselves are inside.
    fn domain_policy_controls_out_of_range_events() {
        // Arrange
        let masses = vec![104.9, 105.0, 125.0, 160.0, 161.0];

        // Act
        let excluded = MassDataset::unweighted(obs(), masses.clone(), DomainPolicy::Exclude)
            .expect("exclude policy accepts the data");
        let strict = MassDataset::unweighted(obs(), masses, DomainPolicy::Strict);

        // Assert
        assert_eq!(excluded.len(), 3);
        assert_eq!(excluded.excluded(), 2);
        assert!(!excluded.is_weighted());
        assert!(matches!(strict, Err(FitError::DomainMismatch { index: 0, .. })));
    }

    #[test]
    // Purpose
    // -------
    // Non-finite values and mismatched lengths are reported with the
    // offending index.
    fn new_rejects_non_finite_and_mismatched_inputs() {
        let bad_mass = MassDataset::unweighted(obs(), vec![120.0, f64::NAN], DomainPolicy::Strict);
        let bad_weight =
            MassDataset::from_pairs(obs(), &[(120.0, 1.0), (121.0, f64::INFINITY)], DomainPolicy::Strict);
        let mismatch =
            MassDataset::new(obs(), vec![120.0, 121.0], Some(vec![1.0]), DomainPolicy::Strict);

        assert!(matches!(bad_mass, Err(FitError::NonFiniteEvent { index: 1, field: "mass", .. })));
        assert!(matches!(
            bad_weight,
            Err(FitError::NonFiniteEvent { index: 1, field: "weight", .. })
        ));
        assert!(matches!(mismatch, Err(FitError::LengthMismatch { masses: 2, weights: 1 })));
    }

    #[test]
    // Purpose
    // -------
    // Weight sums, including negative weights, and the squared companion.
    fn weight_summaries_and_squared_companion() {
        // Arrange
        let data = MassDataset::from_pairs(
            obs(),
            &[(110.0, 2.0), (120.0, -0.5), (130.0, 1.5)],
            DomainPolicy::Strict,
        )
        .expect("valid pairs");

        // Act
        let sq = data.with_squared_weights();

        // Assert
        assert!(data.is_weighted());
        assert_relative_eq!(data.sum_weights(), 3.0);
        assert_relative_eq!(data.sum_weights_squared(), 4.0 + 0.25 + 2.25);
        assert_relative_eq!(sq.sum_weights(), data.sum_weights_squared());
    }

    #[test]
    // Purpose
    // -------
    // Re-binding to a narrower observable drops events and accumulates the
    // excluded count.
    fn apply_domain_narrows_range() {
        // Arrange
        let data = MassDataset::unweighted(obs(), vec![106.0, 115.0, 125.0, 150.0], DomainPolicy::Exclude)
            .expect("valid data");
        let narrow = Observable::new("m_yy", 110.0, 140.0, 15).expect("valid observable");

        // Act
        let out = data.apply_domain(&narrow, DomainPolicy::Exclude).expect("exclude policy");

        // Assert
        assert_eq!(out.len(), 2);
        assert_eq!(out.excluded(), 2);
        assert!(data.apply_domain(&narrow, DomainPolicy::Strict).is_err());
    }
}

//! Event records, the diphoton selection, and per-event weights.
//!
//! Purpose
//! -------
//! Decide whether a raw record enters the spectrum and, if so, with which
//! mass and weight.
//!
//! Key behaviors
//! -------------
//! - [`Selection::apply`] requires the photon trigger and at least two
//!   photons, then reconstructs the mass of the two leading photons and
//!   converts it from MeV to GeV.
//! - Simulated records carry [`WeightFactors`]; their weight is the product
//!   of the photon, photon-trigger and pile-up scale factors and the
//!   generator weight. Data records weigh 1.
//!
//! Invariants & assumptions
//! ------------------------
//! - Photons are ordered by decreasing transverse momentum, as stored
//!   upstream; the first two are the leading pair.
//! - The mass-window cut is applied by the dataset builder, not here.
use crate::preprocess::{
    errors::{PreprocessError, PreprocessResult},
    four_vector::{PtEtaPhiE, invariant_mass},
};

/// MeV per GeV.
pub const MEV_PER_GEV: f64 = 1000.0;

/// Multiplicative weight components of a simulated event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightFactors {
    pub scale_factor_photon: f64,
    pub scale_factor_photon_trigger: f64,
    pub scale_factor_pileup: f64,
    pub mc_weight: f64,
}

impl WeightFactors {
    pub fn product(&self) -> f64 {
        self.scale_factor_photon
            * self.scale_factor_photon_trigger
            * self.scale_factor_pileup
            * self.mc_weight
    }
}

/// One raw event.
///
/// `photon_n` is the stored photon multiplicity; `photons` holds their
/// kinematics in MeV.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub trig_p: bool,
    pub photon_n: usize,
    pub photons: Vec<PtEtaPhiE>,
    pub weights: Option<WeightFactors>,
}

/// Selected event: mass in GeV and weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedEvent {
    pub mass: f64,
    pub weight: f64,
}

/// Diphoton selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub require_trigger: bool,
    pub min_photons: usize,
}

impl Default for Selection {
    fn default() -> Self {
        Selection { require_trigger: true, min_photons: 2 }
    }
}

impl Selection {
    /// Apply the selection to record `index`.
    ///
    /// Returns `Ok(None)` for records that fail the trigger or multiplicity
    /// requirement.
    ///
    /// Errors
    /// ------
    /// - `MalformedRecord` when fewer than two photon kinematics are stored
    ///   for an accepted multiplicity, or when the leading kinematics or
    ///   the weight are not finite.
    pub fn apply(&self, index: usize, record: &EventRecord) -> PreprocessResult<Option<SelectedEvent>> {
        if self.require_trigger && !record.trig_p {
            return Ok(None);
        }
        if record.photon_n < self.min_photons.max(2) {
            return Ok(None);
        }
        let (p0, p1) = match (record.photons.first(), record.photons.get(1)) {
            (Some(p0), Some(p1)) => (p0, p1),
            _ => {
                return Err(PreprocessError::MalformedRecord {
                    index,
                    reason: "Photon count exceeds the stored kinematics.",
                });
            }
        };
        if !p0.is_finite() || !p1.is_finite() {
            return Err(PreprocessError::MalformedRecord {
                index,
                reason: "Leading photon kinematics are not finite.",
            });
        }
        let weight = record.weights.map_or(1.0, |w| w.product());
        if !weight.is_finite() {
            return Err(PreprocessError::MalformedRecord { index, reason: "Event weight is not finite." });
        }
        let mass = invariant_mass(p0, p1) / MEV_PER_GEV;
        Ok(Some(SelectedEvent { mass, weight }))
    }
}

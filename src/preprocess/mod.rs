//! preprocess — raw diphoton records to a mass dataset.
//!
//! Purpose
//! -------
//! Filter raw event records, reconstruct the diphoton invariant mass, attach
//! per-event weights and build the [`MassDataset`] that the fit consumes.
//!
//! Key behaviors
//! -------------
//! - [`Selection`] applies the trigger and photon-multiplicity cuts and
//!   computes mass (GeV) and weight per record.
//! - [`preprocess`] runs the selection over all records in parallel on an
//!   [`ExecutionContext`] and applies the observable's mass window.
//! - Simulated samples produce weighted datasets; data samples produce
//!   unit-weight datasets.
//!
//! Invariants & assumptions
//! ------------------------
//! - Output event order matches input record order.
//! - Malformed records abort preprocessing with the index of the first
//!   offender; records failing cuts are simply dropped.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the four-vector mass, the selection, the pool, and the
//!   end-to-end record → dataset path below.

pub mod context;
pub mod errors;
pub mod four_vector;
pub mod selection;

pub use self::context::ExecutionContext;
pub use self::errors::{PreprocessError, PreprocessResult};
pub use self::four_vector::{PtEtaPhiE, invariant_mass};
pub use self::selection::{EventRecord, SelectedEvent, Selection, WeightFactors};

use crate::spectrum::core::{
    data::{DomainPolicy, MassDataset},
    observable::Observable,
};
use rayon::prelude::*;

/// Origin of a sample; decides whether weights are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Simulation,
    Data,
}

/// Dataset plus bookkeeping counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessed {
    pub dataset: MassDataset,
    /// Records read.
    pub records: usize,
    /// Records passing trigger and multiplicity cuts (before the mass
    /// window).
    pub selected: usize,
}

/// Select, reconstruct and weight `records`, then keep events inside
/// `observable`.
///
/// Errors
/// ------
/// - `MalformedRecord` for the first inconsistent record.
/// - `ThreadPool` when the context's pool cannot be built.
/// - `Dataset` when the dataset cannot be built.
pub fn preprocess(
    records: &[EventRecord], kind: SampleKind, selection: &Selection, observable: &Observable,
    ctx: &ExecutionContext,
) -> PreprocessResult<Preprocessed> {
    let selected: Vec<SelectedEvent> = ctx.install(|| {
        records
            .par_iter()
            .enumerate()
            .map(|(i, r)| selection.apply(i, r))
            .collect::<PreprocessResult<Vec<Option<SelectedEvent>>>>()
    })??
    .into_iter()
    .flatten()
    .collect();

    let n_selected = selected.len();
    let masses: Vec<f64> = selected.iter().map(|e| e.mass).collect();
    let weights = match kind {
        SampleKind::Simulation => Some(selected.iter().map(|e| e.weight).collect()),
        SampleKind::Data => None,
    };
    let dataset = MassDataset::new(observable.clone(), masses, weights, DomainPolicy::Exclude)?;
    log::info!(
        "preprocessed {} records with {} workers: {} selected, {} in [{}, {}]",
        records.len(),
        ctx.workers(),
        n_selected,
        dataset.len(),
        observable.min,
        observable.max
    );
    Ok(Preprocessed { dataset, records: records.len(), selected: n_selected })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(mass_gev: f64, trig_p: bool, weight: Option<f64>) -> EventRecord {
        let half = 500.0 * mass_gev;
        EventRecord {
            trig_p,
            photon_n: 2,
            photons: vec![
                PtEtaPhiE::new(half, 0.0, 0.0, half),
                PtEtaPhiE::new(half, 0.0, std::f64::consts::PI, half),
            ],
            weights: weight.map(|w| WeightFactors {
                scale_factor_photon: 1.0,
                scale_factor_photon_trigger: 1.0,
                scale_factor_pileup: 1.0,
                mc_weight: w,
            }),
        }
    }

    #[test]
    // Purpose
    // -------
    // Records flow through the cuts and the mass window in order, with the
    // same result for one and several workers.
    //
    // Given
    // -----
    // - Masses 100 (outside), 120, 130 (untriggered), 150, 170 (outside).
    fn preprocess_applies_cuts_and_mass_window() {
        // Arrange
        let records = vec![
            record(100.0, true, Some(1.0)),
            record(120.0, true, Some(0.5)),
            record(130.0, false, Some(1.0)),
            record(150.0, true, Some(2.0)),
            record(170.0, true, Some(1.0)),
        ];
        let obs = Observable::diphoton_mass();

        for ctx in [ExecutionContext::sequential(), ExecutionContext::new(2)] {
            // Act
            let out = preprocess(&records, SampleKind::Simulation, &Selection::default(), &obs, &ctx)
                .expect("preprocess succeeds");

            // Assert
            assert_eq!(out.records, 5);
            assert_eq!(out.selected, 4);
            assert_eq!(out.dataset.len(), 2);
            assert_relative_eq!(out.dataset.masses[0], 120.0, max_relative = 1e-12);
            assert_relative_eq!(out.dataset.masses[1], 150.0, max_relative = 1e-12);
            assert_relative_eq!(out.dataset.sum_weights(), 2.5);
            assert!(out.dataset.is_weighted());
        }
    }

    #[test]
    // Purpose
    // -------
    // Data samples are unweighted even when records carry weight factors.
    fn data_samples_are_unweighted() {
        let records = vec![record(125.0, true, Some(3.0))];
        let out = preprocess(
            &records,
            SampleKind::Data,
            &Selection::default(),
            &Observable::diphoton_mass(),
            &ExecutionContext::sequential(),
        )
        .expect("preprocess succeeds");

        assert!(!out.dataset.is_weighted());
        assert_relative_eq!(out.dataset.sum_weights(), 1.0);
    }
}

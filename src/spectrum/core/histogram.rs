//! Fixed-binning histograms of a weighted mass dataset.
//!
//! Bin contents are `Σw` per bin and bin errors are `sqrt(Σw²)`, the usual
//! display for weighted events. The same contents feed the binned
//! likelihood.
use crate::spectrum::core::{data::MassDataset, observable::Observable};
use ndarray::Array1;

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub observable: Observable,
    /// Sum of weights per bin.
    pub contents: Array1<f64>,
    /// Sum of squared weights per bin.
    pub sumw2: Array1<f64>,
}

impl Histogram {
    /// Fill a histogram over `observable` from the dataset's events.
    ///
    /// Events outside `observable` are skipped; the dataset has already
    /// validated them against its own range.
    pub fn from_dataset(data: &MassDataset, observable: &Observable) -> Self {
        let mut contents = Array1::<f64>::zeros(observable.bins);
        let mut sumw2 = Array1::<f64>::zeros(observable.bins);
        for (&m, &w) in data.masses.iter().zip(data.weights.iter()) {
            if let Some(b) = observable.bin_index(m) {
                contents[b] += w;
                sumw2[b] += w * w;
            }
        }
        Histogram { observable: observable.clone(), contents, sumw2 }
    }

    /// `sqrt(Σw²)` per bin.
    pub fn errors(&self) -> Array1<f64> {
        self.sumw2.mapv(f64::sqrt)
    }

    pub fn total(&self) -> f64 {
        self.contents.sum()
    }

    pub fn bin_edges(&self) -> Array1<f64> {
        self.observable.bin_edges()
    }

    pub fn bin_centers(&self) -> Array1<f64> {
        self.observable.bin_centers()
    }
}

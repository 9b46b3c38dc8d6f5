//! core — observable, datasets, parameters and fit configuration.
//!
//! Purpose
//! -------
//! Hold the validated inputs of a spectrum fit: the [`Observable`] and its
//! binning, the immutable [`MassDataset`] and its [`Histogram`], the
//! [`ParameterSpec`] declarations resolved into a [`ParameterSet`], and the
//! [`FitConfig`] / [`FitOptions`] that tie them together.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every type here validates on construction and is immutable afterwards;
//!   the fit engine never re-checks what a constructor already guaranteed.
//! - Parameters are addressed by registry index once a model is built.
//!
//! Conventions
//! -----------
//! - Masses are in GeV. Indexing is 0-based in event order.

pub mod config;
pub mod data;
pub mod histogram;
pub mod observable;
pub mod options;
pub mod params;

pub use self::config::{ComponentSpec, FitConfig, ShapeSpec};
pub use self::data::{DomainPolicy, MassDataset};
pub use self::histogram::Histogram;
pub use self::observable::Observable;
pub use self::options::{FitOptions, LikelihoodKind};
pub use self::params::{Bounds, Parameter, ParameterSet, ParameterSpec};

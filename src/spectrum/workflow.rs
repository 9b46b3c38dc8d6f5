//! Two-stage diphoton fit presets.
//!
//! Stage one fits a truncated Gaussian to weighted simulated signal events
//! (shape only, sum-of-weights-squared errors). Stage two fits real data
//! with an extended signal+background model in which the signal mean and
//! width are held at the stage-one result and the background is a
//! third-order Chebyshev series.
use crate::spectrum::{
    core::{
        config::{ComponentSpec, FitConfig},
        data::MassDataset,
        observable::Observable,
        options::FitOptions,
        params::ParameterSpec,
    },
    errors::{FitError, FitResult},
    models::outcome::FitOutcome,
};

/// Signal component name.
pub const SIGNAL: &str = "signal";
/// Background component name.
pub const BACKGROUND: &str = "background";

/// Stage one: Gaussian shape fit to weighted simulation.
///
/// `mean` starts at 125 in [120, 130], `sigma` at 2 in [0.5, 5]; the fit is
/// not extended and uses weighted errors.
pub fn signal_shape_config(observable: Observable) -> FitConfig {
    FitConfig::new(observable, FitOptions::new(false, true))
        .with_parameter(ParameterSpec::new("mean", 125.0).with_bounds(120.0, 130.0))
        .with_parameter(ParameterSpec::new("sigma", 2.0).with_bounds(0.5, 5.0))
        .with_component(ComponentSpec::gaussian(SIGNAL, "mean", "sigma"))
}

/// Stage two: extended signal+background fit to data.
///
/// Parameters
/// ----------
/// - `observable`: fit range and binning.
/// - `signal`: stage-one outcome providing `mean` and `sigma`, held fixed.
/// - `n_events`: number of data events; seeds `nbkg` at `N` in `[0, 1.5 N]`.
///
/// Errors
/// ------
/// - `UnknownParameter` when `signal` lacks `mean` or `sigma`.
/// - `DegenerateDataset` for `n_events == 0`, where the `nbkg` range would
///   be empty.
pub fn data_fit_config(
    observable: Observable, signal: &FitOutcome, n_events: usize,
) -> FitResult<FitConfig> {
    let lookup = |name: &str| {
        signal.value(name).ok_or_else(|| FitError::UnknownParameter { name: name.to_string() })
    };
    let mean = lookup("mean")?;
    let sigma = lookup("sigma")?;
    if n_events == 0 {
        return Err(FitError::DegenerateDataset { events: 0, sum_weights: 0.0 });
    }
    let n = n_events as f64;

    Ok(FitConfig::new(observable, FitOptions::new(true, false))
        .with_parameter(ParameterSpec::fixed("mean", mean))
        .with_parameter(ParameterSpec::fixed("sigma", sigma))
        .with_parameter(ParameterSpec::new("a1", -0.5).with_bounds(-2.0, 2.0))
        .with_parameter(ParameterSpec::new("a2", 0.1).with_bounds(-2.0, 2.0))
        .with_parameter(ParameterSpec::new("a3", 0.01).with_bounds(-2.0, 2.0))
        .with_parameter(ParameterSpec::new("nsig", 50.0).with_bounds(-500.0, 2000.0))
        .with_parameter(ParameterSpec::new("nbkg", n).with_bounds(0.0, 1.5 * n))
        .with_component(ComponentSpec::gaussian(SIGNAL, "mean", "sigma").with_yield("nsig"))
        .with_component(ComponentSpec::chebyshev(BACKGROUND, &["a1", "a2", "a3"]).with_yield("nbkg")))
}

/// Run both stages and return `(signal_outcome, data_outcome)`.
///
/// A stage-one fit that does not converge is logged and still used; its
/// `mean` and `sigma` are the best values reached.
pub fn two_stage_fit(
    observable: &Observable, simulation: &MassDataset, data: &MassDataset,
) -> FitResult<(FitOutcome, FitOutcome)> {
    let signal = signal_shape_config(observable.clone()).fit(simulation)?;
    if !signal.is_converged() {
        log::warn!("signal shape fit finished with status {}", signal.status);
    }
    let data_cfg = data_fit_config(observable.clone(), &signal, data.len())?;
    let result = data_cfg.fit(data)?;
    Ok((signal, result))
}

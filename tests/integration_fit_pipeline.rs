//! Integration tests for the spectrum fit pipeline.
//!
//! Exercises the public surface end to end: dataset construction, model
//! configuration, the extended unbinned fit, sum-of-weights-squared errors,
//! the two-stage workflow and reporting, on deterministic quantile samples
//! and on a seeded toy sample.
use approx::assert_relative_eq;
use diphoton_fit::{
    preprocess::{
        EventRecord, ExecutionContext, PtEtaPhiE, SampleKind, Selection, WeightFactors, preprocess,
    },
    report::{FitSummary, project},
    spectrum::{
        FittedParameter,
        prelude::*,
        workflow::{BACKGROUND, SIGNAL, data_fit_config, two_stage_fit},
    },
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal as NormalSampler};
use statrs::distribution::{ContinuousCDF, Normal};

const TRUE_MEAN: f64 = 125.0;
const TRUE_SIGMA: f64 = 2.0;
/// Linear background slope in Chebyshev convention, `1 + b·u`.
const TRUE_SLOPE: f64 = -0.3;

// ---- Sample helpers ----

/// `n` Gaussian quantiles `μ + σ Φ⁻¹((i + ½)/n)`.
fn gaussian_quantiles(n: usize) -> Vec<f64> {
    let normal = Normal::new(TRUE_MEAN, TRUE_SIGMA).expect("valid normal");
    (0..n).map(|i| normal.inverse_cdf((i as f64 + 0.5) / n as f64)).collect()
}

/// Inverse CDF of `1 + b·u` on `[min, max]`, `u ∈ [-1, 1]`.
fn linear_background_at(p: f64, obs: &Observable) -> f64 {
    let b = TRUE_SLOPE;
    let u = (-1.0 + (1.0 - 2.0 * b * (1.0 - 0.5 * b - 2.0 * p)).sqrt()) / b;
    obs.min + 0.5 * (u + 1.0) * obs.width()
}

fn background_quantiles(n: usize, obs: &Observable) -> Vec<f64> {
    (0..n).map(|i| linear_background_at((i as f64 + 0.5) / n as f64, obs)).collect()
}

fn asimov_masses(n_sig: usize, n_bkg: usize, obs: &Observable) -> Vec<f64> {
    let mut masses = gaussian_quantiles(n_sig);
    masses.extend(background_quantiles(n_bkg, obs));
    masses
}

/// Signal+background configuration with every shape parameter floating.
fn floating_config(obs: Observable, n_events: f64, options: FitOptions) -> FitConfig {
    FitConfig::new(obs, options)
        .with_parameter(ParameterSpec::new("mean", 124.0).with_bounds(120.0, 130.0))
        .with_parameter(ParameterSpec::new("sigma", 2.5).with_bounds(0.5, 5.0))
        .with_parameter(ParameterSpec::new("a1", -0.5).with_bounds(-2.0, 2.0))
        .with_parameter(ParameterSpec::new("a2", 0.1).with_bounds(-2.0, 2.0))
        .with_parameter(ParameterSpec::new("a3", 0.01).with_bounds(-2.0, 2.0))
        .with_parameter(ParameterSpec::new("nsig", 0.1 * n_events).with_bounds(-500.0, n_events))
        .with_parameter(ParameterSpec::new("nbkg", n_events).with_bounds(0.0, 1.5 * n_events))
        .with_component(ComponentSpec::gaussian(SIGNAL, "mean", "sigma").with_yield("nsig"))
        .with_component(ComponentSpec::chebyshev(BACKGROUND, &["a1", "a2", "a3"]).with_yield("nbkg"))
}

fn value(outcome: &FitOutcome, name: &str) -> f64 {
    outcome.value(name).expect("parameter present")
}

fn error(outcome: &FitOutcome, name: &str) -> f64 {
    outcome.error(name).expect("parameter present")
}

// ---- Round trips ----

#[test]
// Purpose
// -------
// A quantile sample of the truth (yield ratio 200:1000 scaled by 10) is fit
// back to the truth.
//
// Expect
// ------
// - Status 0.
// - mean and sigma within ±0.1 of 125 and 2.
// - nsig within 3σ of 2000, nbkg within 3σ of 10000.
// - A positive approximate significance.
fn asimov_sample_recovers_truth() {
    // Arrange
    let obs = Observable::diphoton_mass();
    let masses = asimov_masses(2_000, 10_000, &obs);
    let data = MassDataset::unweighted(obs.clone(), masses, DomainPolicy::Strict).expect("valid data");
    let cfg = floating_config(obs, data.len() as f64, FitOptions::new(true, false));

    // Act
    let outcome = cfg.fit(&data).expect("fit runs");

    // Assert
    assert!(outcome.is_converged(), "status {} ({})", outcome.status, outcome.message);
    assert!((value(&outcome, "mean") - TRUE_MEAN).abs() < 0.1);
    assert!((value(&outcome, "sigma") - TRUE_SIGMA).abs() < 0.1);
    let nsig_err = error(&outcome, "nsig");
    assert!(nsig_err.is_finite() && nsig_err > 0.0);
    assert!((value(&outcome, "nsig") - 2_000.0).abs() < 3.0 * nsig_err);
    assert!((value(&outcome, "nbkg") - 10_000.0).abs() < 3.0 * error(&outcome, "nbkg"));
    assert!(outcome.significance.expect("signal has a yield").value_or_zero() > 0.0);
    assert_relative_eq!(
        value(&outcome, "nsig") + value(&outcome, "nbkg"),
        12_000.0,
        max_relative = 1e-3
    );
}

#[test]
// Purpose
// -------
// A seeded toy at the literal 200/1000 yields, fitted with the data-stage
// configuration (signal shape fixed), recovers the signal yield.
fn seeded_toy_recovers_signal_yield() {
    // Arrange
    let obs = Observable::diphoton_mass();
    let mut rng = StdRng::seed_from_u64(20_121_704);
    let signal = NormalSampler::new(TRUE_MEAN, TRUE_SIGMA).expect("valid normal");
    let mut masses: Vec<f64> = (0..200).map(|_| signal.sample(&mut rng)).collect();
    masses.extend((0..1_000).map(|_| linear_background_at(rng.gen::<f64>(), &obs)));
    let data = MassDataset::unweighted(obs.clone(), masses, DomainPolicy::Exclude).expect("valid data");
    let shape = FitOutcome {
        status: FitStatus::Converged,
        parameters: vec![
            FittedParameter { name: "mean".into(), value: TRUE_MEAN, error: 0.0, constant: false },
            FittedParameter { name: "sigma".into(), value: TRUE_SIGMA, error: 0.0, constant: false },
        ],
        covariance: None,
        floating: vec![],
        nll: 0.0,
        iterations: 0,
        significance: None,
        message: String::new(),
    };
    let cfg = data_fit_config(obs, &shape, data.len()).expect("valid config");

    // Act
    let outcome = cfg.fit(&data).expect("fit runs");

    // Assert
    assert!(outcome.is_converged(), "status {} ({})", outcome.status, outcome.message);
    assert_eq!(error(&outcome, "mean"), 0.0);
    assert!((value(&outcome, "nsig") - 200.0).abs() < 3.0 * error(&outcome, "nsig"));
    assert!((value(&outcome, "nbkg") - 1_000.0).abs() < 3.0 * error(&outcome, "nbkg"));
}

#[test]
// Purpose
// -------
// Refitting from converged values returns the same minimum.
fn refit_from_converged_values_is_idempotent() {
    // Arrange
    let obs = Observable::diphoton_mass();
    let data = MassDataset::unweighted(obs.clone(), asimov_masses(400, 2_000, &obs), DomainPolicy::Strict)
        .expect("valid data");
    let cfg = floating_config(obs, data.len() as f64, FitOptions::new(true, false));
    let first = cfg.fit(&data).expect("fit runs");
    assert!(first.is_converged(), "status {}", first.status);

    // Act
    let second = cfg.refit_from(&first).fit(&data).expect("refit runs");

    // Assert
    assert!(second.is_converged(), "status {}", second.status);
    assert!(second.nll <= first.nll + 1e-6);
    for name in &first.floating {
        let (a, b) = (value(&first, name), value(&second, name));
        assert!((a - b).abs() < 0.01 * error(&first, name), "{name}: {a} vs {b}");
    }
}

// ---- Weights ----

#[test]
// Purpose
// -------
// Doubling every weight leaves the shape estimates unchanged and doubles
// the yields; with `weighted_errors` the shape errors equal the unit-weight
// errors and the yield errors double.
fn doubled_weights_scale_yields_and_sumw2_errors() {
    // Arrange
    let obs = Observable::diphoton_mass();
    let masses = asimov_masses(400, 2_000, &obs);
    let n = masses.len() as f64;
    let unit = MassDataset::unweighted(obs.clone(), masses.clone(), DomainPolicy::Strict).expect("data");
    let doubled = MassDataset::new(obs.clone(), masses.clone(), Some(vec![2.0; masses.len()]), DomainPolicy::Strict)
        .expect("data");

    // Act
    let base = floating_config(obs.clone(), n, FitOptions::new(true, false)).fit(&unit).expect("fit");
    let corrected =
        floating_config(obs, 2.0 * n, FitOptions::new(true, true)).fit(&doubled).expect("fit");

    // Assert
    assert!(base.is_converged(), "status {}", base.status);
    assert!(corrected.is_converged(), "status {}", corrected.status);
    for name in ["mean", "sigma", "a1"] {
        assert_relative_eq!(value(&corrected, name), value(&base, name), epsilon = 1e-3);
        assert_relative_eq!(error(&corrected, name), error(&base, name), max_relative = 2e-2);
    }
    for name in ["nsig", "nbkg"] {
        assert_relative_eq!(value(&corrected, name), 2.0 * value(&base, name), max_relative = 1e-3);
        assert_relative_eq!(error(&corrected, name), 2.0 * error(&base, name), max_relative = 2e-2);
    }
}

#[test]
// Purpose
// -------
// An empty dataset is rejected before minimization.
fn empty_dataset_is_degenerate() {
    let obs = Observable::diphoton_mass();
    let empty = MassDataset::unweighted(obs.clone(), vec![], DomainPolicy::Strict).expect("empty is valid");
    let cfg = floating_config(obs, 100.0, FitOptions::default());

    let res = cfg.fit(&empty);

    assert!(matches!(res, Err(FitError::DegenerateDataset { events: 0, .. })));
}

// ---- Workflow ----

fn diphoton_record(mass_gev: f64, weight: Option<f64>) -> EventRecord {
    let half = 500.0 * mass_gev;
    EventRecord {
        trig_p: true,
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
// Records → preprocessing → two-stage fit → summary and projection.
//
// Given
// -----
// - Simulation: 2000 signal quantiles with weight 0.8 each.
// - Data: 1000 signal and 5000 background quantiles.
//
// Expect
// ------
// - Stage one recovers the signal shape; stage two holds it fixed and
//   recovers the signal yield within 3σ.
// - The summary marks the fixed shape parameters; the projection total
//   integrates to the fitted yields.
fn two_stage_workflow_from_records() {
    // Arrange
    let obs = Observable::diphoton_mass();
    let ctx = ExecutionContext::new(2);
    let sel = Selection::default();
    let sim_records: Vec<EventRecord> =
        gaussian_quantiles(2_000).into_iter().map(|m| diphoton_record(m, Some(0.8))).collect();
    let data_records: Vec<EventRecord> =
        asimov_masses(1_000, 5_000, &obs).into_iter().map(|m| diphoton_record(m, None)).collect();
    let sim = preprocess(&sim_records, SampleKind::Simulation, &sel, &obs, &ctx).expect("simulation");
    let data = preprocess(&data_records, SampleKind::Data, &sel, &obs, &ctx).expect("data");

    // Act
    let (signal, result) = two_stage_fit(&obs, &sim.dataset, &data.dataset).expect("workflow runs");

    // Assert
    assert!(signal.is_converged(), "status {}", signal.status);
    assert!((value(&signal, "mean") - TRUE_MEAN).abs() < 0.1);
    assert!((value(&signal, "sigma") - TRUE_SIGMA).abs() < 0.1);
    assert!(error(&signal, "mean") > 0.0);

    assert!(result.is_converged(), "status {}", result.status);
    assert_eq!(value(&result, "mean"), value(&signal, "mean"));
    assert!(result.parameter("sigma").expect("sigma").constant);
    assert!((value(&result, "nsig") - 1_000.0).abs() < 3.0 * error(&result, "nsig"));

    let text = FitSummary::new(&result).to_string();
    assert!(text.contains("mean (Fixed)"));
    assert!(text.contains("sigma (approx)"));

    let model = data_fit_config(obs.clone(), &signal, data.dataset.len())
        .expect("config")
        .build_model()
        .expect("model");
    let proj = project(&model, &result.values(), &data.dataset, 551).expect("projection");
    // Trapezoid over events-per-bin curves: ∫ total dx / bin_width = Σ yields.
    let dx = obs.width() / 550.0;
    let t = &proj.total;
    let integral: f64 = (1..t.len()).map(|i| 0.5 * (t[i - 1] + t[i]) * dx).sum();
    assert_relative_eq!(
        integral / obs.bin_width(),
        value(&result, "nsig") + value(&result, "nbkg"),
        max_relative = 1e-3
    );
    assert_relative_eq!(proj.contents.sum(), 6_000.0);
}

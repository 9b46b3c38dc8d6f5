//! Two-stage diphoton fit on synthetic records.
//!
//! Generates a weighted signal simulation and a signal+background data
//! sample as raw photon records, preprocesses both, fits the signal shape on
//! simulation, fits data with the shape fixed, and prints the summary and a
//! coarse projection table.
//!
//! Run with `RUST_LOG=info cargo run --example two_stage_fit`.
use anyhow::Result;
use diphoton_fit::{
    preprocess::{
        EventRecord, ExecutionContext, PtEtaPhiE, SampleKind, Selection, WeightFactors, preprocess,
    },
    report::{FitSummary, project},
    spectrum::{
        Observable,
        workflow::{data_fit_config, two_stage_fit},
    },
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Exp, Normal};

/// Back-to-back photon pair with invariant mass `mass_gev`, boosted along z
/// by a random pseudorapidity.
fn photon_pair<R: Rng>(rng: &mut R, mass_gev: f64) -> Vec<PtEtaPhiE> {
    let pt = 500.0 * mass_gev;
    let eta = rng.gen_range(-1.5..1.5);
    let phi = rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI);
    let e = pt * f64::cosh(eta);
    vec![PtEtaPhiE::new(pt, eta, phi, e), PtEtaPhiE::new(pt, eta, phi + std::f64::consts::PI, e)]
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = StdRng::seed_from_u64(125);
    let observable = Observable::diphoton_mass();
    let signal = Normal::new(125.0, 2.0)?;
    let background = Exp::new(1.0 / 25.0)?;

    let simulation: Vec<EventRecord> = (0..5_000)
        .map(|_| {
            let mass = signal.sample(&mut rng);
            EventRecord {
                trig_p: rng.gen_bool(0.95),
                photon_n: 2,
                photons: photon_pair(&mut rng, mass),
                weights: Some(WeightFactors {
                    scale_factor_photon: rng.gen_range(0.95..1.05),
                    scale_factor_photon_trigger: 0.98,
                    scale_factor_pileup: rng.gen_range(0.9..1.1),
                    mc_weight: 0.02,
                }),
            }
        })
        .collect();

    let data: Vec<EventRecord> = (0..20_000)
        .map(|i| {
            let mass = if i % 50 == 0 {
                signal.sample(&mut rng)
            } else {
                100.0 + background.sample(&mut rng)
            };
            EventRecord {
                trig_p: rng.gen_bool(0.9),
                photon_n: if rng.gen_bool(0.97) { 2 } else { 1 },
                photons: photon_pair(&mut rng, mass),
                weights: None,
            }
        })
        .collect();

    let ctx = ExecutionContext::default();
    let selection = Selection::default();
    let sim = preprocess(&simulation, SampleKind::Simulation, &selection, &observable, &ctx)?;
    let obs_data = preprocess(&data, SampleKind::Data, &selection, &observable, &ctx)?;
    println!(
        "simulation: {} records, {} selected, {} in range",
        sim.records,
        sim.selected,
        sim.dataset.len()
    );
    println!(
        "data:       {} records, {} selected, {} in range",
        obs_data.records,
        obs_data.selected,
        obs_data.dataset.len()
    );

    let (shape, result) = two_stage_fit(&observable, &sim.dataset, &obs_data.dataset)?;
    println!("\nSignal shape (simulation)\n{}", FitSummary::new(&shape));
    println!("\nSignal + background (data)\n{}", FitSummary::new(&result));

    let model = data_fit_config(observable.clone(), &shape, obs_data.dataset.len())?.build_model()?;
    let proj = project(&model, &result.values(), &obs_data.dataset, observable.bins + 1)?;
    println!("\n{:>8} {:>10} {:>8}", "mass", "data", "+/-");
    for ((x, n), e) in proj.bin_centers.iter().zip(proj.contents.iter()).zip(proj.errors.iter()) {
        println!("{x:>8.2} {n:>10.1} {e:>8.2}");
    }
    println!("\n{:>8} {:>10} {:>10} {:>10}", "mass", "total", "signal", "background");
    for (i, x) in proj.x.iter().enumerate() {
        println!(
            "{x:>8.2} {:>10.2} {:>10.2} {:>10.2}",
            proj.total[i], proj.components[0].y[i], proj.components[1].y[i]
        );
    }
    Ok(())
}

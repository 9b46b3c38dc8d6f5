//! Fit engine: maximum-likelihood estimation of a spectrum model.
//!
//! Purpose
//! -------
//! Fit a [`SpectrumModel`] to a [`MassDataset`] by minimizing the extended
//! or plain, unbinned or binned negative log-likelihood with L-BFGS, and
//! report parameter values, uncertainties and a [`FitStatus`].
//!
//! Key behaviors
//! -------------
//! - [`FitModel`] implements [`LogLikelihood`] over the floating parameters
//!   mapped to an unconstrained space by [`BoundTransform`]; fixed
//!   parameters never enter the optimizer vector.
//! - Points where the density is non-positive (a shape parameter outside
//!   its valid region, or a negative mixture at an event) evaluate to a
//!   finite penalty above the best NLL seen so far with a zero gradient, so
//!   line searches back off instead of aborting.
//! - After convergence, the covariance of the floating parameters is taken
//!   from the NLL curvature in external space, with the `V C V`
//!   sum-of-weights-squared correction when requested for weighted data.
//!
//! Invariants & assumptions
//! ------------------------
//! - Configuration problems (degenerate data, inconsistent options, an
//!   invalid starting point) are returned as `Err` before minimization.
//!   Failures during minimization become statuses of an `Ok` outcome that
//!   carries the best NLL and parameters reached.
//! - Each `FitModel` owns its interior scratch state; a dataset can back any
//!   number of fits.
//!
//! Conventions
//! -----------
//! - The lifecycle is `Configured → Minimizing → {Converged, Failed}` and is
//!   observable through [`FitModel::state`]. There is no automatic retry.
//!
//! Downstream usage
//! ----------------
//! - Most callers use [`fit`] or `FitConfig::fit`; [`FitModel`] is public for
//!   callers that want the lifecycle state or to drive `maximize` directly.
use crate::{
    inference::{InferenceError, calc_covariance, significance},
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{
            Grad, LogLikelihood, Termination, Theta, maximize, validation::validate_theta,
        },
        numerical_stability::transformations::BoundTransform,
    },
    spectrum::{
        core::{data::MassDataset, options::FitOptions},
        errors::{FitError, FitResult},
        models::{
            likelihood::{LikelihoodInput, negative_log_likelihood},
            outcome::{FitOutcome, FitStatus, FittedParameter},
        },
        pdf::composite::SpectrumModel,
    },
};
use ndarray::{Array1, Array2};
use std::cell::{Cell, RefCell};

/// Total weight at or below which a dataset cannot be fitted.
pub const MIN_SUM_WEIGHTS: f64 = 1e-9;

/// NLL assigned to invalid points before any valid value has been seen.
const FALLBACK_PENALTY: f64 = 1e30;

/// Lifecycle of a [`FitModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitState {
    Configured,
    Minimizing,
    Converged,
    Failed,
}

#[derive(Debug, Clone)]
struct BestPoint {
    nll: f64,
    theta: Theta,
}

/// `FitModel` — a spectrum model bound to fit options, ready to minimize.
///
/// Fields
/// ------
/// - `model`: the resolved spectrum model.
/// - `options`: likelihood form, error treatment and optimizer settings.
/// - `outcome`: populated by [`FitModel::fit`].
#[derive(Debug)]
pub struct FitModel {
    pub model: SpectrumModel,
    pub options: FitOptions,
    pub outcome: Option<FitOutcome>,
    floating: Vec<usize>,
    transforms: Vec<BoundTransform>,
    base_values: Vec<f64>,
    best: RefCell<Option<BestPoint>>,
    state: Cell<FitState>,
}

impl FitModel {
    /// Bind `model` to `options`.
    ///
    /// Errors
    /// ------
    /// - `InvalidModel` for an extended fit of a shape-only model.
    /// - `InvalidParameterConfiguration` for a floating yield in a
    ///   non-extended fit, where the yields are not identifiable.
    pub fn new(model: SpectrumModel, options: FitOptions) -> FitResult<Self> {
        if options.extended && model.is_shape_only() {
            return Err(FitError::InvalidModel {
                reason: "An extended fit needs at least one yield parameter.",
            });
        }
        if !options.extended {
            if let Some(&i) =
                model.yield_indices().iter().find(|&&i| !model.parameters.get(i).is_fixed())
            {
                return Err(FitError::InvalidParameterConfiguration {
                    name: model.parameters.name(i).to_string(),
                    reason: "A yield cannot float in a non-extended fit.",
                });
            }
        }
        let floating = model.parameters.floating_indices();
        let transforms = model.parameters.transforms();
        let base_values = model.parameters.values();
        Ok(FitModel {
            model,
            options,
            outcome: None,
            floating,
            transforms,
            base_values,
            best: RefCell::new(None),
            state: Cell::new(FitState::Configured),
        })
    }

    pub fn state(&self) -> FitState {
        self.state.get()
    }

    /// Fit `data` and store the outcome.
    ///
    /// Steps
    /// -----
    /// 1. Re-validate the events against the model's observable with the
    ///    configured domain policy.
    /// 2. Reject empty datasets and datasets with `Σw <= MIN_SUM_WEIGHTS`.
    /// 3. Evaluate the NLL at the starting point; failures are errors.
    /// 4. With no floating parameters, return `Converged` immediately.
    /// 5. Otherwise minimize, then compute the covariance when converged.
    ///
    /// Errors
    /// ------
    /// - `DomainMismatch` / `DegenerateDataset` from steps 1 and 2.
    /// - `InvalidDensity` / `InvalidShapeParameter` at the starting point.
    /// - `Optimization` for invalid optimizer settings.
    pub fn fit(&mut self, data: &MassDataset) -> FitResult<FitOutcome> {
        let data = data.apply_domain(&self.model.observable, self.options.domain_policy)?;
        let sum_w = data.sum_weights();
        if data.is_empty() || sum_w <= MIN_SUM_WEIGHTS {
            return Err(FitError::DegenerateDataset { events: data.len(), sum_weights: sum_w });
        }
        if data.excluded() > 0 {
            log::info!("{} events outside the fit range were excluded", data.excluded());
        }

        let input = LikelihoodInput::new(&data, self.options.likelihood, &self.model.observable);
        let nll0 = negative_log_likelihood(
            &self.model,
            &input,
            &self.base_values,
            self.options.extended,
            None,
        )?;
        log::info!(
            "fitting {} events (sum of weights {:.3}) with {} floating parameters, NLL0 = {:.6}",
            data.len(),
            sum_w,
            self.floating.len(),
            nll0
        );

        if self.floating.is_empty() {
            self.state.set(FitState::Converged);
            let outcome = self.build_outcome(
                FitStatus::Converged,
                &self.base_values,
                Some(Array2::zeros((0, 0))),
                nll0,
                0,
                "all parameters fixed".to_string(),
            );
            self.outcome = Some(outcome.clone());
            return Ok(outcome);
        }

        let theta0 = self.model.parameters.encode();
        *self.best.borrow_mut() = Some(BestPoint { nll: nll0, theta: theta0.clone() });
        self.state.set(FitState::Minimizing);

        let (status, theta_hat, nll, iterations, message) =
            match maximize(&*self, theta0, &input, &self.options.mle) {
                Ok(out) => {
                    let status = match out.termination {
                        Termination::Converged => FitStatus::Converged,
                        Termination::MaxIterations => FitStatus::MaxIterationsReached,
                        _ => FitStatus::LineSearchFailed,
                    };
                    (status, out.theta_hat, -out.value, out.iterations, out.status)
                }
                Err(err @ (OptError::InvalidTolGrad { .. }
                | OptError::InvalidTolCost { .. }
                | OptError::InvalidMaxIter { .. }
                | OptError::NoTolerancesProvided
                | OptError::InvalidLBFGSMem { .. })) => {
                    self.state.set(FitState::Failed);
                    return Err(FitError::Optimization(err));
                }
                Err(err) => {
                    log::warn!("minimization stopped early: {err}");
                    let best = self.best.borrow().clone();
                    let (nll, theta) = match best {
                        Some(b) => (b.nll, b.theta),
                        None => (nll0, self.model.parameters.encode()),
                    };
                    (FitStatus::LineSearchFailed, theta, nll, 0, err.to_string())
                }
            };

        let values = self.external_values(&theta_hat);
        let (status, covariance) = if status == FitStatus::Converged {
            self.covariance(&values, &data)
        } else {
            (status, None)
        };

        self.state.set(if status.is_success() { FitState::Converged } else { FitState::Failed });
        match status {
            FitStatus::Converged => log::info!("fit converged after {iterations} iterations, NLL = {nll:.6}"),
            other => log::warn!("fit finished with status {other}, NLL = {nll:.6}"),
        }
        let outcome = self.build_outcome(status, &values, covariance, nll, iterations, message);
        self.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    // ---- Helper methods ----

    fn external_values(&self, theta: &Theta) -> Vec<f64> {
        let mut values = self.base_values.clone();
        for (k, &i) in self.floating.iter().enumerate() {
            values[i] = self.transforms[k].to_external(theta[k]);
        }
        values
    }

    /// Gradient of the NLL w.r.t. the external floating values `x`.
    fn external_grad(&self, x: &Theta, input: &LikelihoodInput) -> OptResult<Grad> {
        let mut values = self.base_values.clone();
        for (k, &i) in self.floating.iter().enumerate() {
            values[i] = x[k];
        }
        let mut full = vec![0.0; values.len()];
        negative_log_likelihood(&self.model, input, &values, self.options.extended, Some(&mut full))?;
        Ok(self.floating.iter().map(|&i| full[i]).collect())
    }

    fn covariance(
        &self, values: &[f64], data: &MassDataset,
    ) -> (FitStatus, Option<Array2<f64>>) {
        let x_hat: Array1<f64> = self.floating.iter().map(|&i| values[i]).collect();
        let input = LikelihoodInput::new(data, self.options.likelihood, &self.model.observable);
        let grad = |x: &Theta| self.external_grad(x, &input);

        let result = if self.options.weighted_errors && data.is_weighted() {
            let squared = data.with_squared_weights();
            let input_w2 =
                LikelihoodInput::new(&squared, self.options.likelihood, &self.model.observable);
            let grad_w2 = |x: &Theta| self.external_grad(x, &input_w2);
            calc_covariance(&grad, &x_hat, Some(&grad_w2))
        } else {
            calc_covariance(&grad, &x_hat, None::<&fn(&Theta) -> OptResult<Grad>>)
        };

        match result {
            Ok(cov) => (FitStatus::Converged, Some(cov)),
            Err(InferenceError::NotPositiveDefinite { min_eigenvalue }) => {
                log::warn!("NLL curvature is not positive definite (min eigenvalue {min_eigenvalue:e})");
                (FitStatus::HessianNotPositiveDefinite, None)
            }
            Err(err) => {
                log::warn!("covariance unavailable: {err}");
                (FitStatus::CovarianceFailed, None)
            }
        }
    }

    fn build_outcome(
        &self, status: FitStatus, values: &[f64], covariance: Option<Array2<f64>>, nll: f64,
        iterations: usize, message: String,
    ) -> FitOutcome {
        let params = &self.model.parameters;
        let parameters: Vec<FittedParameter> = (0..params.len())
            .map(|i| {
                let constant = params.get(i).is_fixed();
                let error = if constant {
                    0.0
                } else {
                    let k = self.floating.iter().position(|&f| f == i);
                    match (&covariance, k) {
                        (Some(cov), Some(k)) => cov[[k, k]].max(0.0).sqrt(),
                        _ => f64::NAN,
                    }
                };
                FittedParameter { name: params.name(i).to_string(), value: values[i], error, constant }
            })
            .collect();

        let significance = self.model.components.first().and_then(|c| c.yield_index).map(|i| {
            let p = &parameters[i];
            significance(p.value, p.error)
        });

        FitOutcome {
            status,
            parameters,
            covariance,
            floating: self.floating.iter().map(|&i| params.name(i).to_string()).collect(),
            nll,
            iterations,
            significance,
            message,
        }
    }

    fn record(&self, nll: f64, theta: &Theta) {
        let mut best = self.best.borrow_mut();
        if best.as_ref().map_or(true, |b| nll < b.nll) {
            *best = Some(BestPoint { nll, theta: theta.clone() });
        }
    }

    fn penalty(&self) -> f64 {
        match self.best.borrow().as_ref() {
            Some(b) => b.nll + 1.0 + b.nll.abs(),
            None => FALLBACK_PENALTY,
        }
    }
}

impl LogLikelihood for FitModel {
    type Data = LikelihoodInput;

    /// `ℓ(θ) = -NLL` at the external values decoded from `θ`, or minus the
    /// penalty at invalid points.
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<f64> {
        validate_theta(theta, self.floating.len())?;
        let values = self.external_values(theta);
        match negative_log_likelihood(&self.model, data, &values, self.options.extended, None) {
            Ok(nll) => {
                self.record(nll, theta);
                Ok(-nll)
            }
            Err(err) if err.is_invalid_region() => Ok(-self.penalty()),
            Err(err) => Err(err.into()),
        }
    }

    /// Rejects a starting point where the NLL does not exist.
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        validate_theta(theta, self.floating.len())?;
        let values = self.external_values(theta);
        negative_log_likelihood(&self.model, data, &values, self.options.extended, None)?;
        Ok(())
    }

    /// `∇ℓ(θ)` by the chain rule through the bound transforms; zero at
    /// invalid points.
    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
        validate_theta(theta, self.floating.len())?;
        let values = self.external_values(theta);
        let mut full = vec![0.0; values.len()];
        match negative_log_likelihood(
            &self.model,
            data,
            &values,
            self.options.extended,
            Some(&mut full),
        ) {
            Ok(_) => Ok(self
                .floating
                .iter()
                .enumerate()
                .map(|(k, &i)| -full[i] * self.transforms[k].derivative(theta[k]))
                .collect()),
            Err(err) if err.is_invalid_region() => Ok(Array1::zeros(theta.len())),
            Err(err) => Err(err.into()),
        }
    }
}

/// Fit `data` with `model` under `options`.
///
/// Parameters
/// ----------
/// - `model`: resolved spectrum model; it is not modified.
/// - `data`: events to fit.
/// - `options`: likelihood form, error treatment and optimizer settings.
///
/// Returns
/// -------
/// A [`FitOutcome`] whose status tells whether minimization and the
/// covariance succeeded.
///
/// Errors
/// ------
/// - Configuration errors listed on [`FitModel::new`] and [`FitModel::fit`].
pub fn fit(model: &SpectrumModel, data: &MassDataset, options: &FitOptions) -> FitResult<FitOutcome> {
    let mut fit_model = FitModel::new(model.clone(), options.clone())?;
    fit_model.fit(data)
}

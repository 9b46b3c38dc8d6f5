//! Gaussian density truncated to the observable range.
//!
//! Purpose
//! -------
//! Evaluate `f(x; μ, σ) = φ(z) / (σ Z)` with `z = (x - μ)/σ` and
//! `Z = Φ(z_max) - Φ(z_min)`, its analytic derivatives with respect to
//! `(μ, σ)`, and its exact integral over sub-intervals of the range.
//!
//! Key behaviors
//! -------------
//! - [`TruncatedGaussian::new`] validates `(μ, σ)` and precomputes `Z` and
//!   `∂ ln Z / ∂(μ, σ)` once per parameter point.
//! - Differences of `Φ` are evaluated on the upper tail when both arguments
//!   are positive so that a peak far outside the range keeps `Z > 0` for as
//!   long as `f64` allows.
//!
//! Invariants & assumptions
//! ------------------------
//! - `σ > 0` and finite, `μ` finite, `Z > 0`; otherwise construction fails
//!   with [`FitError::InvalidShapeParameter`].
//!
//! Conventions
//! -----------
//! - Gradient slots are ordered `[∂/∂μ, ∂/∂σ]`.
use crate::spectrum::errors::{FitError, FitResult};
use statrs::function::erf::erfc;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Standard normal density.
pub fn std_normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * PI).sqrt()
}

/// Standard normal CDF via the complementary error function.
pub fn std_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z * FRAC_1_SQRT_2)
}

/// `Φ(z2) - Φ(z1)` for `z1 <= z2`, evaluated on the tail that avoids
/// cancellation.
pub fn std_normal_mass(z1: f64, z2: f64) -> f64 {
    if z1 > 0.0 {
        0.5 * (erfc(z1 * FRAC_1_SQRT_2) - erfc(z2 * FRAC_1_SQRT_2))
    } else {
        std_normal_cdf(z2) - std_normal_cdf(z1)
    }
}

/// Prepared truncated Gaussian for one `(μ, σ)` on `[a, b]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruncatedGaussian {
    mu: f64,
    sigma: f64,
    norm: f64,
    dlogz_dmu: f64,
    dlogz_dsigma: f64,
}

impl TruncatedGaussian {
    /// Prepare the density on `[a, b]`.
    ///
    /// Errors
    /// ------
    /// - `InvalidShapeParameter { name: "sigma" }` for `σ <= 0` or non-finite.
    /// - `InvalidShapeParameter { name: "mean" }` for non-finite `μ` or when
    ///   the truncated mass `Z` underflows to zero.
    pub fn new(mu: f64, sigma: f64, a: f64, b: f64) -> FitResult<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(FitError::InvalidShapeParameter { name: "sigma", value: sigma });
        }
        if !mu.is_finite() {
            return Err(FitError::InvalidShapeParameter { name: "mean", value: mu });
        }
        let za = (a - mu) / sigma;
        let zb = (b - mu) / sigma;
        let norm = std_normal_mass(za, zb);
        if !norm.is_finite() || norm <= 0.0 {
            return Err(FitError::InvalidShapeParameter { name: "mean", value: mu });
        }
        let phi_a = std_normal_pdf(za);
        let phi_b = std_normal_pdf(zb);
        let dlogz_dmu = (phi_a - phi_b) / (sigma * norm);
        let dlogz_dsigma = (za * phi_a - zb * phi_b) / (sigma * norm);
        Ok(TruncatedGaussian { mu, sigma, norm, dlogz_dmu, dlogz_dsigma })
    }

    pub fn density(&self, x: f64) -> f64 {
        let z = (x - self.mu) / self.sigma;
        std_normal_pdf(z) / (self.sigma * self.norm)
    }

    /// Density and `[∂f/∂μ, ∂f/∂σ]` written into `grad`.
    pub fn density_and_grad(&self, x: f64, grad: &mut [f64]) -> f64 {
        let z = (x - self.mu) / self.sigma;
        let f = std_normal_pdf(z) / (self.sigma * self.norm);
        grad[0] = f * (z / self.sigma - self.dlogz_dmu);
        grad[1] = f * ((z * z - 1.0) / self.sigma - self.dlogz_dsigma);
        f
    }

    /// Probability mass on `[lo, hi]`.
    pub fn bin_mass(&self, lo: f64, hi: f64) -> f64 {
        let z_lo = (lo - self.mu) / self.sigma;
        let z_hi = (hi - self.mu) / self.sigma;
        std_normal_mass(z_lo, z_hi) / self.norm
    }

    /// Mass on `[lo, hi]` and its `[∂/∂μ, ∂/∂σ]` written into `grad`.
    pub fn bin_mass_and_grad(&self, lo: f64, hi: f64, grad: &mut [f64]) -> f64 {
        let z_lo = (lo - self.mu) / self.sigma;
        let z_hi = (hi - self.mu) / self.sigma;
        let phi_lo = std_normal_pdf(z_lo);
        let phi_hi = std_normal_pdf(z_hi);
        let mass = std_normal_mass(z_lo, z_hi) / self.norm;
        let scale = 1.0 / (self.sigma * self.norm);
        grad[0] = (phi_lo - phi_hi) * scale - mass * self.dlogz_dmu;
        grad[1] = (z_lo * phi_lo - z_hi * phi_hi) * scale - mass * self.dlogz_dsigma;
        mass
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
    // - Normalization over the truncation range.
    // - Analytic gradients of the density and of bin masses against central
    //   differences.
    // - Rejection of invalid widths and of peaks with vanishing mass.
    // -------------------------------------------------------------------------

    const A: f64 = 105.0;
    const B: f64 = 160.0;

    #[test]
    // Purpose
    // -------
    // A midpoint-rule integral of the density over [a, b] is 1, also for a
    // peak close to the edge, and the bin masses of a partition sum to 1.
    fn truncated_density_is_normalized() {
        for &(mu, sigma) in &[(125.0, 2.0), (106.0, 4.0)] {
            // Arrange
            let g = TruncatedGaussian::new(mu, sigma, A, B).expect("valid shape");
            let n = 20_000;
            let h = (B - A) / n as f64;

            // Act
            let integral: f64 = (0..n).map(|i| g.density(A + h * (i as f64 + 0.5)) * h).sum();
            let masses: f64 = (0..11).map(|i| g.bin_mass(A + 5.0 * i as f64, A + 5.0 * (i + 1) as f64)).sum();

            // Assert
            assert_relative_eq!(integral, 1.0, epsilon = 1e-6);
            assert_relative_eq!(masses, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Analytic derivatives of the density and of a bin mass agree with
    // central differences in μ and σ.
    fn gradients_match_central_differences() {
        // Arrange
        let (mu, sigma) = (124.0, 2.5);
        let eps = 1e-6;
        let g = TruncatedGaussian::new(mu, sigma, A, B).expect("valid shape");
        let shifted = |dm: f64, ds: f64| TruncatedGaussian::new(mu + dm, sigma + ds, A, B).expect("valid");

        for &x in &[106.0, 121.0, 124.0, 127.5, 150.0] {
            // Act
            let mut grad = [0.0; 2];
            g.density_and_grad(x, &mut grad);
            let fd_mu = (shifted(eps, 0.0).density(x) - shifted(-eps, 0.0).density(x)) / (2.0 * eps);
            let fd_sigma = (shifted(0.0, eps).density(x) - shifted(0.0, -eps).density(x)) / (2.0 * eps);

            // Assert
            assert_relative_eq!(grad[0], fd_mu, epsilon = 1e-7, max_relative = 1e-5);
            assert_relative_eq!(grad[1], fd_sigma, epsilon = 1e-7, max_relative = 1e-5);
        }

        let mut grad = [0.0; 2];
        g.bin_mass_and_grad(122.0, 125.0, &mut grad);
        let fd_mu =
            (shifted(eps, 0.0).bin_mass(122.0, 125.0) - shifted(-eps, 0.0).bin_mass(122.0, 125.0)) / (2.0 * eps);
        let fd_sigma =
            (shifted(0.0, eps).bin_mass(122.0, 125.0) - shifted(0.0, -eps).bin_mass(122.0, 125.0)) / (2.0 * eps);
        assert_relative_eq!(grad[0], fd_mu, epsilon = 1e-7, max_relative = 1e-5);
        assert_relative_eq!(grad[1], fd_sigma, epsilon = 1e-7, max_relative = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // Non-positive widths and peaks whose truncated mass underflows are
    // invalid shape parameters.
    fn invalid_parameters_are_rejected() {
        assert!(matches!(
            TruncatedGaussian::new(125.0, 0.0, A, B),
            Err(FitError::InvalidShapeParameter { name: "sigma", .. })
        ));
        assert!(matches!(
            TruncatedGaussian::new(1.0e4, 0.01, A, B),
            Err(FitError::InvalidShapeParameter { name: "mean", .. })
        ));
        assert!(TruncatedGaussian::new(170.0, 2.0, A, B).is_ok());
    }
}

//! Chebyshev-series background density on the observable range.
//!
//! The unnormalized shape is `s(u) = 1 + Σ_{k=1..m} c_k T_k(u)` with
//! `u = 2(x - a)/w - 1`, `w = b - a`, and `T_k` the Chebyshev polynomials of
//! the first kind. The normalization is closed form,
//! `I = w (1 + Σ_{k even} c_k / (1 - k²))`, and bin masses use the
//! antiderivatives `P_1 = u²/2`,
//! `P_k = T_{k+1}/(2(k+1)) - T_{k-1}/(2(k-1))`.
//!
//! A coefficient set is accepted only if `s` is positive on a fixed grid of
//! [`POSITIVITY_GRID`] points in `[-1, 1]`.
use crate::spectrum::errors::{FitError, FitResult};

/// Highest supported series order.
pub const MAX_CHEBYSHEV_ORDER: usize = 8;

/// Number of grid points of the positivity check.
pub const POSITIVITY_GRID: usize = 128;

/// Prepared Chebyshev density for one coefficient set on `[a, b]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChebyshevSeries {
    coeffs: [f64; MAX_CHEBYSHEV_ORDER],
    order: usize,
    a: f64,
    width: f64,
    norm: f64,
}

impl ChebyshevSeries {
    /// Prepare the density on `[a, b]`.
    ///
    /// Errors
    /// ------
    /// - `InvalidShapeParameter` for a non-finite coefficient, a
    ///   non-positive normalization, or a failed positivity check.
    ///
    /// Panics
    /// ------
    /// - If `coefficients.len()` exceeds [`MAX_CHEBYSHEV_ORDER`]; model
    ///   construction rejects such orders first.
    pub fn new(coefficients: &[f64], a: f64, b: f64) -> FitResult<Self> {
        let order = coefficients.len();
        assert!(order <= MAX_CHEBYSHEV_ORDER, "Chebyshev order {order} exceeds the maximum");
        let mut coeffs = [0.0; MAX_CHEBYSHEV_ORDER];
        for (slot, &c) in coeffs.iter_mut().zip(coefficients) {
            if !c.is_finite() {
                return Err(FitError::InvalidShapeParameter { name: "chebyshev coefficient", value: c });
            }
            *slot = c;
        }
        let width = b - a;
        let mut norm = 1.0;
        for k in (2..=order).step_by(2) {
            norm += coeffs[k - 1] / (1.0 - (k * k) as f64);
        }
        norm *= width;
        if !norm.is_finite() || norm <= 0.0 {
            return Err(FitError::InvalidShapeParameter { name: "chebyshev normalization", value: norm });
        }
        let series = ChebyshevSeries { coeffs, order, a, width, norm };

        let mut t = [0.0; MAX_CHEBYSHEV_ORDER + 2];
        for i in 0..POSITIVITY_GRID {
            let u = -1.0 + 2.0 * (i as f64 + 0.5) / POSITIVITY_GRID as f64;
            let s = series.shape(u, &mut t);
            if !s.is_finite() || s <= 0.0 {
                return Err(FitError::InvalidShapeParameter { name: "chebyshev positivity", value: s });
            }
        }
        Ok(series)
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn density(&self, x: f64) -> f64 {
        let mut t = [0.0; MAX_CHEBYSHEV_ORDER + 2];
        self.shape(self.map(x), &mut t) / self.norm
    }

    /// Density and `∂f/∂c_k` for `k = 1..=order` written into `grad`.
    pub fn density_and_grad(&self, x: f64, grad: &mut [f64]) -> f64 {
        let mut t = [0.0; MAX_CHEBYSHEV_ORDER + 2];
        let s = self.shape(self.map(x), &mut t);
        let f = s / self.norm;
        for k in 1..=self.order {
            grad[k - 1] = (t[k] - f * self.dnorm_dc(k)) / self.norm;
        }
        f
    }

    /// Probability mass on `[lo, hi]`.
    pub fn bin_mass(&self, lo: f64, hi: f64) -> f64 {
        let mut t1 = [0.0; MAX_CHEBYSHEV_ORDER + 2];
        let mut t2 = [0.0; MAX_CHEBYSHEV_ORDER + 2];
        let (u1, u2) = (self.map(lo), self.map(hi));
        fill_t(u1, self.order + 1, &mut t1);
        fill_t(u2, self.order + 1, &mut t2);
        let mut area = u2 - u1;
        for k in 1..=self.order {
            area += self.coeffs[k - 1] * (antiderivative(k, u2, &t2) - antiderivative(k, u1, &t1));
        }
        0.5 * self.width * area / self.norm
    }

    /// Mass on `[lo, hi]` and `∂/∂c_k` written into `grad`.
    pub fn bin_mass_and_grad(&self, lo: f64, hi: f64, grad: &mut [f64]) -> f64 {
        let mut t1 = [0.0; MAX_CHEBYSHEV_ORDER + 2];
        let mut t2 = [0.0; MAX_CHEBYSHEV_ORDER + 2];
        let (u1, u2) = (self.map(lo), self.map(hi));
        fill_t(u1, self.order + 1, &mut t1);
        fill_t(u2, self.order + 1, &mut t2);
        let half_w = 0.5 * self.width;
        let mut area = u2 - u1;
        for k in 1..=self.order {
            let dp = antiderivative(k, u2, &t2) - antiderivative(k, u1, &t1);
            area += self.coeffs[k - 1] * dp;
            grad[k - 1] = half_w * dp;
        }
        let mass = half_w * area / self.norm;
        for k in 1..=self.order {
            grad[k - 1] = (grad[k - 1] - mass * self.dnorm_dc(k)) / self.norm;
        }
        mass
    }

    fn map(&self, x: f64) -> f64 {
        (2.0 * (x - self.a) / self.width - 1.0).clamp(-1.0, 1.0)
    }

    /// `s(u)`, leaving `T_0..T_order` in `t`.
    fn shape(&self, u: f64, t: &mut [f64]) -> f64 {
        fill_t(u, self.order, t);
        1.0 + (1..=self.order).map(|k| self.coeffs[k - 1] * t[k]).sum::<f64>()
    }

    fn dnorm_dc(&self, k: usize) -> f64 {
        if k % 2 == 0 { self.width / (1.0 - (k * k) as f64) } else { 0.0 }
    }
}

/// `t[k] = T_k(u)` for `k = 0..=n`.
fn fill_t(u: f64, n: usize, t: &mut [f64]) {
    t[0] = 1.0;
    if n >= 1 {
        t[1] = u;
    }
    for k in 2..=n {
        t[k] = 2.0 * u * t[k - 1] - t[k - 2];
    }
}

/// `∫ T_k du` up to a constant, with `t` holding `T_0..T_{k+1}` at `u`.
fn antiderivative(k: usize, u: f64, t: &[f64]) -> f64 {
    if k == 1 {
        0.5 * u * u
    } else {
        t[k + 1] / (2.0 * (k + 1) as f64) - t[k - 1] / (2.0 * (k - 1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Normalization, closed-form bin masses, coefficient gradients, and the
    // positivity guard.
    // -------------------------------------------------------------------------

    const A: f64 = 105.0;
    const B: f64 = 160.0;
    const COEFFS: [f64; 3] = [-0.5, 0.1, 0.01];

    #[test]
    // Purpose
    // -------
    // The density integrates to one and closed-form bin masses agree with a
    // numerical integral of the density.
    fn density_is_normalized_and_bin_masses_match_quadrature() {
        // Arrange
        let cheb = ChebyshevSeries::new(&COEFFS, A, B).expect("valid coefficients");
        let n = 20_000;
        let h = (B - A) / n as f64;

        // Act
        let integral: f64 = (0..n).map(|i| cheb.density(A + h * (i as f64 + 0.5)) * h).sum();
        let (lo, hi) = (118.0, 131.5);
        let hb = (hi - lo) / n as f64;
        let partial: f64 = (0..n).map(|i| cheb.density(lo + hb * (i as f64 + 0.5)) * hb).sum();

        // Assert
        assert_relative_eq!(integral, 1.0, epsilon = 1e-8);
        assert_relative_eq!(cheb.bin_mass(A, B), 1.0, epsilon = 1e-12);
        assert_relative_eq!(cheb.bin_mass(lo, hi), partial, epsilon = 1e-8);
    }

    #[test]
    // Purpose
    // -------
    // Coefficient gradients of the density and of a bin mass agree with
    // central differences.
    fn coefficient_gradients_match_central_differences() {
        // Arrange
        let eps = 1e-7;
        let cheb = ChebyshevSeries::new(&COEFFS, A, B).expect("valid coefficients");
        let bumped = |k: usize, d: f64| {
            let mut c = COEFFS;
            c[k] += d;
            ChebyshevSeries::new(&c, A, B).expect("valid coefficients")
        };

        for &x in &[105.0, 117.3, 140.0, 160.0] {
            // Act
            let mut grad = [0.0; 3];
            cheb.density_and_grad(x, &mut grad);
            let mut mass_grad = [0.0; 3];
            cheb.bin_mass_and_grad(A, x.max(A + 1.0), &mut mass_grad);

            // Assert
            for k in 0..3 {
                let fd = (bumped(k, eps).density(x) - bumped(k, -eps).density(x)) / (2.0 * eps);
                assert_relative_eq!(grad[k], fd, epsilon = 1e-8, max_relative = 1e-5);
                let hi = x.max(A + 1.0);
                let fd_mass =
                    (bumped(k, eps).bin_mass(A, hi) - bumped(k, -eps).bin_mass(A, hi)) / (2.0 * eps);
                assert_relative_eq!(mass_grad[k], fd_mass, epsilon = 1e-8, max_relative = 1e-5);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Coefficients that push the series negative somewhere in the range
    // fail the positivity guard.
    fn positivity_guard_rejects_negative_series() {
        // 1 + 2 T_1 is negative for u < -0.5.
        let res = ChebyshevSeries::new(&[2.0, 0.0, 0.0], A, B);

        assert!(matches!(res, Err(FitError::InvalidShapeParameter { .. })));
    }
}

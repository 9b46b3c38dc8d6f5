//! Massless-or-massive four-vectors in collider coordinates.
//!
//! A [`PtEtaPhiE`] holds transverse momentum, pseudorapidity, azimuth and
//! energy. Sums are taken in Cartesian components; the invariant mass of a
//! space-like result (from rounding) is returned as `-sqrt(-m²)`.
use std::ops::Add;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtEtaPhiE {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub e: f64,
}

/// Cartesian `(px, py, pz, E)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cartesian {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub e: f64,
}

impl PtEtaPhiE {
    pub fn new(pt: f64, eta: f64, phi: f64, e: f64) -> Self {
        PtEtaPhiE { pt, eta, phi, e }
    }

    pub fn is_finite(&self) -> bool {
        self.pt.is_finite() && self.eta.is_finite() && self.phi.is_finite() && self.e.is_finite()
    }

    pub fn to_cartesian(&self) -> Cartesian {
        Cartesian {
            px: self.pt * self.phi.cos(),
            py: self.pt * self.phi.sin(),
            pz: self.pt * self.eta.sinh(),
            e: self.e,
        }
    }
}

impl Cartesian {
    pub fn mass(&self) -> f64 {
        let m2 = self.e * self.e - (self.px * self.px + self.py * self.py + self.pz * self.pz);
        if m2 >= 0.0 { m2.sqrt() } else { -(-m2).sqrt() }
    }
}

impl Add for Cartesian {
    type Output = Cartesian;

    fn add(self, rhs: Cartesian) -> Cartesian {
        Cartesian {
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
            e: self.e + rhs.e,
        }
    }
}

/// Invariant mass of a pair, in the units of the inputs.
pub fn invariant_mass(a: &PtEtaPhiE, b: &PtEtaPhiE) -> f64 {
    (a.to_cartesian() + b.to_cartesian()).mass()
}

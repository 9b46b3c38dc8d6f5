//! inference::significance — point-estimate significance of a fitted yield.
//!
//! The figure reported is the simple ratio `value / error` of a fitted
//! signal yield to its uncertainty. It is not a profile-likelihood
//! significance; it matches what the analysis prints as "approximate
//! significance".

/// Ratio of a fitted yield to its uncertainty, or a sentinel when the
/// uncertainty is unusable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Significance {
    Approximate(f64),
    /// The uncertainty was zero, negative, or not finite.
    Undefined,
}

impl Significance {
    /// Numeric value, with `Undefined` reported as `0.0`.
    pub fn value_or_zero(&self) -> f64 {
        match *self {
            Significance::Approximate(z) => z,
            Significance::Undefined => 0.0,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Significance::Approximate(_))
    }
}

impl std::fmt::Display for Significance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Significance::Approximate(z) => write!(f, "{z:.2}"),
            Significance::Undefined => write!(f, "undefined"),
        }
    }
}

/// `value / error` when `error` is finite and strictly positive, else
/// [`Significance::Undefined`].
pub fn significance(value: f64, error: f64) -> Significance {
    if error.is_finite() && error > 0.0 && value.is_finite() {
        Significance::Approximate(value / error)
    } else {
        Significance::Undefined
    }
}

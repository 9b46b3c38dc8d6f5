//! Text summary of a fit, in the layout of the analysis printout.
//!
//! ```text
//! ========================================
//! Fit status    : 0 (converged)
//! mean (Fixed)  : 124.8970
//! sigma (Fixed) : 2.9402
//! nsig          : 180.12 +/- 45.03
//! Significance  : 4.00 sigma (approx)
//! ========================================
//! ```
use crate::spectrum::models::outcome::FitOutcome;
use std::fmt;

const RULE: &str = "========================================";
const LABEL_WIDTH: usize = 14;

/// Display adapter over a [`FitOutcome`].
#[derive(Debug, Clone, Copy)]
pub struct FitSummary<'a> {
    outcome: &'a FitOutcome,
}

impl<'a> FitSummary<'a> {
    pub fn new(outcome: &'a FitOutcome) -> Self {
        FitSummary { outcome }
    }
}

impl fmt::Display for FitSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let out = self.outcome;
        writeln!(f, "{RULE}")?;
        writeln!(f, "{:<LABEL_WIDTH$}: {} ({})", "Fit status", out.status.code(), out.status.label())?;
        for p in &out.parameters {
            if p.constant {
                let label = format!("{} (Fixed)", p.name);
                writeln!(f, "{label:<LABEL_WIDTH$}: {:.4}", p.value)?;
            } else if p.value.abs() >= 10.0 {
                writeln!(f, "{:<LABEL_WIDTH$}: {:.2} +/- {:.2}", p.name, p.value, p.error)?;
            } else {
                writeln!(f, "{:<LABEL_WIDTH$}: {:.4} +/- {:.4}", p.name, p.value, p.error)?;
            }
        }
        if let Some(z) = out.significance {
            writeln!(f, "{:<LABEL_WIDTH$}: {:.2} sigma (approx)", "Significance", z.value_or_zero())?;
        }
        write!(f, "{RULE}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        inference::significance,
        spectrum::models::outcome::{FitStatus, FittedParameter},
    };

    #[test]
    // Purpose
    // -------
    // The summary lists fixed parameters without errors, floating ones with
    // errors, and the approximate significance; an undefined significance
    // prints as 0.
    fn summary_box_content() {
        // Arrange
        let mut outcome = FitOutcome {
            status: FitStatus::Converged,
            parameters: vec![
                FittedParameter { name: "mean".into(), value: 124.897, error: 0.0, constant: true },
                FittedParameter { name: "nsig".into(), value: 180.0, error: 45.0, constant: false },
            ],
            covariance: None,
            floating: vec!["nsig".into()],
            nll: 0.0,
            iterations: 20,
            significance: Some(significance(180.0, 45.0)),
            message: String::new(),
        };

        // Act
        let text = FitSummary::new(&outcome).to_string();
        outcome.significance = Some(significance(180.0, 0.0));
        let undefined = FitSummary::new(&outcome).to_string();

        // Assert
        assert!(text.starts_with(RULE) && text.ends_with(RULE));
        assert!(text.contains("Fit status    : 0 (converged)"));
        assert!(text.contains("mean (Fixed)  : 124.8970"));
        assert!(text.contains("nsig          : 180.00 +/- 45.00"));
        assert!(text.contains("Significance  : 4.00 sigma (approx)"));
        assert!(undefined.contains("Significance  : 0.00 sigma (approx)"));
    }
}

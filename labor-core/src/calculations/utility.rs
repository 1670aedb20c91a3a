//! Period utility over consumption and labor.
//!
//! `U(c, l) = u(c) − φ / (1 + 1/ε) · l^(1 + 1/ε)` where `u` is CRRA
//! (`c^(1−γ) / (1−γ)`) or log utility.

use thiserror::Error;

use crate::{ConsumptionUtility, UtilityParameters};

#[derive(Debug, Error, PartialEq)]
pub enum UtilityError {
    /// CRRA needs a finite, non-negative γ other than 1 (which is log utility).
    #[error("CRRA risk aversion must be finite, non-negative and not 1, got {0}")]
    InvalidRiskAversion(f64),

    #[error("Frisch elasticity must be finite and positive, got {0}")]
    InvalidFrischElasticity(f64),

    #[error("labor disutility scale must be finite and positive, got {0}")]
    InvalidLaborDisutility(f64),
}

/// A validated utility function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtilityFunction {
    params: UtilityParameters,
    /// `1 + 1/ε`, the exponent on labor.
    labor_exponent: f64,
}

impl UtilityFunction {
    /// # Errors
    ///
    /// Returns [`UtilityError`] if γ, ε or φ is outside its domain.
    pub fn new(params: UtilityParameters) -> Result<Self, UtilityError> {
        if let ConsumptionUtility::Crra { gamma } = params.consumption {
            if !gamma.is_finite() || gamma < 0.0 || gamma == 1.0 {
                return Err(UtilityError::InvalidRiskAversion(gamma));
            }
        }
        if !params.frisch_elasticity.is_finite() || params.frisch_elasticity <= 0.0 {
            return Err(UtilityError::InvalidFrischElasticity(
                params.frisch_elasticity,
            ));
        }
        if !params.labor_disutility.is_finite() || params.labor_disutility <= 0.0 {
            return Err(UtilityError::InvalidLaborDisutility(
                params.labor_disutility,
            ));
        }

        Ok(Self {
            params,
            labor_exponent: 1.0 + 1.0 / params.frisch_elasticity,
        })
    }

    pub fn params(&self) -> &UtilityParameters {
        &self.params
    }

    /// Utility from consumption alone. Expects `consumption > 0`.
    pub fn consumption_utility(
        &self,
        consumption: f64,
    ) -> f64 {
        match self.params.consumption {
            ConsumptionUtility::Log => consumption.ln(),
            ConsumptionUtility::Crra { gamma } => {
                consumption.powf(1.0 - gamma) / (1.0 - gamma)
            }
        }
    }

    /// Disutility of supplying `labor` (a non-negative quantity).
    pub fn labor_disutility(
        &self,
        labor: f64,
    ) -> f64 {
        self.params.labor_disutility / self.labor_exponent * labor.powf(self.labor_exponent)
    }

    pub fn utility(
        &self,
        consumption: f64,
        labor: f64,
    ) -> f64 {
        self.consumption_utility(consumption) - self.labor_disutility(labor)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn assert_close(
        actual: f64,
        expected: f64,
    ) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn crra_utility_matches_closed_form() {
        let utility = UtilityFunction::new(UtilityParameters::new(2.0, 0.5, 1.0)).unwrap();

        // −1/c − l³/3
        assert_close(utility.utility(8.0, 0.5), -0.125 - 0.125 / 3.0);
    }

    #[test]
    fn log_utility_matches_closed_form() {
        let utility = UtilityFunction::new(UtilityParameters::new(1.0, 1.0, 2.0)).unwrap();

        // ln c − 2/2 · l²
        assert_close(utility.utility(std::f64::consts::E, 3.0), 1.0 - 9.0);
    }

    #[test]
    fn crra_approaches_log_up_to_a_constant_near_gamma_one() {
        let near = UtilityFunction::new(UtilityParameters::new(1.0 + 1e-7, 0.5, 1.0)).unwrap();
        let log = UtilityFunction::new(UtilityParameters::new(1.0, 0.5, 1.0)).unwrap();

        // c^(1−γ)/(1−γ) = ln c + 1/(1−γ) + O(1−γ)
        let offset = 1.0 / (1.0 - (1.0 + 1e-7));
        let diff = near.consumption_utility(50.0) - offset - log.consumption_utility(50.0);

        assert!(diff.abs() < 1e-4, "diff {diff}");
    }

    #[test]
    fn zero_labor_has_no_disutility() {
        let utility = UtilityFunction::new(UtilityParameters::default()).unwrap();

        assert_eq!(utility.labor_disutility(0.0), 0.0);
    }

    #[test]
    fn crra_gamma_of_one_is_rejected() {
        let params = UtilityParameters {
            consumption: ConsumptionUtility::Crra { gamma: 1.0 },
            frisch_elasticity: 0.5,
            labor_disutility: 1.0,
        };

        assert_eq!(
            UtilityFunction::new(params),
            Err(UtilityError::InvalidRiskAversion(1.0))
        );
    }

    #[test]
    fn negative_gamma_is_rejected() {
        let result = UtilityFunction::new(UtilityParameters::new(-0.5, 0.5, 1.0));

        assert_eq!(result, Err(UtilityError::InvalidRiskAversion(-0.5)));
    }

    #[test]
    fn non_positive_elasticity_is_rejected() {
        let result = UtilityFunction::new(UtilityParameters::new(2.0, 0.0, 1.0));

        assert_eq!(result, Err(UtilityError::InvalidFrischElasticity(0.0)));
    }

    #[test]
    fn non_positive_disutility_is_rejected() {
        let result = UtilityFunction::new(UtilityParameters::new(2.0, 0.5, -1.0));

        assert_eq!(result, Err(UtilityError::InvalidLaborDisutility(-1.0)));
    }

    #[test]
    fn gamma_zero_is_linear_in_consumption() {
        let utility = UtilityFunction::new(UtilityParameters::new(0.0, 0.5, 1.0)).unwrap();

        assert_close(utility.consumption_utility(42.0), 42.0);
    }
}

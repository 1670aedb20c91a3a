use serde::{Deserialize, Serialize};

/// Shape of the consumption term of the utility function.
///
/// Log utility is the γ → 1 limit of CRRA and is kept as its own variant so
/// that no evaluation ever divides by `1 − γ = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsumptionUtility {
    /// `ln(c)`
    Log,
    /// `c^(1−γ) / (1−γ)`
    Crra { gamma: f64 },
}

impl ConsumptionUtility {
    /// Selects the variant for a relative risk aversion coefficient.
    ///
    /// Exactly `1.0` selects [`ConsumptionUtility::Log`]; every other value
    /// is taken as a CRRA coefficient.
    pub fn from_gamma(gamma: f64) -> Self {
        if gamma == 1.0 {
            Self::Log
        } else {
            Self::Crra { gamma }
        }
    }

    pub fn gamma(&self) -> f64 {
        match self {
            Self::Log => 1.0,
            Self::Crra { gamma } => *gamma,
        }
    }
}

/// Structural preference parameters of the labor supply model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilityParameters {
    pub consumption: ConsumptionUtility,
    /// Frisch elasticity of labor supply (ε).
    pub frisch_elasticity: f64,
    /// Scale of the disutility of labor (φ).
    pub labor_disutility: f64,
}

impl UtilityParameters {
    pub fn new(
        gamma: f64,
        frisch_elasticity: f64,
        labor_disutility: f64,
    ) -> Self {
        Self {
            consumption: ConsumptionUtility::from_gamma(gamma),
            frisch_elasticity,
            labor_disutility,
        }
    }
}

impl Default for UtilityParameters {
    fn default() -> Self {
        Self::new(2.0, 0.5, 1.0)
    }
}

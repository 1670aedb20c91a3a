//! Static cost and income response of a proportional benefit expansion.
//!
//! Unlike [`crate::calculations::welfare`], households do not re-optimise:
//! every household is assumed to work `baseline_hours`, and its income
//! responds to the expansion through a reduced-form elasticity on the
//! benefit's share of income.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::HouseholdCharacteristics;
use crate::calculations::benefit::{BenefitError, BenefitScheduleEvaluator};

#[derive(Debug, Error, PartialEq)]
pub enum ReformError {
    #[error("no households to simulate")]
    NoHouseholds,

    #[error("expansion factor must be finite and non-negative, got {0}")]
    InvalidExpansionFactor(f64),

    #[error("baseline hours must be finite and positive, got {0}")]
    InvalidBaselineHours(f64),

    #[error("response elasticity must be finite, got {0}")]
    InvalidElasticity(f64),

    #[error("benefit share cap must be finite and non-negative, got {0}")]
    InvalidShareCap(f64),

    #[error("population weight must be finite and non-negative, got {0}")]
    InvalidPopulationWeight(f64),

    #[error("household {index} has invalid wage {wage}")]
    InvalidWage { index: usize, wage: f64 },

    #[error(transparent)]
    Benefit(#[from] BenefitError),
}

/// Behavioural and scaling assumptions of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReformConfig {
    /// Hours every household is assumed to work at baseline.
    pub baseline_hours: f64,
    /// Income response per unit of expansion and benefit share.
    pub elasticity: f64,
    /// Upper clamp on the benefit-to-income share entering the response.
    pub share_cap: f64,
    /// Households represented by each simulated household.
    pub population_weight: f64,
}

impl Default for ReformConfig {
    fn default() -> Self {
        Self {
            baseline_hours: 1800.0,
            elasticity: 0.25,
            share_cap: 0.2,
            population_weight: 125_000.0,
        }
    }
}

impl ReformConfig {
    /// # Errors
    ///
    /// Returns [`ReformError`] naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), ReformError> {
        if !self.baseline_hours.is_finite() || self.baseline_hours <= 0.0 {
            return Err(ReformError::InvalidBaselineHours(self.baseline_hours));
        }
        if !self.elasticity.is_finite() {
            return Err(ReformError::InvalidElasticity(self.elasticity));
        }
        if !self.share_cap.is_finite() || self.share_cap < 0.0 {
            return Err(ReformError::InvalidShareCap(self.share_cap));
        }
        if !self.population_weight.is_finite() || self.population_weight < 0.0 {
            return Err(ReformError::InvalidPopulationWeight(
                self.population_weight,
            ));
        }
        Ok(())
    }
}

/// Aggregate outcome of one expansion factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReformOutcome {
    pub expansion_factor: f64,
    /// Mean earned income at baseline hours.
    pub baseline_income: f64,
    /// Mean earned income after the behavioural response.
    pub reformed_income: f64,
    pub income_change: f64,
    /// Extra benefit outlay, scaled up by the population weight.
    pub total_cost: f64,
}

/// Simulates proportional expansions of a benefit schedule.
#[derive(Debug, Clone, Copy)]
pub struct ReformSimulation<'a> {
    evaluator: &'a BenefitScheduleEvaluator,
    config: ReformConfig,
}

impl<'a> ReformSimulation<'a> {
    /// # Errors
    ///
    /// Returns [`ReformError`] if `config` is invalid.
    pub fn new(
        evaluator: &'a BenefitScheduleEvaluator,
        config: ReformConfig,
    ) -> Result<Self, ReformError> {
        config.validate()?;
        Ok(Self { evaluator, config })
    }

    /// Simulates one expansion factor.
    ///
    /// # Errors
    ///
    /// - [`ReformError::NoHouseholds`] for an empty slice
    /// - [`ReformError::InvalidExpansionFactor`] for a negative or non-finite factor
    /// - [`ReformError::InvalidWage`] for a household with a non-positive wage
    pub fn simulate(
        &self,
        households: &[HouseholdCharacteristics],
        expansion_factor: f64,
    ) -> Result<ReformOutcome, ReformError> {
        if households.is_empty() {
            return Err(ReformError::NoHouseholds);
        }
        if !expansion_factor.is_finite() || expansion_factor < 0.0 {
            return Err(ReformError::InvalidExpansionFactor(expansion_factor));
        }

        let mut baseline_total = 0.0;
        let mut reformed_total = 0.0;
        let mut extra_outlay = 0.0;

        for (index, household) in households.iter().enumerate() {
            if !household.wage.is_finite() || household.wage <= 0.0 {
                return Err(ReformError::InvalidWage {
                    index,
                    wage: household.wage,
                });
            }

            let income = household.wage * self.config.baseline_hours;
            let baseline_benefit = self.evaluator.benefit(income, household.dependents)?;
            let reform_benefit = baseline_benefit * expansion_factor;
            let share = (baseline_benefit / income).clamp(0.0, self.config.share_cap);
            let reformed_income =
                income * (1.0 + self.config.elasticity * (expansion_factor - 1.0) * share);

            baseline_total += income;
            reformed_total += reformed_income;
            extra_outlay += reform_benefit - baseline_benefit;
        }

        let count = households.len() as f64;
        let outcome = ReformOutcome {
            expansion_factor,
            baseline_income: baseline_total / count,
            reformed_income: reformed_total / count,
            income_change: (reformed_total - baseline_total) / count,
            total_cost: extra_outlay * self.config.population_weight,
        };

        debug!(
            expansion_factor,
            income_change = outcome.income_change,
            total_cost = outcome.total_cost,
            "reform simulated"
        );

        Ok(outcome)
    }

    /// Simulates each factor in turn.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`ReformSimulation::simulate`].
    pub fn simulate_all(
        &self,
        households: &[HouseholdCharacteristics],
        expansion_factors: &[f64],
    ) -> Result<Vec<ReformOutcome>, ReformError> {
        expansion_factors
            .iter()
            .map(|factor| self.simulate(households, *factor))
            .collect()
    }
}

//! Welfare effects of a proportional benefit expansion.
//!
//! Each household re-optimises its labor supply under the expanded schedule;
//! its welfare gain is the utility difference between the two optima.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::HouseholdCharacteristics;
use crate::calculations::benefit::{BenefitFunction, BenefitScheduleEvaluator, ScaledBenefit};
use crate::calculations::labor_supply::{LaborSupply, LaborSupplySolver, SolverError};

#[derive(Debug, Error, PartialEq)]
pub enum WelfareError {
    #[error("no households to analyse")]
    NoHouseholds,

    #[error("expansion factor must be finite and non-negative, got {0}")]
    InvalidExpansionFactor(f64),

    #[error("household {index}: {source}")]
    Household {
        index: usize,
        #[source]
        source: SolverError,
    },
}

/// Baseline and reform optima for one household.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HouseholdWelfare {
    pub household: HouseholdCharacteristics,
    pub baseline: LaborSupply,
    pub reform: LaborSupply,
}

impl HouseholdWelfare {
    /// Reform utility minus baseline utility.
    pub fn gain(&self) -> f64 {
        self.reform.utility - self.baseline.utility
    }

    pub fn labor_response(&self) -> f64 {
        self.reform.labor - self.baseline.labor
    }
}

/// Aggregate welfare effects over a population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WelfareSummary {
    pub expansion_factor: f64,
    pub mean_gain: f64,
    pub median_gain: f64,
    /// Percentage of households with a strictly positive gain.
    pub winners_pct: f64,
    pub mean_labor_response: f64,
    pub households: Vec<HouseholdWelfare>,
}

/// Compares household optima under a schedule and a scaled copy of it.
#[derive(Debug, Clone, Copy)]
pub struct WelfareAnalysis<'a> {
    solver: &'a LaborSupplySolver,
    evaluator: &'a BenefitScheduleEvaluator,
    tax_rate: f64,
}

impl<'a> WelfareAnalysis<'a> {
    pub fn new(
        solver: &'a LaborSupplySolver,
        evaluator: &'a BenefitScheduleEvaluator,
        tax_rate: f64,
    ) -> Self {
        Self {
            solver,
            evaluator,
            tax_rate,
        }
    }

    /// Solves one household under the baseline and the expanded schedule.
    ///
    /// # Errors
    ///
    /// Returns [`WelfareError::InvalidExpansionFactor`] for a negative or
    /// non-finite factor, or the solver's error wrapped in
    /// [`WelfareError::Household`] with index 0.
    pub fn household(
        &self,
        household: &HouseholdCharacteristics,
        expansion_factor: f64,
    ) -> Result<HouseholdWelfare, WelfareError> {
        self.household_at(0, household, expansion_factor)
    }

    fn household_at(
        &self,
        index: usize,
        household: &HouseholdCharacteristics,
        expansion_factor: f64,
    ) -> Result<HouseholdWelfare, WelfareError> {
        let baseline_benefit = self.evaluator.for_household(household.dependents);
        let reform_benefit = ScaledBenefit::new(&baseline_benefit, expansion_factor)
            .map_err(|_| WelfareError::InvalidExpansionFactor(expansion_factor))?;

        let solve = |benefit: &dyn BenefitFunction| {
            self.solver
                .solve(household.wage, benefit, self.tax_rate)
                .map_err(|source| WelfareError::Household { index, source })
        };

        Ok(HouseholdWelfare {
            household: *household,
            baseline: solve(&baseline_benefit)?,
            reform: solve(&reform_benefit)?,
        })
    }

    /// Analyses every household and summarises the gains.
    ///
    /// # Errors
    ///
    /// - [`WelfareError::NoHouseholds`] for an empty slice
    /// - [`WelfareError::InvalidExpansionFactor`] for a negative or non-finite factor
    /// - [`WelfareError::Household`] for the first household the solver rejects
    pub fn analyze(
        &self,
        households: &[HouseholdCharacteristics],
        expansion_factor: f64,
    ) -> Result<WelfareSummary, WelfareError> {
        if households.is_empty() {
            return Err(WelfareError::NoHouseholds);
        }

        let results = households
            .iter()
            .enumerate()
            .map(|(index, household)| self.household_at(index, household, expansion_factor))
            .collect::<Result<Vec<_>, _>>()?;

        let mut gains: Vec<f64> = results.iter().map(HouseholdWelfare::gain).collect();
        let count = gains.len() as f64;
        let mean_gain = gains.iter().sum::<f64>() / count;
        let winners = gains.iter().filter(|gain| **gain > 0.0).count();
        let mean_labor_response =
            results.iter().map(HouseholdWelfare::labor_response).sum::<f64>() / count;
        let median_gain = median(&mut gains);

        debug!(
            households = results.len(),
            expansion_factor,
            mean_gain,
            median_gain,
            winners,
            "welfare analysis complete"
        );

        Ok(WelfareSummary {
            expansion_factor,
            mean_gain,
            median_gain,
            winners_pct: winners as f64 / count * 100.0,
            mean_labor_response,
            households: results,
        })
    }
}

/// Median of a non-empty slice; averages the middle pair for even lengths.
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        0.5 * (values[mid - 1] + values[mid])
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::labor_supply::SolverConfig;
    use crate::{BenefitSchedule, UtilityParameters};

    fn fixtures() -> (LaborSupplySolver, BenefitScheduleEvaluator) {
        (
            LaborSupplySolver::new(UtilityParameters::default(), SolverConfig::default()).unwrap(),
            BenefitScheduleEvaluator::new(BenefitSchedule::eitc_2024()).unwrap(),
        )
    }

    fn households() -> Vec<HouseholdCharacteristics> {
        vec![
            HouseholdCharacteristics::new(12.0, 0),
            HouseholdCharacteristics::new(18.5, 1),
            HouseholdCharacteristics::new(25.0, 2),
            HouseholdCharacteristics::new(40.0, 4),
        ]
    }

    #[test]
    fn unit_expansion_changes_nothing() {
        let (solver, evaluator) = fixtures();
        let analysis = WelfareAnalysis::new(&solver, &evaluator, 0.2);

        let summary = analysis.analyze(&households(), 1.0).unwrap();

        assert_eq!(summary.mean_gain, 0.0);
        assert_eq!(summary.median_gain, 0.0);
        assert_eq!(summary.winners_pct, 0.0);
        assert_eq!(summary.households.len(), 4);
    }

    #[test]
    fn expansion_never_lowers_welfare() {
        let (solver, evaluator) = fixtures();
        let analysis = WelfareAnalysis::new(&solver, &evaluator, 0.2);

        let summary = analysis.analyze(&households(), 1.5).unwrap();

        for result in &summary.households {
            assert!(result.gain() >= -1e-9, "gain {}", result.gain());
        }
        assert!(summary.mean_gain >= -1e-9);
    }

    #[test]
    fn household_result_matches_direct_solves() {
        let (solver, evaluator) = fixtures();
        let analysis = WelfareAnalysis::new(&solver, &evaluator, 0.2);
        let household = HouseholdCharacteristics::new(18.5, 1);

        let result = analysis.household(&household, 2.0).unwrap();
        let baseline = solver
            .solve(18.5, &evaluator.for_household(1), 0.2)
            .unwrap();

        assert_eq!(result.baseline, baseline);
        assert_eq!(result.household, household);
    }

    #[test]
    fn empty_population_is_rejected() {
        let (solver, evaluator) = fixtures();
        let analysis = WelfareAnalysis::new(&solver, &evaluator, 0.2);

        assert_eq!(analysis.analyze(&[], 1.5), Err(WelfareError::NoHouseholds));
    }

    #[test]
    fn negative_expansion_is_rejected() {
        let (solver, evaluator) = fixtures();
        let analysis = WelfareAnalysis::new(&solver, &evaluator, 0.2);

        assert_eq!(
            analysis.analyze(&households(), -1.0),
            Err(WelfareError::InvalidExpansionFactor(-1.0))
        );
    }

    #[test]
    fn solver_errors_carry_household_index() {
        let (solver, evaluator) = fixtures();
        let analysis = WelfareAnalysis::new(&solver, &evaluator, 0.2);
        let mut population = households();
        population[2].wage = 0.0;

        assert_eq!(
            analysis.analyze(&population, 1.5),
            Err(WelfareError::Household {
                index: 2,
                source: SolverError::InvalidWage(0.0)
            })
        );
    }

    #[test]
    fn median_of_even_and_odd_lengths() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
    }
}

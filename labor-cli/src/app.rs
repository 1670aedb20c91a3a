use std::path::Path;

use anyhow::{Context, Result, bail};
use labor_core::{
    BenefitFunction, BenefitSchedule, BenefitScheduleEvaluator, HouseholdCharacteristics,
    LaborSupply, LaborSupplySolver, NoBenefit, ReformOutcome, ReformSimulation, SolverError,
    WelfareAnalysis, WelfareSummary,
};
use labor_data::{BenefitScheduleLoader, HouseholdLoader};
use tracing::{debug, info, warn};

use crate::config::AppConfig;

/// Tax year of the schedule compiled into the binary.
pub const BUILTIN_SCHEDULE_YEAR: i32 = 2024;

/// Loads the schedule for `year` from a CSV file, or the built-in table when
/// no file is given.
pub fn load_schedule(
    path: Option<&Path>,
    year: i32,
) -> Result<BenefitSchedule> {
    match path {
        Some(path) => {
            let schedule = BenefitScheduleLoader::load_file(path, year).with_context(|| {
                format!("Failed to load {year} schedule from {}", path.display())
            })?;
            info!(year, path = %path.display(), "loaded benefit schedule");
            Ok(schedule)
        }
        None if year == BUILTIN_SCHEDULE_YEAR => Ok(BenefitSchedule::eitc_2024()),
        None => bail!(
            "no built-in schedule for tax year {year}; pass --schedule with a CSV file"
        ),
    }
}

pub fn load_households(path: &Path) -> Result<Vec<HouseholdCharacteristics>> {
    let households = HouseholdLoader::load_from_file(path)
        .with_context(|| format!("Failed to load households from {}", path.display()))?;
    info!(count = households.len(), path = %path.display(), "loaded households");
    Ok(households)
}

/// A configured schedule, solver and policy, ready to answer queries.
#[derive(Debug, Clone)]
pub struct Model {
    evaluator: BenefitScheduleEvaluator,
    solver: LaborSupplySolver,
    config: AppConfig,
}

impl Model {
    pub fn new(
        config: AppConfig,
        schedule: BenefitSchedule,
    ) -> Result<Self> {
        let evaluator =
            BenefitScheduleEvaluator::new(schedule).context("Invalid benefit schedule")?;
        let solver = LaborSupplySolver::new(config.utility.params(), config.solver)
            .context("Invalid utility or solver configuration")?;

        debug!(
            year = evaluator.schedule().tax_year,
            tax_rate = config.policy.tax_rate,
            strategy = ?config.solver.strategy,
            "model ready"
        );

        Ok(Self {
            evaluator,
            solver,
            config,
        })
    }

    pub fn evaluator(&self) -> &BenefitScheduleEvaluator {
        &self.evaluator
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// `(income, benefit)` for each income, in input order.
    pub fn benefits(
        &self,
        dependents: u32,
        incomes: &[f64],
    ) -> Result<Vec<(f64, f64)>> {
        incomes
            .iter()
            .map(|&income| {
                let benefit = self
                    .evaluator
                    .benefit(income, dependents)
                    .with_context(|| format!("Cannot evaluate benefit at income {income}"))?;
                Ok((income, benefit))
            })
            .collect()
    }

    /// Optimal labor supply of one household.
    ///
    /// With `grid_fallback`, a search that exhausts its evaluation budget is
    /// retried as a grid search over that many points.
    pub fn solve(
        &self,
        household: &HouseholdCharacteristics,
        with_benefit: bool,
        grid_fallback: Option<usize>,
    ) -> Result<LaborSupply> {
        let tax_rate = self.config.policy.tax_rate;
        let schedule_benefit = self.evaluator.for_household(household.dependents);
        let benefit: &dyn BenefitFunction = if with_benefit {
            &schedule_benefit
        } else {
            &NoBenefit
        };

        match (
            self.solver.solve(household.wage, benefit, tax_rate),
            grid_fallback,
        ) {
            (
                Err(SolverError::NotConverged {
                    evaluations,
                    best_labor,
                }),
                Some(points),
            ) => {
                warn!(
                    evaluations,
                    best_labor, points, "bounded search did not converge, falling back to grid"
                );
                self.solver
                    .grid_search(household.wage, benefit, tax_rate, points)
                    .context("Grid search fallback failed")
            }
            (result, _) => result.context("Failed to solve for optimal labor"),
        }
    }

    pub fn welfare(
        &self,
        households: &[HouseholdCharacteristics],
        expansion_factor: f64,
    ) -> Result<WelfareSummary> {
        WelfareAnalysis::new(&self.solver, &self.evaluator, self.config.policy.tax_rate)
            .analyze(households, expansion_factor)
            .context("Welfare analysis failed")
    }

    /// Simulates `factors`, or the configured factors when `factors` is empty.
    pub fn reform(
        &self,
        households: &[HouseholdCharacteristics],
        factors: &[f64],
    ) -> Result<Vec<ReformOutcome>> {
        let factors = if factors.is_empty() {
            self.config.reform.factors.as_slice()
        } else {
            factors
        };

        ReformSimulation::new(&self.evaluator, self.config.reform.simulation)
            .context("Invalid reform configuration")?
            .simulate_all(households, factors)
            .context("Reform simulation failed")
    }
}

//! Structural labor supply: the utility-maximising hours of work.
//!
//! For a wage `w`, tax rate `t` and benefit function `B`, a household that
//! works `l` units earns `y = w·l` and consumes
//!
//! ```text
//! c(l) = y·(1 − t) + B(y)
//! ```
//!
//! The solver maximises `U(c(l), l)` over `l ∈ [0, L_max]` by minimising
//! `−U` with a bounded Brent search. Consumption is floored at a small
//! positive amount so that `c^(1−γ)` and `ln c` stay defined at `l = 0`.
//!
//! Benefit schedules make `c(l)` piecewise linear, and the kinks can leave
//! `U` with several local maxima. [`SearchStrategy::Segmented`] therefore
//! searches each piece between kinks separately, also scores the piece
//! endpoints, and keeps the best candidate.
//!
//! # Example
//!
//! ```
//! use labor_core::{LaborSupplySolver, NoBenefit, SolverConfig, UtilityParameters};
//!
//! let solver = LaborSupplySolver::new(
//!     UtilityParameters::new(2.0, 0.5, 1.0),
//!     SolverConfig::default(),
//! )
//! .unwrap();
//!
//! // With γ=2, ε=0.5, φ=1 the first-order condition gives l⁴ = 1 / (w·(1−t)).
//! let labor = solver.optimal_labor(20.0, &NoBenefit, 0.2).unwrap();
//! assert!((labor - 0.5).abs() < 1e-4);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{trace, warn};

use crate::UtilityParameters;
use crate::calculations::benefit::BenefitFunction;
use crate::calculations::optimize::{BoundedSearch, Minimum, grid_minimum, minimize_bounded};
use crate::calculations::utility::{UtilityError, UtilityFunction};

/// Errors that can occur while solving for optimal labor supply.
#[derive(Debug, Error, PartialEq)]
pub enum SolverError {
    #[error("wage must be finite and positive, got {0}")]
    InvalidWage(f64),

    #[error("tax rate must be in [0, 1), got {0}")]
    InvalidTaxRate(f64),

    #[error("maximum labor must be finite and positive, got {0}")]
    InvalidMaxLabor(f64),

    #[error("search tolerance must be finite and positive, got {0}")]
    InvalidTolerance(f64),

    #[error("evaluation budget must be at least 1")]
    InvalidEvaluationBudget,

    #[error("consumption floor must be finite and positive, got {0}")]
    InvalidConsumptionFloor(f64),

    #[error("grid search needs at least 2 points, got {0}")]
    InvalidGridSize(usize),

    /// The search used its whole evaluation budget before meeting the tolerance.
    #[error("labor search did not converge after {evaluations} evaluations (best labor {best_labor})")]
    NotConverged { evaluations: usize, best_labor: f64 },

    #[error(transparent)]
    Utility(#[from] UtilityError),
}

/// How the search interval is explored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// One bounded search over `[0, L_max]`; may stop at a local optimum.
    Single,
    /// One bounded search per piece between benefit kinks.
    #[default]
    Segmented,
}

/// Numerical settings of the solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Upper bound of the feasible labor range.
    pub max_labor: f64,
    /// Absolute tolerance on the optimal labor quantity.
    pub tolerance: f64,
    /// Objective evaluations allowed per bounded search.
    pub max_evaluations: usize,
    /// Smallest consumption fed to the utility function.
    pub consumption_floor: f64,
    pub strategy: SearchStrategy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let search = BoundedSearch::default();
        Self {
            max_labor: 2000.0,
            tolerance: search.tolerance,
            max_evaluations: search.max_evaluations,
            consumption_floor: 1e-10,
            strategy: SearchStrategy::default(),
        }
    }
}

impl SolverConfig {
    /// # Errors
    ///
    /// Returns [`SolverError`] if a bound, tolerance, budget or floor is not
    /// finite and positive.
    pub fn validate(&self) -> Result<(), SolverError> {
        if !self.max_labor.is_finite() || self.max_labor <= 0.0 {
            return Err(SolverError::InvalidMaxLabor(self.max_labor));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(SolverError::InvalidTolerance(self.tolerance));
        }
        if self.max_evaluations == 0 {
            return Err(SolverError::InvalidEvaluationBudget);
        }
        if !self.consumption_floor.is_finite() || self.consumption_floor <= 0.0 {
            return Err(SolverError::InvalidConsumptionFloor(
                self.consumption_floor,
            ));
        }
        Ok(())
    }

    fn search(&self) -> BoundedSearch {
        BoundedSearch {
            tolerance: self.tolerance,
            max_evaluations: self.max_evaluations,
        }
    }
}

/// A household's position at a given labor supply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaborSupply {
    pub labor: f64,
    /// Earned income, `wage × labor`.
    pub income: f64,
    pub benefit: f64,
    /// Consumption after tax and benefit, before flooring.
    pub consumption: f64,
    pub utility: f64,
    /// Objective evaluations spent finding this point.
    pub evaluations: usize,
}

/// Solver for the utility-maximising labor supply.
///
/// Holds no per-call state; one instance can serve many threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaborSupplySolver {
    utility: UtilityFunction,
    config: SolverConfig,
}

impl LaborSupplySolver {
    /// # Errors
    ///
    /// Returns [`SolverError`] if the utility parameters or the numerical
    /// configuration are invalid.
    pub fn new(
        params: UtilityParameters,
        config: SolverConfig,
    ) -> Result<Self, SolverError> {
        let utility = UtilityFunction::new(params)?;
        config.validate()?;
        Ok(Self { utility, config })
    }

    pub fn utility(&self) -> &UtilityFunction {
        &self.utility
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The utility-maximising labor quantity, in `[0, max_labor]`.
    ///
    /// # Errors
    ///
    /// See [`LaborSupplySolver::solve`].
    pub fn optimal_labor<B>(
        &self,
        wage: f64,
        benefit: &B,
        tax_rate: f64,
    ) -> Result<f64, SolverError>
    where
        B: BenefitFunction + ?Sized,
    {
        self.solve(wage, benefit, tax_rate).map(|supply| supply.labor)
    }

    /// Solves for the optimum and reports the household's position there.
    ///
    /// # Errors
    ///
    /// - [`SolverError::InvalidWage`] if `wage` is not finite and positive
    /// - [`SolverError::InvalidTaxRate`] if `tax_rate` is outside `[0, 1)`
    /// - [`SolverError::NotConverged`] if a bounded search exhausts its budget
    pub fn solve<B>(
        &self,
        wage: f64,
        benefit: &B,
        tax_rate: f64,
    ) -> Result<LaborSupply, SolverError>
    where
        B: BenefitFunction + ?Sized,
    {
        validate_inputs(wage, tax_rate)?;

        let objective = |labor: f64| -self.evaluate(wage, benefit, tax_rate, labor).utility;
        let search = self.config.search();
        let mut evaluations = 0;
        let mut best: Option<Minimum> = None;
        let mut failed: Option<Minimum> = None;

        for (lower, upper) in self.search_intervals(wage, benefit) {
            let mut candidates = vec![minimize_bounded(&objective, lower, upper, &search)];
            if self.config.strategy == SearchStrategy::Segmented {
                for endpoint in [lower, upper] {
                    candidates.push(Minimum {
                        x: endpoint,
                        value: objective(endpoint),
                        evaluations: 1,
                        converged: true,
                    });
                }
            }

            for candidate in candidates {
                evaluations += candidate.evaluations;
                if !candidate.converged && failed.is_none() {
                    failed = Some(candidate);
                }
                if is_better(&candidate, best.as_ref()) {
                    best = Some(candidate);
                }
            }
        }

        if let Some(failed) = failed {
            let best_labor = best.map_or(failed.x, |m| m.x);
            warn!(
                wage,
                tax_rate,
                evaluations,
                best_labor,
                "Labor search exhausted its evaluation budget"
            );
            return Err(SolverError::NotConverged {
                evaluations,
                best_labor,
            });
        }

        let labor = best
            .map_or(0.0, |m| m.x)
            .clamp(0.0, self.config.max_labor);
        let supply = LaborSupply {
            evaluations,
            ..self.evaluate(wage, benefit, tax_rate, labor)
        };

        trace!(
            wage,
            tax_rate,
            labor = supply.labor,
            utility = supply.utility,
            evaluations,
            "solved labor supply"
        );

        Ok(supply)
    }

    /// Brute-force optimum over `points` evenly spaced labor quantities.
    ///
    /// Slower than [`LaborSupplySolver::solve`] but immune to local optima at
    /// the grid's resolution; useful as a fallback after
    /// [`SolverError::NotConverged`].
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] for invalid inputs or fewer than 2 points.
    pub fn grid_search<B>(
        &self,
        wage: f64,
        benefit: &B,
        tax_rate: f64,
        points: usize,
    ) -> Result<LaborSupply, SolverError>
    where
        B: BenefitFunction + ?Sized,
    {
        validate_inputs(wage, tax_rate)?;
        if points < 2 {
            return Err(SolverError::InvalidGridSize(points));
        }

        let min = grid_minimum(
            |labor| -self.evaluate(wage, benefit, tax_rate, labor).utility,
            0.0,
            self.config.max_labor,
            points,
        );

        Ok(LaborSupply {
            evaluations: min.evaluations,
            ..self.evaluate(wage, benefit, tax_rate, min.x)
        })
    }

    /// The household's position when working exactly `labor`.
    pub fn evaluate<B>(
        &self,
        wage: f64,
        benefit: &B,
        tax_rate: f64,
        labor: f64,
    ) -> LaborSupply
    where
        B: BenefitFunction + ?Sized,
    {
        let income = wage * labor;
        let paid = benefit.benefit(income);
        let consumption = income * (1.0 - tax_rate) + paid;
        let utility = self
            .utility
            .utility(consumption.max(self.config.consumption_floor), labor);

        LaborSupply {
            labor,
            income,
            benefit: paid,
            consumption,
            utility,
            evaluations: 1,
        }
    }

    /// Sub-intervals of `[0, max_labor]` to search.
    fn search_intervals<B>(
        &self,
        wage: f64,
        benefit: &B,
    ) -> Vec<(f64, f64)>
    where
        B: BenefitFunction + ?Sized,
    {
        let max_labor = self.config.max_labor;
        let mut bounds = vec![0.0];

        if self.config.strategy == SearchStrategy::Segmented {
            bounds.extend(
                benefit
                    .kinks()
                    .into_iter()
                    .map(|income| income / wage)
                    .filter(|labor| labor.is_finite() && *labor > 0.0 && *labor < max_labor),
            );
            bounds.sort_by(f64::total_cmp);
            bounds.dedup();
        }
        bounds.push(max_labor);

        bounds.windows(2).map(|w| (w[0], w[1])).collect()
    }
}

fn validate_inputs(
    wage: f64,
    tax_rate: f64,
) -> Result<(), SolverError> {
    if !wage.is_finite() || wage <= 0.0 {
        return Err(SolverError::InvalidWage(wage));
    }
    if !(0.0..1.0).contains(&tax_rate) {
        return Err(SolverError::InvalidTaxRate(tax_rate));
    }
    Ok(())
}

/// Lower objective wins; ties go to the smaller labor quantity.
fn is_better(
    candidate: &Minimum,
    best: Option<&Minimum>,
) -> bool {
    match best {
        None => true,
        Some(best) => {
            candidate.value < best.value || (candidate.value == best.value && candidate.x < best.x)
        }
    }
}

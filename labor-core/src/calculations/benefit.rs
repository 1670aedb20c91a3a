//! Piecewise-linear benefit schedule evaluation.
//!
//! A schedule bracket has three income regions:
//!
//! | Region    | Income range                              | Benefit                                          |
//! |-----------|-------------------------------------------|--------------------------------------------------|
//! | Phase-in  | `0 ..= max_credit / phase_in_rate`        | `income × phase_in_rate`                         |
//! | Plateau   | `.. ..= phase_out_start`                  | `max_credit`                                     |
//! | Phase-out | `> phase_out_start`                       | `max(0, max_credit − (income − start) × rate)`   |
//!
//! Regions are tested in that order, so a bracket whose phase-in end lies
//! past its phase-out start has no plateau.
//!
//! # Example
//!
//! ```
//! use labor_core::{BenefitSchedule, BenefitScheduleEvaluator};
//!
//! let evaluator = BenefitScheduleEvaluator::new(BenefitSchedule::eitc_2024()).unwrap();
//!
//! // Childless filer past the phase-out start: 600 − (15000 − 9000) × 0.0765
//! let credit = evaluator.benefit(15000.0, 0).unwrap();
//! assert!((credit - 141.0).abs() < 1e-6);
//!
//! // Households above three dependents share the top bracket.
//! assert_eq!(
//!     evaluator.benefit(15000.0, 5).unwrap(),
//!     evaluator.benefit(15000.0, 3).unwrap(),
//! );
//! ```

use thiserror::Error;
use tracing::warn;

use crate::{BenefitBracket, BenefitSchedule};

/// Errors raised by schedule validation and evaluation.
#[derive(Debug, Error, PartialEq)]
pub enum BenefitError {
    /// Income must be a finite, non-negative amount.
    #[error("income must be finite and non-negative, got {0}")]
    InvalidIncome(f64),

    #[error("maximum credit for bracket {bracket} must be finite and non-negative, got {value}")]
    InvalidMaxCredit { bracket: u32, value: f64 },

    #[error("phase-in rate for bracket {bracket} must be in (0, 1], got {value}")]
    InvalidPhaseInRate { bracket: u32, value: f64 },

    #[error("phase-out start for bracket {bracket} must be finite and non-negative, got {value}")]
    InvalidPhaseOutStart { bracket: u32, value: f64 },

    #[error("phase-out rate for bracket {bracket} must be in (0, 1], got {value}")]
    InvalidPhaseOutRate { bracket: u32, value: f64 },

    /// A scaling factor applied to a benefit must be finite and non-negative.
    #[error("benefit scale factor must be finite and non-negative, got {0}")]
    InvalidScaleFactor(f64),
}

/// A benefit as a function of earned income.
///
/// Implemented for any `Fn(f64) -> f64`, so closures can stand in for a
/// schedule. Implementations that know where their slope changes report
/// those incomes through [`BenefitFunction::kinks`] so a solver can split
/// its search there.
pub trait BenefitFunction {
    /// Benefit paid at `income`. Callers pass non-negative income.
    fn benefit(
        &self,
        income: f64,
    ) -> f64;

    /// Incomes at which the benefit is not differentiable, ascending.
    fn kinks(&self) -> Vec<f64> {
        Vec::new()
    }
}

impl<F> BenefitFunction for F
where
    F: Fn(f64) -> f64,
{
    fn benefit(
        &self,
        income: f64,
    ) -> f64 {
        self(income)
    }
}

/// The benefit function that pays nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoBenefit;

impl BenefitFunction for NoBenefit {
    fn benefit(
        &self,
        _income: f64,
    ) -> f64 {
        0.0
    }
}

fn rate_in_unit_interval(rate: f64) -> bool {
    rate > 0.0 && rate <= 1.0
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Checks every bracket of `schedule`.
///
/// Brackets without a plateau are accepted but logged, since the regions
/// then meet with a small discontinuity at the phase-in end.
///
/// # Errors
///
/// Returns the first [`BenefitError`] found, scanning brackets in order.
pub fn validate_schedule(schedule: &BenefitSchedule) -> Result<(), BenefitError> {
    for (bracket, params) in (0u32..).zip(schedule.brackets.iter()) {
        validate_bracket(bracket, params)?;

        if !params.has_plateau() {
            warn!(
                tax_year = schedule.tax_year,
                bracket,
                phase_in_end = params.phase_in_end(),
                phase_out_start = params.phase_out_start,
                "Phase-in ends after phase-out starts; bracket has no plateau"
            );
        }
    }
    Ok(())
}

fn validate_bracket(
    bracket: u32,
    params: &BenefitBracket,
) -> Result<(), BenefitError> {
    if !non_negative(params.max_credit) {
        return Err(BenefitError::InvalidMaxCredit {
            bracket,
            value: params.max_credit,
        });
    }
    if !rate_in_unit_interval(params.phase_in_rate) {
        return Err(BenefitError::InvalidPhaseInRate {
            bracket,
            value: params.phase_in_rate,
        });
    }
    if !non_negative(params.phase_out_start) {
        return Err(BenefitError::InvalidPhaseOutStart {
            bracket,
            value: params.phase_out_start,
        });
    }
    if !rate_in_unit_interval(params.phase_out_rate) {
        return Err(BenefitError::InvalidPhaseOutRate {
            bracket,
            value: params.phase_out_rate,
        });
    }
    Ok(())
}

/// Benefit paid by one bracket at a non-negative income.
fn bracket_benefit(
    params: &BenefitBracket,
    income: f64,
) -> f64 {
    if income <= params.phase_in_end() {
        income * params.phase_in_rate
    } else if income <= params.phase_out_start {
        params.max_credit
    } else {
        let credit = params.max_credit - (income - params.phase_out_start) * params.phase_out_rate;
        credit.max(0.0)
    }
}

fn bracket_kinks(params: &BenefitBracket) -> Vec<f64> {
    let mut kinks = vec![
        params.phase_in_end(),
        params.phase_out_start,
        params.phase_out_end(),
    ];
    kinks.sort_by(f64::total_cmp);
    kinks.dedup();
    kinks
}

/// Evaluates a validated [`BenefitSchedule`].
#[derive(Debug, Clone, PartialEq)]
pub struct BenefitScheduleEvaluator {
    schedule: BenefitSchedule,
}

impl BenefitScheduleEvaluator {
    /// Creates an evaluator for `schedule`.
    ///
    /// # Errors
    ///
    /// Returns [`BenefitError`] if any bracket has a negative or non-finite
    /// amount, or a rate outside `(0, 1]`.
    pub fn new(schedule: BenefitSchedule) -> Result<Self, BenefitError> {
        validate_schedule(&schedule)?;
        Ok(Self { schedule })
    }

    pub fn schedule(&self) -> &BenefitSchedule {
        &self.schedule
    }

    /// Benefit for a household with `dependents` earning `income`.
    ///
    /// Dependents above the top bracket are clamped to it.
    ///
    /// # Errors
    ///
    /// Returns [`BenefitError::InvalidIncome`] for negative, NaN or infinite income.
    pub fn benefit(
        &self,
        income: f64,
        dependents: u32,
    ) -> Result<f64, BenefitError> {
        if !non_negative(income) {
            return Err(BenefitError::InvalidIncome(income));
        }
        Ok(bracket_benefit(self.schedule.bracket(dependents), income))
    }

    /// Income breakpoints of the bracket for `dependents`, ascending.
    pub fn kinks(
        &self,
        dependents: u32,
    ) -> Vec<f64> {
        bracket_kinks(self.schedule.bracket(dependents))
    }

    /// Binds the schedule to a household's dependent count.
    pub fn for_household(
        &self,
        dependents: u32,
    ) -> HouseholdBenefit<'_> {
        HouseholdBenefit {
            schedule: &self.schedule,
            dependents,
        }
    }
}

/// A schedule bound to one household's dependent count.
#[derive(Debug, Clone, Copy)]
pub struct HouseholdBenefit<'a> {
    schedule: &'a BenefitSchedule,
    dependents: u32,
}

impl HouseholdBenefit<'_> {
    pub fn dependents(&self) -> u32 {
        self.dependents
    }
}

impl BenefitFunction for HouseholdBenefit<'_> {
    fn benefit(
        &self,
        income: f64,
    ) -> f64 {
        bracket_benefit(self.schedule.bracket(self.dependents), income.max(0.0))
    }

    fn kinks(&self) -> Vec<f64> {
        bracket_kinks(self.schedule.bracket(self.dependents))
    }
}

/// Another benefit function multiplied by a constant factor.
///
/// Used to express proportional expansions (or cuts) of an existing schedule.
#[derive(Debug, Clone, Copy)]
pub struct ScaledBenefit<'a, B: ?Sized> {
    inner: &'a B,
    factor: f64,
}

impl<'a, B: BenefitFunction + ?Sized> ScaledBenefit<'a, B> {
    /// # Errors
    ///
    /// Returns [`BenefitError::InvalidScaleFactor`] for a negative or
    /// non-finite factor.
    pub fn new(
        inner: &'a B,
        factor: f64,
    ) -> Result<Self, BenefitError> {
        if !non_negative(factor) {
            return Err(BenefitError::InvalidScaleFactor(factor));
        }
        Ok(Self { inner, factor })
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl<B: BenefitFunction + ?Sized> BenefitFunction for ScaledBenefit<'_, B> {
    fn benefit(
        &self,
        income: f64,
    ) -> f64 {
        self.inner.benefit(income) * self.factor
    }

    fn kinks(&self) -> Vec<f64> {
        self.inner.kinks()
    }
}

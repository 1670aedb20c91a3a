//! Benefit schedule evaluation and the structural labor supply model.
//!
//! The evaluator and the solver are independent: the solver sees a benefit
//! schedule only through the [`BenefitFunction`] trait, so any function of
//! earned income (including plain closures) can be substituted.

pub mod benefit;
pub mod common;
pub mod labor_supply;
pub mod optimize;
pub mod reform;
pub mod utility;
pub mod welfare;

pub use benefit::{
    BenefitError, BenefitFunction, BenefitScheduleEvaluator, HouseholdBenefit, NoBenefit,
    ScaledBenefit,
};
pub use labor_supply::{LaborSupply, LaborSupplySolver, SearchStrategy, SolverConfig, SolverError};
pub use optimize::{BoundedSearch, Minimum};
pub use reform::{ReformConfig, ReformError, ReformOutcome, ReformSimulation};
pub use utility::{UtilityError, UtilityFunction};
pub use welfare::{HouseholdWelfare, WelfareAnalysis, WelfareError, WelfareSummary};

pub mod calculations;
pub mod models;

pub use calculations::{
    BenefitError, BenefitFunction, BenefitScheduleEvaluator, HouseholdBenefit, HouseholdWelfare,
    LaborSupply, LaborSupplySolver, NoBenefit, ReformConfig, ReformError, ReformOutcome,
    ReformSimulation, ScaledBenefit, SearchStrategy, SolverConfig, SolverError, UtilityError,
    UtilityFunction, WelfareAnalysis, WelfareError, WelfareSummary,
};
pub use models::*;

mod benefit_schedule;
mod filing_status;
mod household;
mod utility_params;

pub use benefit_schedule::{BenefitBracket, BenefitSchedule, TOP_DEPENDENT_BRACKET};
pub use filing_status::FilingStatusCode;
pub use household::HouseholdCharacteristics;
pub use utility_params::{ConsumptionUtility, UtilityParameters};

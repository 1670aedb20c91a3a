//! CSV loaders for benefit schedules and household microdata.

mod household_loader;
mod schedule_loader;

pub use household_loader::{HouseholdLoader, HouseholdLoaderError};
pub use schedule_loader::{BenefitScheduleLoader, BenefitScheduleRecord, ScheduleLoaderError};

use serde::{Deserialize, Serialize};

use crate::FilingStatusCode;

/// Observable characteristics of one household unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HouseholdCharacteristics {
    /// Hourly wage rate.
    pub wage: f64,
    /// Number of qualifying dependents. Schedules clamp this to their top bracket.
    pub dependents: u32,
    pub filing_status: Option<FilingStatusCode>,
}

impl HouseholdCharacteristics {
    pub fn new(
        wage: f64,
        dependents: u32,
    ) -> Self {
        Self {
            wage,
            dependents,
            filing_status: None,
        }
    }

    pub fn with_filing_status(
        self,
        filing_status: FilingStatusCode,
    ) -> Self {
        Self {
            filing_status: Some(filing_status),
            ..self
        }
    }
}

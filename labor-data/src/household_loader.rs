//! CSV loader for household microdata.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter.
//!
//! | Column          | Required | Type    | Notes                                   |
//! |-----------------|----------|---------|-----------------------------------------|
//! | `wage`          | yes      | decimal | Hourly wage, must be positive           |
//! | `dependents`    | yes      | integer | Counts above 3 use the top bracket      |
//! | `filing_status` | no       | string  | `S`, `MFJ`, `MFS`, `HOH`, `QSS` or empty |
//!
//! ```csv
//! wage,dependents,filing_status
//! 18.75,1,HOH
//! 9.80,3,
//! ```
use std::path::Path;

use labor_core::{FilingStatusCode, HouseholdCharacteristics};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CsvRow {
    wage: Decimal,
    dependents: u32,
    #[serde(default)]
    filing_status: Option<String>,
}

/// Errors that can occur while loading household data.
#[derive(Debug, thiserror::Error)]
pub enum HouseholdLoaderError {
    /// Bad structure, missing required column or type mismatch.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `row` is 1-based (header = row 0).
    #[error("unrecognised filing status '{status}' on row {row}")]
    InvalidFilingStatus { status: String, row: usize },

    #[error("wage {wage} on row {row} must be positive")]
    InvalidWage { wage: Decimal, row: usize },
}

/// Loader for household microdata files.
pub struct HouseholdLoader;

impl HouseholdLoader {
    fn convert_row(
        row: CsvRow,
        row_number: usize,
    ) -> Result<HouseholdCharacteristics, HouseholdLoaderError> {
        let wage = row
            .wage
            .to_f64()
            .filter(|w| *w > 0.0)
            .ok_or(HouseholdLoaderError::InvalidWage {
                wage: row.wage,
                row: row_number,
            })?;

        let filing_status = match row.filing_status.filter(|s| !s.is_empty()) {
            Some(status) => Some(FilingStatusCode::parse(&status).ok_or_else(|| {
                HouseholdLoaderError::InvalidFilingStatus {
                    status,
                    row: row_number,
                }
            })?),
            None => None,
        };

        Ok(HouseholdCharacteristics {
            wage,
            dependents: row.dependents,
            filing_status,
        })
    }

    /// Parse CSV text and return the households in file order.
    ///
    /// # Errors
    ///
    /// * [`HouseholdLoaderError::Parse`] if the CSV is structurally invalid.
    /// * [`HouseholdLoaderError::InvalidWage`] for a zero or negative wage.
    /// * [`HouseholdLoaderError::InvalidFilingStatus`] for an unknown code.
    pub fn load_from_str(input: &str) -> Result<Vec<HouseholdCharacteristics>, HouseholdLoaderError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(false)
            .from_reader(input.as_bytes());

        let households = reader
            .deserialize::<CsvRow>()
            .enumerate()
            .map(|(idx, result)| Self::convert_row(result?, idx + 1))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(households = households.len(), "loaded household data");
        Ok(households)
    }

    /// Read a file from disk and delegate to [`HouseholdLoader::load_from_str`].
    pub fn load_from_file(path: &Path) -> Result<Vec<HouseholdCharacteristics>, HouseholdLoaderError> {
        let contents = std::fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }
}

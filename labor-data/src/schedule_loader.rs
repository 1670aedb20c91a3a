use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use labor_core::calculations::benefit::{BenefitError, validate_schedule};
use labor_core::{BenefitBracket, BenefitSchedule, TOP_DEPENDENT_BRACKET};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const BRACKETS_PER_YEAR: usize = TOP_DEPENDENT_BRACKET as usize + 1;

/// Errors that can occur when loading benefit schedule data.
#[derive(Debug, Error)]
pub enum ScheduleLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bracket {dependents} for tax year {tax_year} is out of range (0-{TOP_DEPENDENT_BRACKET})")]
    BracketOutOfRange { tax_year: i32, dependents: u32 },

    #[error("bracket {dependents} for tax year {tax_year} appears more than once")]
    DuplicateBracket { tax_year: i32, dependents: u32 },

    #[error("tax year {tax_year} is missing bracket {dependents}")]
    MissingBracket { tax_year: i32, dependents: u32 },

    #[error("{field} {value} for tax year {tax_year} bracket {dependents} is not representable")]
    UnrepresentableAmount {
        tax_year: i32,
        dependents: u32,
        field: &'static str,
        value: Decimal,
    },

    #[error("tax year {0} not found in schedule data")]
    TaxYearNotFound(i32),

    #[error("invalid schedule for tax year {tax_year}: {source}")]
    InvalidSchedule {
        tax_year: i32,
        #[source]
        source: BenefitError,
    },
}

impl From<csv::Error> for ScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        ScheduleLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from a benefit schedule CSV file.
///
/// - `tax_year`: The tax year (e.g., 2024)
/// - `dependents`: The dependent-count bracket, 0 to 3 (3 covers 3 or more)
/// - `max_credit`: The maximum credit in the bracket
/// - `phase_in_rate`: The phase-in rate as a decimal (e.g., 0.34)
/// - `phase_out_start`: The income at which the phase-out begins
/// - `phase_out_rate`: The phase-out rate as a decimal (e.g., 0.1598)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenefitScheduleRecord {
    pub tax_year: i32,
    pub dependents: u32,
    pub max_credit: Decimal,
    pub phase_in_rate: Decimal,
    pub phase_out_start: Decimal,
    pub phase_out_rate: Decimal,
}

impl BenefitScheduleRecord {
    fn amount(
        &self,
        field: &'static str,
        value: Decimal,
    ) -> Result<f64, ScheduleLoaderError> {
        value
            .to_f64()
            .ok_or(ScheduleLoaderError::UnrepresentableAmount {
                tax_year: self.tax_year,
                dependents: self.dependents,
                field,
                value,
            })
    }

    fn to_bracket(&self) -> Result<BenefitBracket, ScheduleLoaderError> {
        Ok(BenefitBracket {
            max_credit: self.amount("max_credit", self.max_credit)?,
            phase_in_rate: self.amount("phase_in_rate", self.phase_in_rate)?,
            phase_out_start: self.amount("phase_out_start", self.phase_out_start)?,
            phase_out_rate: self.amount("phase_out_rate", self.phase_out_rate)?,
        })
    }
}

/// Loader for benefit schedules from CSV files.
///
/// Each tax year in the file must list brackets 0, 1, 2 and 3 exactly once;
/// row order does not matter.
pub struct BenefitScheduleLoader;

impl BenefitScheduleLoader {
    /// Parse schedule records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a byte slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BenefitScheduleRecord>, ScheduleLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BenefitScheduleRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Assemble one validated schedule per tax year, in ascending year order.
    pub fn build(
        records: &[BenefitScheduleRecord]
    ) -> Result<Vec<BenefitSchedule>, ScheduleLoaderError> {
        let mut years: BTreeMap<i32, [Option<BenefitBracket>; BRACKETS_PER_YEAR]> =
            BTreeMap::new();

        for record in records {
            if record.dependents > TOP_DEPENDENT_BRACKET {
                return Err(ScheduleLoaderError::BracketOutOfRange {
                    tax_year: record.tax_year,
                    dependents: record.dependents,
                });
            }

            let slot = &mut years.entry(record.tax_year).or_default()[record.dependents as usize];
            if slot.is_some() {
                return Err(ScheduleLoaderError::DuplicateBracket {
                    tax_year: record.tax_year,
                    dependents: record.dependents,
                });
            }
            *slot = Some(record.to_bracket()?);
        }

        let mut schedules = Vec::with_capacity(years.len());
        for (tax_year, slots) in years {
            let mut brackets = Vec::with_capacity(BRACKETS_PER_YEAR);
            for (dependents, slot) in (0u32..).zip(slots) {
                brackets.push(slot.ok_or(ScheduleLoaderError::MissingBracket {
                    tax_year,
                    dependents,
                })?);
            }

            let schedule = BenefitSchedule {
                tax_year,
                brackets: [brackets[0], brackets[1], brackets[2], brackets[3]],
            };
            validate_schedule(&schedule)
                .map_err(|source| ScheduleLoaderError::InvalidSchedule { tax_year, source })?;

            debug!(tax_year, "assembled benefit schedule");
            schedules.push(schedule);
        }

        Ok(schedules)
    }

    /// Assemble the schedule for a single tax year.
    ///
    /// Only the requested year's rows need to be complete.
    pub fn schedule_for_year(
        records: &[BenefitScheduleRecord],
        tax_year: i32,
    ) -> Result<BenefitSchedule, ScheduleLoaderError> {
        let year_records: Vec<BenefitScheduleRecord> = records
            .iter()
            .filter(|r| r.tax_year == tax_year)
            .cloned()
            .collect();

        if year_records.is_empty() {
            return Err(ScheduleLoaderError::TaxYearNotFound(tax_year));
        }

        Self::build(&year_records)?
            .pop()
            .ok_or(ScheduleLoaderError::TaxYearNotFound(tax_year))
    }

    /// Read `path` and return the schedule for `tax_year`.
    pub fn load_file(
        path: &Path,
        tax_year: i32,
    ) -> Result<BenefitSchedule, ScheduleLoaderError> {
        let file = File::open(path)?;
        let records = Self::parse(file)?;
        Self::schedule_for_year(&records, tax_year)
    }
}

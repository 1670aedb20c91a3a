use serde::{Deserialize, Serialize};

/// Highest dependent-count bracket; larger households share it.
pub const TOP_DEPENDENT_BRACKET: u32 = 3;

/// Parameters of a single dependent-count bracket of a benefit schedule.
///
/// The credit grows at `phase_in_rate` until it reaches `max_credit`, stays
/// flat until `phase_out_start`, then shrinks at `phase_out_rate` until it
/// reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenefitBracket {
    pub max_credit: f64,
    pub phase_in_rate: f64,
    pub phase_out_start: f64,
    pub phase_out_rate: f64,
}

impl BenefitBracket {
    /// Income at which the phase-in reaches the maximum credit.
    pub fn phase_in_end(&self) -> f64 {
        self.max_credit / self.phase_in_rate
    }

    /// Income at which the phased-out credit reaches zero.
    pub fn phase_out_end(&self) -> f64 {
        self.phase_out_start + self.max_credit / self.phase_out_rate
    }

    /// True when the flat region between phase-in and phase-out is non-empty.
    pub fn has_plateau(&self) -> bool {
        self.phase_in_end() <= self.phase_out_start
    }
}

/// A complete benefit schedule for one tax year.
///
/// Brackets are indexed by dependent count 0, 1, 2 and 3-or-more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitSchedule {
    pub tax_year: i32,
    pub brackets: [BenefitBracket; TOP_DEPENDENT_BRACKET as usize + 1],
}

impl BenefitSchedule {
    /// The 2024 earned income credit table.
    pub fn eitc_2024() -> Self {
        Self {
            tax_year: 2024,
            brackets: [
                BenefitBracket {
                    max_credit: 600.0,
                    phase_in_rate: 0.0765,
                    phase_out_start: 9000.0,
                    phase_out_rate: 0.0765,
                },
                BenefitBracket {
                    max_credit: 3995.0,
                    phase_in_rate: 0.34,
                    phase_out_start: 11750.0,
                    phase_out_rate: 0.1598,
                },
                BenefitBracket {
                    max_credit: 6604.0,
                    phase_in_rate: 0.40,
                    phase_out_start: 16510.0,
                    phase_out_rate: 0.2106,
                },
                BenefitBracket {
                    max_credit: 7430.0,
                    phase_in_rate: 0.45,
                    phase_out_start: 16510.0,
                    phase_out_rate: 0.2106,
                },
            ],
        }
    }

    /// Returns the bracket for `dependents`, clamped to the top bracket.
    pub fn bracket(
        &self,
        dependents: u32,
    ) -> &BenefitBracket {
        &self.brackets[dependents.min(TOP_DEPENDENT_BRACKET) as usize]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn bracket_clamps_large_households_to_top() {
        let schedule = BenefitSchedule::eitc_2024();

        assert_eq!(schedule.bracket(3), schedule.bracket(7));
        assert_eq!(schedule.bracket(u32::MAX).max_credit, 7430.0);
    }

    #[test]
    fn phase_out_end_is_where_credit_reaches_zero() {
        let bracket = BenefitSchedule::eitc_2024().brackets[0];

        // 9000 + 600 / 0.0765
        assert!((bracket.phase_out_end() - 16843.137254901962).abs() < 1e-6);
    }

    #[test]
    fn top_bracket_of_2024_table_has_no_plateau() {
        let schedule = BenefitSchedule::eitc_2024();

        assert!(schedule.brackets[0].has_plateau());
        assert!(schedule.brackets[1].has_plateau());
        assert!(schedule.brackets[2].has_plateau());
        assert!(!schedule.brackets[3].has_plateau());
    }
}

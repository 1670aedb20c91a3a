//! Plain-text rendering of model results.
//!
//! Money is rounded half-up to cents; hours and utilities are printed as
//! plain floats.

use std::fmt;

use labor_core::calculations::common::to_currency;
use labor_core::{LaborSupply, ReformOutcome, WelfareSummary};

/// Currency with two decimals, or the raw float if it cannot be represented.
pub fn money(value: f64) -> String {
    match to_currency(value) {
        Some(amount) => format!("{amount:.2}"),
        None => value.to_string(),
    }
}

/// Benefit paid at each income for one dependent count.
pub struct BenefitTable<'a> {
    pub tax_year: i32,
    pub dependents: u32,
    /// `(income, benefit)` pairs in display order.
    pub rows: &'a [(f64, f64)],
}

impl fmt::Display for BenefitTable<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(
            f,
            "Benefit schedule {}, {} dependent(s)",
            self.tax_year, self.dependents
        )?;
        writeln!(f, "{:>14}  {:>12}", "income", "benefit")?;
        for (income, benefit) in self.rows {
            writeln!(f, "{:>14}  {:>12}", money(*income), money(*benefit))?;
        }
        Ok(())
    }
}

/// One household's optimum.
pub struct LaborSupplyReport<'a> {
    pub wage: f64,
    pub dependents: u32,
    pub supply: &'a LaborSupply,
}

impl fmt::Display for LaborSupplyReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(
            f,
            "Household: wage {}/h, {} dependent(s)",
            money(self.wage),
            self.dependents
        )?;
        writeln!(f, "  labor        {:.2} h", self.supply.labor)?;
        writeln!(f, "  income       {}", money(self.supply.income))?;
        writeln!(f, "  benefit      {}", money(self.supply.benefit))?;
        writeln!(f, "  consumption  {}", money(self.supply.consumption))?;
        writeln!(f, "  utility      {:.6}", self.supply.utility)?;
        writeln!(f, "  evaluations  {}", self.supply.evaluations)
    }
}

pub struct WelfareReport<'a>(pub &'a WelfareSummary);

impl fmt::Display for WelfareReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let summary = self.0;
        writeln!(
            f,
            "Welfare effects of a {:.2}x expansion ({} households)",
            summary.expansion_factor,
            summary.households.len()
        )?;
        writeln!(f, "  mean gain            {:.6}", summary.mean_gain)?;
        writeln!(f, "  median gain          {:.6}", summary.median_gain)?;
        writeln!(f, "  winners              {:.1}%", summary.winners_pct)?;
        writeln!(
            f,
            "  mean labor response  {:.2} h",
            summary.mean_labor_response
        )
    }
}

/// One line per simulated expansion factor.
pub struct ReformTable<'a>(pub &'a [ReformOutcome]);

impl fmt::Display for ReformTable<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(
            f,
            "{:>6}  {:>14}  {:>14}  {:>12}  {:>20}",
            "factor", "baseline", "reformed", "change", "total cost"
        )?;
        for outcome in self.0 {
            writeln!(
                f,
                "{:>6.2}  {:>14}  {:>14}  {:>12}  {:>20}",
                outcome.expansion_factor,
                money(outcome.baseline_income),
                money(outcome.reformed_income),
                money(outcome.income_change),
                money(outcome.total_cost)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    // =========================================================================
    // money tests
    // =========================================================================

    #[test]
    fn money_rounds_half_up_to_cents() {
        assert_eq!(money(141.0), "141.00");
        assert_eq!(money(3475.65), "3475.65");
        assert_eq!(money(0.125), "0.13");
        assert_eq!(money(0.0), "0.00");
    }

    #[test]
    fn money_falls_back_for_non_finite() {
        assert_eq!(money(f64::INFINITY), "inf");
    }

    // =========================================================================
    // Display tests
    // =========================================================================

    #[test]
    fn benefit_table_lists_rows_in_order() {
        let rows = [(0.0, 0.0), (15_000.0, 141.0)];
        let table = BenefitTable {
            tax_year: 2024,
            dependents: 0,
            rows: &rows,
        }
        .to_string();

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Benefit schedule 2024, 0 dependent(s)");
        assert_eq!(lines.len(), 4);
        assert!(lines[3].trim_start().starts_with("15000.00"));
        assert!(lines[3].ends_with("141.00"));
    }

    #[test]
    fn labor_supply_report_shows_money_and_hours() {
        let supply = LaborSupply {
            labor: 0.5,
            income: 10.0,
            benefit: 0.0,
            consumption: 8.0,
            utility: -0.125,
            evaluations: 42,
        };

        let report = LaborSupplyReport {
            wage: 20.0,
            dependents: 2,
            supply: &supply,
        }
        .to_string();

        assert_eq!(
            report.lines().collect::<Vec<_>>(),
            vec![
                "Household: wage 20.00/h, 2 dependent(s)",
                "  labor        0.50 h",
                "  income       10.00",
                "  benefit      0.00",
                "  consumption  8.00",
                "  utility      -0.125000",
                "  evaluations  42",
            ]
        );
    }

    #[test]
    fn welfare_report_counts_households() {
        let summary = WelfareSummary {
            expansion_factor: 1.5,
            mean_gain: 0.25,
            median_gain: 0.0,
            winners_pct: 50.0,
            mean_labor_response: -1.0,
            households: Vec::new(),
        };

        let report = WelfareReport(&summary).to_string();

        assert!(report.starts_with("Welfare effects of a 1.50x expansion (0 households)"));
        assert!(report.contains("winners              50.0%"));
    }

    #[test]
    fn reform_table_has_one_line_per_factor() {
        let outcome = ReformOutcome {
            expansion_factor: 1.5,
            baseline_income: 14_400.0,
            reformed_income: 14_760.0,
            income_change: 360.0,
            total_cost: 223_220_625.0,
        };

        let table = ReformTable(&[outcome, outcome]).to_string();

        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("223220625.00"));
        assert!(table.contains("1.50"));
    }
}

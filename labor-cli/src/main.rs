use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use labor_cli::app::{self, Model};
use labor_cli::config::AppConfig;
use labor_cli::logging;
use labor_cli::report::{BenefitTable, LaborSupplyReport, ReformTable, WelfareReport};
use labor_core::HouseholdCharacteristics;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Structural labor supply under a piecewise benefit schedule.
///
/// Evaluates the schedule, solves for a household's utility-maximising
/// hours, and compares populations under proportional benefit expansions.
#[derive(Debug, Parser)]
#[command(name = "labor-supply", version, about, long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults to `labor-supply.toml` if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Benefit schedule CSV. Without it the built-in 2024 table is used.
    #[arg(long, global = true)]
    schedule: Option<PathBuf>,

    /// Tax year of the schedule; overrides `[policy] year`.
    #[arg(long, global = true)]
    year: Option<i32>,

    /// Flat tax rate on earnings; overrides `[policy] tax_rate`.
    #[arg(long, global = true)]
    tax_rate: Option<f64>,

    /// Log level or EnvFilter directive; overrides `RUST_LOG`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the benefit paid at each income.
    Benefit {
        /// Number of qualifying dependents.
        #[arg(short, long, default_value_t = 0)]
        dependents: u32,

        /// Annual earned incomes.
        #[arg(required = true)]
        incomes: Vec<f64>,
    },

    /// Solve one household's optimal labor supply.
    Solve {
        /// Hourly wage.
        #[arg(short, long)]
        wage: f64,

        #[arg(short, long, default_value_t = 0)]
        dependents: u32,

        /// Ignore the benefit schedule.
        #[arg(long, default_value_t = false)]
        no_benefit: bool,

        /// Retry with a grid of this many points if the search does not converge.
        #[arg(long)]
        grid_fallback: Option<usize>,
    },

    /// Welfare gains of a proportional benefit expansion.
    Welfare {
        /// Household CSV (`wage,dependents[,filing_status]`).
        #[arg(long)]
        households: PathBuf,

        #[arg(short, long, default_value_t = 1.5)]
        factor: f64,
    },

    /// Cost and income response of benefit expansions.
    Reform {
        /// Household CSV (`wage,dependents[,filing_status]`).
        #[arg(long)]
        households: PathBuf,

        /// Expansion factors; defaults to `[reform] factors`.
        #[arg(short, long = "factor")]
        factors: Vec<f64>,
    },
}

impl Cli {
    fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if let Some(year) = self.year {
            config.policy.year = year;
        }
        if let Some(tax_rate) = self.tax_rate {
            config.policy.tax_rate = tax_rate;
        }
        Ok(config)
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref(), cli.log_file.as_deref())?;

    let config = cli.resolve_config()?;
    debug!(?config, "resolved configuration");

    let schedule = app::load_schedule(cli.schedule.as_deref(), config.policy.year)?;
    let model = Model::new(config, schedule)?;

    let output = match cli.command {
        Command::Benefit {
            dependents,
            incomes,
        } => {
            let rows = model.benefits(dependents, &incomes)?;
            BenefitTable {
                tax_year: model.evaluator().schedule().tax_year,
                dependents,
                rows: &rows,
            }
            .to_string()
        }
        Command::Solve {
            wage,
            dependents,
            no_benefit,
            grid_fallback,
        } => {
            let household = HouseholdCharacteristics::new(wage, dependents);
            let supply = model.solve(&household, !no_benefit, grid_fallback)?;
            LaborSupplyReport {
                wage,
                dependents,
                supply: &supply,
            }
            .to_string()
        }
        Command::Welfare { households, factor } => {
            let households = app::load_households(&households)?;
            WelfareReport(&model.welfare(&households, factor)?).to_string()
        }
        Command::Reform {
            households,
            factors,
        } => {
            let households = app::load_households(&households)?;
            ReformTable(&model.reform(&households, &factors)?).to_string()
        }
    };

    print!("{output}");
    Ok(())
}

//! End-to-end runs of the model against the bundled data files.

use std::path::PathBuf;

use labor_cli::app::{self, Model};
use labor_cli::config::AppConfig;
use labor_cli::report::{ReformTable, WelfareReport};
use labor_core::{BenefitSchedule, SearchStrategy};
use pretty_assertions::assert_eq;

fn data_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../labor-data")
        .join(relative)
}

// =============================================================================
// Schedule selection
// =============================================================================

#[test]
fn schedule_file_and_builtin_agree_for_2024() {
    let from_file = app::load_schedule(Some(&data_path("data/eitc_2024.csv")), 2024).unwrap();

    assert_eq!(from_file, BenefitSchedule::eitc_2024());
}

#[test]
fn later_year_comes_from_file() {
    let schedule =
        app::load_schedule(Some(&data_path("test-data/benefit_schedules.csv")), 2025).unwrap();
    let model = Model::new(AppConfig::default(), schedule).unwrap();

    let rows = model.benefits(1, &[15_000.0]).unwrap();

    assert_eq!(rows, vec![(15_000.0, 4328.0)]);
}

#[test]
fn missing_year_in_file_is_reported() {
    let err = app::load_schedule(Some(&data_path("data/eitc_2024.csv")), 2019).unwrap_err();

    assert!(format!("{err:#}").contains("2019"));
}

// =============================================================================
// Population runs
// =============================================================================

#[test]
fn welfare_over_bundled_households() {
    let households = app::load_households(&data_path("test-data/households.csv")).unwrap();
    let model = Model::new(AppConfig::default(), BenefitSchedule::eitc_2024()).unwrap();

    let summary = model.welfare(&households, 1.5).unwrap();

    assert_eq!(summary.households.len(), 5);
    assert!(summary.mean_gain >= -1e-9);
    assert!((0.0..=100.0).contains(&summary.winners_pct));
    assert!(WelfareReport(&summary).to_string().contains("5 households"));
}

#[test]
fn reform_cost_grows_with_factor() {
    let households = app::load_households(&data_path("test-data/households.csv")).unwrap();
    let model = Model::new(AppConfig::default(), BenefitSchedule::eitc_2024()).unwrap();

    let outcomes = model.reform(&households, &[1.0, 1.5, 2.0]).unwrap();

    assert_eq!(outcomes[0].total_cost, 0.0);
    assert!(outcomes[1].total_cost > 0.0);
    assert!(outcomes[2].total_cost > outcomes[1].total_cost);
    assert_eq!(ReformTable(&outcomes).to_string().lines().count(), 4);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn configured_strategy_reaches_the_solver() {
    let config = AppConfig::from_toml(
        r#"
        [utility]
        gamma = 0.5
        phi = 0.002

        [solver]
        strategy = "single"
        "#,
    )
    .unwrap();
    assert_eq!(config.solver.strategy, SearchStrategy::Single);

    let segmented_config = AppConfig {
        solver: labor_core::SolverConfig::default(),
        ..config.clone()
    };
    let household = labor_core::HouseholdCharacteristics::new(10.0, 1);

    let single = Model::new(config, BenefitSchedule::eitc_2024())
        .unwrap()
        .solve(&household, true, None)
        .unwrap();
    let segmented = Model::new(segmented_config, BenefitSchedule::eitc_2024())
        .unwrap()
        .solve(&household, true, None)
        .unwrap();

    assert!(segmented.utility >= single.utility - 1e-9);
}

#[test]
fn invalid_utility_config_is_rejected() {
    let config = AppConfig::from_toml("[utility]\nepsilon = -1.0\n").unwrap();

    assert!(Model::new(config, BenefitSchedule::eitc_2024()).is_err());
}

//! TOML configuration for the `labor-supply` binary.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration:
//!
//! ```toml
//! [utility]
//! gamma = 2.0
//! epsilon = 0.5
//! phi = 1.0
//!
//! [solver]
//! max_labor = 2000.0
//! strategy = "segmented"
//!
//! [policy]
//! tax_rate = 0.2
//! year = 2024
//!
//! [reform]
//! baseline_hours = 1800.0
//! factors = [1.0, 1.5, 2.0]
//! ```
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use labor_core::{ReformConfig, SolverConfig, UtilityParameters};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "labor-supply.toml";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub utility: UtilityConfig,
    pub solver: SolverConfig,
    pub policy: PolicyConfig,
    pub reform: ReformSection,
}

/// Preference parameters, under their conventional symbols.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilityConfig {
    pub gamma: f64,
    pub epsilon: f64,
    pub phi: f64,
}

impl Default for UtilityConfig {
    fn default() -> Self {
        let params = UtilityParameters::default();
        Self {
            gamma: params.consumption.gamma(),
            epsilon: params.frisch_elasticity,
            phi: params.labor_disutility,
        }
    }
}

impl UtilityConfig {
    pub fn params(&self) -> UtilityParameters {
        UtilityParameters::new(self.gamma, self.epsilon, self.phi)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Flat marginal tax rate on earned income.
    pub tax_rate: f64,
    /// Tax year of the benefit schedule.
    pub year: i32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            tax_rate: 0.2,
            year: 2024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReformSection {
    #[serde(flatten)]
    pub simulation: ReformConfig,
    /// Expansion factors simulated when none are given on the command line.
    pub factors: Vec<f64>,
}

impl Default for ReformSection {
    fn default() -> Self {
        Self {
            simulation: ReformConfig::default(),
            factors: vec![1.0, 1.25, 1.5, 1.75, 2.0],
        }
    }
}

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(input: &str) -> Result<Self> {
        toml::from_str(input).context("Failed to parse configuration")
    }

    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] when
    /// `path` is `None`.
    ///
    /// An explicit path must exist; a missing default file yields the
    /// default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if !default_path.exists() {
                    debug!("no configuration file found, using defaults");
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use labor_core::{ConsumptionUtility, SearchStrategy};

    #[test]
    fn empty_file_is_default() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn defaults_match_model_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.utility.params(), UtilityParameters::default());
        assert_eq!(config.solver, SolverConfig::default());
        assert_eq!(config.policy.tax_rate, 0.2);
        assert_eq!(config.policy.year, 2024);
        assert_eq!(config.reform.factors, vec![1.0, 1.25, 1.5, 1.75, 2.0]);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [utility]
            gamma = 1.0

            [solver]
            strategy = "single"
            max_evaluations = 200

            [reform]
            population_weight = 1000.0
            factors = [1.5]
            "#,
        )
        .unwrap();

        assert_eq!(config.utility.params().consumption, ConsumptionUtility::Log);
        assert_eq!(config.utility.epsilon, 0.5);
        assert_eq!(config.solver.strategy, SearchStrategy::Single);
        assert_eq!(config.solver.max_evaluations, 200);
        assert_eq!(config.solver.max_labor, 2000.0);
        assert_eq!(config.reform.simulation.population_weight, 1000.0);
        assert_eq!(config.reform.simulation.baseline_hours, 1800.0);
        assert_eq!(config.reform.factors, vec![1.5]);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(AppConfig::from_toml("[utility\ngamma = ").is_err());
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(AppConfig::from_toml("[policy]\nyear = \"next\"").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("no/such/labor-supply.toml")));

        assert!(result.is_err());
    }
}

//! Engine-wide configuration
//!
//! Settings come from defaults, then an optional JSON file, then `FINSIM_*`
//! environment variables.

use std::env;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::debt::DebtConfig;
use crate::error::EngineResult;
use crate::projection::ProjectionConfig;
use crate::scenario::{MonteCarloConfig, PriorityWeights, SensitivityConfig};

pub const ENV_SIMULATIONS: &str = "FINSIM_SIMULATIONS";
pub const ENV_SEED: &str = "FINSIM_SEED";
pub const ENV_RETURN_STD_DEV: &str = "FINSIM_RETURN_STD_DEV";
pub const ENV_MAX_MONTHS: &str = "FINSIM_MAX_MONTHS";
pub const ENV_SNOWBALL_TOLERANCE: &str = "FINSIM_SNOWBALL_TOLERANCE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub projection: ProjectionConfig,
    pub debt: DebtConfig,
    pub monte_carlo: MonteCarloConfig,
    pub sensitivity: SensitivityConfig,
    pub priority_weights: PriorityWeights,
}

impl EngineConfig {
    /// Read a (possibly partial) config from a JSON file
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let file = File::open(path.as_ref())?;
        let config: EngineConfig = serde_json::from_reader(BufReader::new(file))?;
        debug!("loaded engine config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply `FINSIM_*` environment variables; unparseable values are ignored
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        self.monte_carlo.num_simulations = lookup(ENV_SIMULATIONS)
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.monte_carlo.num_simulations);
        self.monte_carlo.seed = lookup(ENV_SEED)
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.monte_carlo.seed);
        self.monte_carlo.return_std_dev = lookup(ENV_RETURN_STD_DEV)
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.monte_carlo.return_std_dev);
        self.debt.max_months = lookup(ENV_MAX_MONTHS)
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.debt.max_months);
        self.debt.snowball_tolerance = lookup(ENV_SNOWBALL_TOLERANCE)
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.debt.snowball_tolerance);
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.projection.validate()?;
        self.debt.validate()?;
        self.monte_carlo.validate()?;
        self.sensitivity.validate()?;
        self.priority_weights.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.monte_carlo.num_simulations, 1000);
        assert_eq!(config.debt.max_months, 1200);
    }

    #[test]
    fn test_overrides_replace_values() {
        let config = EngineConfig::default().with_overrides(lookup(&[
            (ENV_SIMULATIONS, "250"),
            (ENV_SEED, "7"),
            (ENV_RETURN_STD_DEV, "0.1"),
            (ENV_MAX_MONTHS, "600"),
            (ENV_SNOWBALL_TOLERANCE, "0.05"),
        ]));
        assert_eq!(config.monte_carlo.num_simulations, 250);
        assert_eq!(config.monte_carlo.seed, 7);
        assert_eq!(config.monte_carlo.return_std_dev, 0.1);
        assert_eq!(config.debt.max_months, 600);
        assert_eq!(config.debt.snowball_tolerance, 0.05);
    }

    #[test]
    fn test_unparseable_override_is_ignored() {
        let config = EngineConfig::default().with_overrides(lookup(&[(ENV_SIMULATIONS, "lots")]));
        assert_eq!(config.monte_carlo.num_simulations, 1000);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let path = env::temp_dir().join(format!("finsim_config_{}.json", std::process::id()));
        let mut file = File::create(&path).unwrap();
        write!(file, r#"{{"monte_carlo": {{"num_simulations": 50}}, "debt": {{"include_schedule": false}}}}"#).unwrap();
        drop(file);

        let config = EngineConfig::from_json_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.monte_carlo.num_simulations, 50);
        assert_eq!(config.monte_carlo.seed, 42);
        assert!(!config.debt.include_schedule);
        assert_eq!(config.projection, ProjectionConfig::default());
    }

    #[test]
    fn test_validate_catches_bad_section() {
        let mut config = EngineConfig::default();
        config.monte_carlo.num_simulations = 0;
        assert!(config.validate().is_err());
    }
}

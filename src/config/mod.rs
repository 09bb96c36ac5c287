//! Configuration module
//!
//! Runner settings, loadable from YAML/JSON files and overridable from the
//! environment.

pub mod env;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::registry::DEFAULT_CAPACITY;
use env::EnvConfig;

/// Indentation added per harness nesting level
pub const LEVEL_INDENT: usize = 4;

/// Deepest harness level honored; deeper levels indent as this one
pub const MAX_HARNESS_LEVEL: usize = 64;

/// Runner configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Maximum number of registered tests
    pub capacity: usize,

    /// Nesting depth of this run inside an outer harness
    pub harness_level: usize,

    /// Randomization seed; `None` keeps registration order, values <= 0
    /// are replaced by a time-derived seed
    pub seed: Option<i64>,

    /// Arm the leak detector before running
    pub leak_check: bool,

    /// Name reported in the plan and subtest header lines
    pub program_name: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            harness_level: 0,
            seed: None,
            leak_check: true,
            program_name: None,
        }
    }
}

impl RunnerConfig {
    /// Default configuration with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_env(&EnvConfig::load())
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read config file")?;

        let config: Self = if is_yaml(path.as_ref()) {
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON config")?
        };

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = if is_yaml(path.as_ref()) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Apply environment overrides
    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        if let Some(level) = env.level {
            self.harness_level = level;
        }
        if env.seed.is_some() {
            self.seed = env.seed;
        }
        if !env.leak_check_enabled() {
            self.leak_check = false;
        }
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_harness_level(mut self, level: usize) -> Self {
        self.harness_level = level;
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_leak_check(mut self, enabled: bool) -> Self {
        self.leak_check = enabled;
        self
    }

    pub fn with_program_name(mut self, name: impl Into<String>) -> Self {
        self.program_name = Some(name.into());
        self
    }

    /// Indentation of top-level report lines
    pub fn base_level(&self) -> usize {
        LEVEL_INDENT * self.harness_level.min(MAX_HARNESS_LEVEL)
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.capacity, 1024);
        assert_eq!(config.seed, None);
        assert!(config.leak_check);
        assert_eq!(config.base_level(), 0);
    }

    #[test]
    fn test_base_level() {
        let config = RunnerConfig::default().with_harness_level(2);
        assert_eq!(config.base_level(), 8);
    }

    #[test]
    fn test_extreme_level_is_capped() {
        let env = EnvConfig {
            level: Some(usize::MAX / 2),
            ..Default::default()
        };
        let config = RunnerConfig::default().with_env(&env);
        assert_eq!(config.base_level(), LEVEL_INDENT * MAX_HARNESS_LEVEL);

        let config = RunnerConfig::default().with_harness_level(usize::MAX);
        assert_eq!(config.base_level(), 256);
    }

    #[test]
    fn test_env_overrides() {
        let env = EnvConfig {
            level: Some(1),
            seed: Some(77),
            debug_memory: Some("0".to_string()),
            ..Default::default()
        };
        let config = RunnerConfig::default().with_env(&env);
        assert_eq!(config.harness_level, 1);
        assert_eq!(config.seed, Some(77));
        assert!(!config.leak_check);
    }

    #[test]
    fn test_env_without_values_keeps_config() {
        let config = RunnerConfig::default()
            .with_seed(5)
            .with_env(&EnvConfig::default());
        assert_eq!(config.seed, Some(5));
        assert!(config.leak_check);
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runner.yaml");

        let config = RunnerConfig::default()
            .with_seed(99)
            .with_program_name("suite");
        config.save(&path).unwrap();

        assert_eq!(RunnerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runner.json");
        std::fs::write(&path, r#"{ "harness_level": 3 }"#).unwrap();

        let config = RunnerConfig::load(&path).unwrap();
        assert_eq!(config.harness_level, 3);
        assert_eq!(config.capacity, 1024);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(RunnerConfig::load("/nonexistent/runner.yaml").is_err());
    }
}

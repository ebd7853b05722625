//! Configuration loading for the engine.
//!
//! Every tuning constant is overridable from a TOML file. Sections that are
//! absent fall back to the shipped defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Momentum streak settings
    #[serde(default)]
    pub momentum: MomentumConfig,
    /// Stage/progress settings
    #[serde(default)]
    pub progress: ProgressConfig,
    /// Choice reducer settings
    #[serde(default)]
    pub reducer: ReducerConfig,
    /// Scenario selection settings
    #[serde(default)]
    pub selector: SelectorConfig,
    /// Achievement check cadence
    #[serde(default)]
    pub achievements: AchievementCheckConfig,
    /// Behavioral counter thresholds
    #[serde(default)]
    pub counters: CounterConfig,
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Momentum streak constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Base contribution needed to extend the streak
    pub threshold: u32,
    /// Streak length that switches momentum on
    pub streak_to_activate: u32,
    /// Multiplier applied while active
    pub boost: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            threshold: 8,
            streak_to_activate: 3,
            boost: 1.25,
        }
    }
}

/// Stage and progress constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Progress per stage
    pub per_stage: u32,
    /// Highest reachable stage
    pub max_stage: u32,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            per_stage: 100,
            max_stage: 10,
        }
    }
}

/// Choice reducer constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReducerConfig {
    /// Smallest randomized skill bonus (inclusive)
    pub skill_bonus_min: u32,
    /// Largest randomized skill bonus (inclusive)
    pub skill_bonus_max: u32,
    /// Authored energy costs are divided by this
    pub energy_cost_scale: f64,
    /// Salary is annual; prorated per month
    pub months_per_year: f64,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            skill_bonus_min: 5,
            skill_bonus_max: 15,
            energy_cost_scale: 100.0,
            months_per_year: 12.0,
        }
    }
}

/// Scenario selection constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Starting weight of every candidate
    pub base_weight: u32,
    /// Added when difficulty matches the stage band
    pub band_match_bonus: u32,
    /// Weight of beginner content in the advanced band
    pub late_easy_weight: u32,
    /// First stage of the intermediate band
    pub intermediate_from_stage: u32,
    /// First stage of the advanced band
    pub advanced_from_stage: u32,
    /// Capacity of the recent-scenario window
    pub recent_scenarios: usize,
    /// Capacity of the recent-tag window
    pub recent_tags: usize,
    /// Cooldown used when a scenario declares none
    pub default_cooldown: u32,
    /// Cooldown of the fallback scenario
    pub fallback_cooldown: u32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            base_weight: 10,
            band_match_bonus: 10,
            late_easy_weight: 2,
            intermediate_from_stage: 2,
            advanced_from_stage: 4,
            recent_scenarios: 5,
            recent_tags: 3,
            default_cooldown: 3,
            fallback_cooldown: 2,
        }
    }
}

/// When the reducer re-runs the achievement engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementCheckConfig {
    /// Progress milestone size
    pub progress_milestone: u32,
    /// Stat swing that forces a check
    pub stat_swing: f64,
    /// Check every N turns regardless
    pub every_turns: u32,
}

impl Default for AchievementCheckConfig {
    fn default() -> Self {
        Self {
            progress_milestone: 25,
            stat_swing: 10.0,
            every_turns: 5,
        }
    }
}

/// Thresholds for the behavioral counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Stress below this extends the low-stress streak
    pub low_stress: f64,
    /// Energy at or above this extends the high-energy streak
    pub high_energy: f64,
    /// Stress at or above this counts as a peak
    pub stress_peak: f64,
    /// Stress below this after a peak counts as recovery
    pub stress_recovery: f64,
    /// Energy below this derives the exhausted state
    pub exhausted_energy: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            low_stress: 0.3,
            high_energy: 0.7,
            stress_peak: 0.8,
            stress_recovery: 0.5,
            exhausted_energy: 0.2,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Career Engine Configuration

[momentum]
threshold = 8
streak_to_activate = 3
boost = 1.25

[progress]
per_stage = 100
max_stage = 10

[reducer]
skill_bonus_min = 5
skill_bonus_max = 15
energy_cost_scale = 100.0
months_per_year = 12.0

[selector]
base_weight = 10
band_match_bonus = 10
late_easy_weight = 2
intermediate_from_stage = 2
advanced_from_stage = 4
recent_scenarios = 5
recent_tags = 3
default_cooldown = 3
fallback_cooldown = 2

[achievements]
progress_milestone = 25
stat_swing = 10.0
every_turns = 5

[counters]
low_stress = 0.3
high_energy = 0.7
stress_peak = 0.8
stress_recovery = 0.5
exhausted_energy = 0.2
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.momentum.threshold, 8);
        assert_eq!(config.momentum.streak_to_activate, 3);
        assert_eq!(config.momentum.boost, 1.25);
        assert_eq!(config.selector.default_cooldown, 3);
        assert_eq!(config.selector.recent_tags, 3);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [momentum]
            threshold = 10
        "#;

        let config = EngineConfig::from_str(toml).unwrap();

        // Specified value
        assert_eq!(config.momentum.threshold, 10);
        // Default values
        assert_eq!(config.momentum.boost, 1.25);
        assert_eq!(config.selector.base_weight, 10);
    }

    #[test]
    fn test_default_config_toml_parses_to_default() {
        let config = EngineConfig::from_str(&default_config_toml()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_to_toml() {
        let toml = EngineConfig::default().to_toml().unwrap();

        assert!(toml.contains("[momentum]"));
        assert!(toml.contains("[selector]"));
        assert_eq!(EngineConfig::from_str(&toml).unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[selector]\ndefault_cooldown = 6").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.selector.default_cooldown, 6);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let err = EngineConfig::from_str("[momentum\nthreshold = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}

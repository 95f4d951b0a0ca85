//! Simulation configuration with documented constants
//!
//! Runtime knobs live in [`SimulationConfig`]; game balance constants that
//! the rules depend on are collected here as `const`s with a note on what
//! they drive.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{CivError, Result};

// === ECONOMY ===

/// Base population growth per tick, before any building contributes
pub const BASE_POPULATION_GROWTH: f64 = 0.01;

/// Per-instance cost growth: the n-th copy of a building costs `base * 1.15^n`
pub const BUILDING_COST_GROWTH: f64 = 1.15;

/// Concentration bonus for gold and science producers (`1.05^count`)
pub const GOLD_EFFICIENCY_BASE: f64 = 1.05;

/// Gentler concentration bonus for population producers (`1.02^count`)
pub const POPULATION_EFFICIENCY_BASE: f64 = 1.02;

// === MILITARY ===

/// Strength reported when the empire has no soldiers at all
pub const DEFENSELESS_STRENGTH: f64 = 5.0;

/// Strength contributed by each soldier
pub const STRENGTH_PER_SOLDIER: f64 = 2.0;

/// Military multiplier gained per future-tech level
pub const FUTURE_TECH_MILITARY_STEP: f64 = 0.05;

/// Gold cost of one soldier (plus one population)
pub const RECRUIT_GOLD_COST: f64 = 50.0;

// === SESSION ===

/// Number of log entries kept in a save file
pub const SAVED_LOG_LIMIT: usize = 50;

/// Configuration for the simulation runtime
///
/// Every field has a sensible default, so a TOML file only needs to name
/// the values it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the deterministic random source
    pub seed: u64,

    /// Wall-clock length of one tick in milliseconds
    pub tick_interval_ms: u64,

    /// Number of rival factions drawn at game start
    pub rival_count: usize,

    /// Whether an unresolved crisis freezes the whole tick
    ///
    /// When false, the economy keeps running and only the crisis draw and
    /// the rival step are skipped while a crisis is pending.
    pub crisis_pauses_simulation: bool,

    /// How many scheduler fires the era-transition display blocks for
    pub era_transition_ticks: u32,

    /// Where the session snapshot is written. `None` disables saving.
    pub save_path: Option<PathBuf>,

    /// Quiet period after the last change before a snapshot is written
    pub save_debounce_ms: u64,

    /// Whether narrative requests are sent to the narrator at all
    pub narration_enabled: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            tick_interval_ms: 1000,
            rival_count: 3,
            crisis_pauses_simulation: true,
            era_transition_ticks: 5,
            save_path: None,
            save_debounce_ms: 2000,
            narration_enabled: true,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(CivError::Config("tick_interval_ms must be positive".into()));
        }

        // Rivals are drawn without replacement from the template list
        let templates = crate::diplomacy::rival::RIVAL_TEMPLATES.len();
        if self.rival_count > templates {
            return Err(CivError::Config(format!(
                "rival_count ({}) exceeds available rival templates ({})",
                self.rival_count, templates
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str("seed = 99\nrival_count = 2\n").unwrap();
        assert_eq!(config.seed, 99);
        assert_eq!(config.rival_count, 2);
        assert_eq!(config.tick_interval_ms, 1000);
        assert!(config.crisis_pauses_simulation);
    }

    #[test]
    fn test_too_many_rivals_rejected() {
        let result = SimulationConfig::from_toml_str("rival_count = 40\n");
        assert!(matches!(result, Err(CivError::Config(_))));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = SimulationConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = SimulationConfig::from_toml_str(include_str!("../../data/simulation.toml")).unwrap();
        assert_eq!(config.save_path, Some(PathBuf::from("civ_save.json")));
        assert_eq!(config.era_transition_ticks, 5);
    }

    #[test]
    fn test_malformed_toml_is_error() {
        assert!(SimulationConfig::from_toml_str("seed = \"abc\"").is_err());
    }
}

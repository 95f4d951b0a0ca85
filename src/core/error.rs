use thiserror::Error;

use crate::core::types::Tick;

#[derive(Error, Debug)]
pub enum CivError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Scheduler is no longer running")]
    SchedulerStopped,
}

pub type Result<T> = std::result::Result<T, CivError>;

/// Why a player action was refused.
///
/// A rejection never changes simulation state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("Unknown building: {0}")]
    UnknownBuilding(String),

    #[error("Unknown technology: {0}")]
    UnknownTechnology(String),

    #[error("Unknown rival: {0}")]
    UnknownRival(u32),

    #[error("Requires technology {0}")]
    Locked(String),

    #[error("Not enough gold: need {needed}, have {available:.0}")]
    InsufficientGold { needed: f64, available: f64 },

    #[error("Not enough science: need {needed}, have {available:.0}")]
    InsufficientScience { needed: f64, available: f64 },

    #[error("Not enough population: need {needed}, have {available:.0}")]
    InsufficientPopulation { needed: f64, available: f64 },

    #[error("Not enough free land: need {needed}, have {available}")]
    InsufficientLand { needed: u32, available: u32 },

    #[error("Not enough idle workers: need {needed}, have {available}")]
    InsufficientIdleWorkers { needed: u32, available: u32 },

    #[error("Worker capacity exceeded: capacity {capacity}")]
    CapacityExceeded { capacity: u32 },

    #[error("Cannot remove more workers than assigned")]
    NegativeAssignment,

    #[error("Cannot afford every cost of the crisis")]
    CrisisUnaffordable,

    #[error("No active crisis")]
    NoActiveCrisis,

    #[error("Technology already researched")]
    AlreadyResearched,

    #[error("Prerequisite {0} not researched")]
    MissingPrerequisite(String),

    #[error("Not available in the current era")]
    WrongEra,

    #[error("Rival forces are regrouping until tick {until}")]
    OnCooldown { until: Tick },

    #[error("Golden age already active")]
    ModifierActive,
}

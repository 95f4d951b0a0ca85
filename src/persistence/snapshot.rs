//! Save snapshots - the persisted shape of a session
//!
//! Buildings are saved by id only. On restore, counts and assignments are
//! merged onto whatever definitions the game currently ships, so renamed or
//! retuned buildings do not break old saves.

use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::city::building::{BuildingDefinition, BuildingRoster};
use crate::city::stockpile::Resources;
use crate::core::config::{SimulationConfig, SAVED_LOG_LIMIT};
use crate::core::error::Result;
use crate::core::types::{Climate, Era, Tick};
use crate::diplomacy::rival::Rival;
use crate::research::technology::ResearchState;
use crate::simulation::crisis::Crisis;
use crate::simulation::era::Overlay;
use crate::simulation::events::{EventLog, LogEntry};
use crate::simulation::projects::GoldenAge;
use crate::simulation::state::{Simulation, SimulationState};

/// Per-building state in a save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedBuilding {
    pub id: String,
    pub count: u32,
    pub assigned_workers: u32,
}

/// Everything needed to resume a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSnapshot {
    pub session_id: Uuid,
    pub resources: Resources,
    pub buildings: Vec<SavedBuilding>,
    pub unlocked_techs: Vec<String>,
    pub future_tech_level: u32,
    pub era: Era,
    pub climate: Climate,
    pub game_time: Tick,
    pub rivals: Vec<Rival>,
    /// Most recent entries only
    pub logs: Vec<LogEntry>,
    #[serde(default)]
    pub active_crisis: Option<Crisis>,
    #[serde(default)]
    pub golden_age: Option<GoldenAge>,
}

impl SaveSnapshot {
    /// Capture the persisted part of a state
    pub fn capture(state: &SimulationState, session_id: Uuid) -> Self {
        let roster = &state.buildings;
        let buildings = (0..roster.len())
            .filter(|&i| roster.counts[i] > 0)
            .map(|i| SavedBuilding {
                id: roster.definition(i).id.clone(),
                count: roster.counts[i],
                assigned_workers: roster.assigned_workers[i],
            })
            .collect();

        Self {
            session_id,
            resources: state.resources.clone(),
            buildings,
            unlocked_techs: state.research.unlocked.clone(),
            future_tech_level: state.research.future_level,
            era: state.era,
            climate: state.climate,
            game_time: state.tick,
            rivals: state.rivals.clone(),
            logs: state.log.recent(SAVED_LOG_LIMIT).to_vec(),
            active_crisis: state.active_crisis.clone(),
            golden_age: state.golden_age,
        }
    }

    /// Rebuild a state over the given definitions
    ///
    /// Saved buildings with no matching definition are dropped.
    pub fn restore(&self, definitions: Vec<BuildingDefinition>) -> SimulationState {
        let mut buildings = BuildingRoster::new(definitions);
        for saved in &self.buildings {
            if !buildings.restore_slot(&saved.id, saved.count, saved.assigned_workers) {
                tracing::debug!("Dropping saved building with unknown id {}", saved.id);
            }
        }

        let mut resources = self.resources.clone();
        resources.land = resources.land.min(resources.max_land);

        SimulationState {
            resources,
            buildings,
            research: ResearchState {
                unlocked: self.unlocked_techs.clone(),
                future_level: self.future_tech_level,
            },
            era: self.era,
            climate: self.climate,
            tick: self.game_time,
            rivals: self.rivals.clone(),
            active_crisis: self.active_crisis.clone(),
            golden_age: self.golden_age,
            overlay: Overlay::None,
            log: EventLog::from_entries(self.logs.clone()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a snapshot file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// A simulation plus the session it belongs to
pub struct Session {
    pub id: Uuid,
    pub simulation: Simulation,
}

impl Session {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            simulation: Simulation::new(config),
        }
    }

    /// Resume from a snapshot
    ///
    /// The random stream is reseeded from the config seed and the saved
    /// game time, so a resumed game is deterministic too.
    pub fn resume(config: SimulationConfig, snapshot: &SaveSnapshot) -> Self {
        let state = snapshot.restore(crate::city::catalog::default_buildings());
        let rng = ChaCha8Rng::seed_from_u64(config.seed ^ snapshot.game_time);
        Self {
            id: snapshot.session_id,
            simulation: Simulation::from_state(config, state, rng),
        }
    }

    /// Resume from the configured save file, or start fresh
    ///
    /// A missing save starts a new game quietly; a corrupt one is reported
    /// and replaced by a new game.
    pub fn load_or_new(config: SimulationConfig) -> Self {
        let Some(path) = config.save_path.clone() else {
            return Self::new(config);
        };
        if !path.exists() {
            return Self::new(config);
        }

        match SaveSnapshot::load(&path) {
            Ok(snapshot) => {
                tracing::info!(
                    "Resumed session {} at tick {}",
                    snapshot.session_id,
                    snapshot.game_time
                );
                Self::resume(config, &snapshot)
            }
            Err(e) => {
                tracing::warn!("Corrupt save at {}: {}. Starting a new game.", path.display(), e);
                Self::new(config)
            }
        }
    }

    pub fn snapshot(&self) -> SaveSnapshot {
        SaveSnapshot::capture(&self.simulation.state, self.id)
    }
}

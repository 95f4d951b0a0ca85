//! Simulation state and the engine that owns it

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::city::building::{BuildingDefinition, BuildingRoster};
use crate::city::production::{calculate_production, ProductionDeltas};
use crate::city::stockpile::Resources;
use crate::core::config::SimulationConfig;
use crate::core::types::{BuildingStyle, Climate, Era, Tick};
use crate::diplomacy::military::military_strength;
use crate::diplomacy::rival::{generate_rivals, Rival, RivalId};
use crate::llm::narrator::NarrativeRequest;
use crate::research::technology::{ResearchState, TechCatalog};
use crate::simulation::crisis::{Crisis, CrisisCatalog};
use crate::simulation::era::Overlay;
use crate::simulation::events::{EventLog, LogKind};
use crate::simulation::projects::{global_factor, GoldenAge};

/// Everything that changes during a session
///
/// One coherent value, mutated by one tick stage or one player action at a
/// time.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub resources: Resources,
    pub buildings: BuildingRoster,
    pub research: ResearchState,
    pub era: Era,
    pub climate: Climate,
    /// Completed ticks
    pub tick: Tick,
    pub rivals: Vec<Rival>,
    pub active_crisis: Option<Crisis>,
    pub golden_age: Option<GoldenAge>,
    pub overlay: Overlay,
    pub log: EventLog,
}

impl SimulationState {
    /// Fresh game over the given building definitions
    pub fn new(
        definitions: Vec<BuildingDefinition>,
        rival_count: usize,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let climate = Climate::random(rng);
        let rivals = generate_rivals(rival_count, Era::Tribal, rng);

        Self {
            resources: Resources::initial(),
            buildings: BuildingRoster::new(definitions),
            research: ResearchState::new(),
            era: Era::Tribal,
            climate,
            tick: 0,
            rivals,
            active_crisis: None,
            golden_age: None,
            overlay: Overlay::None,
            log: EventLog::new(),
        }
    }

    /// Production multiplier in force this tick
    pub fn global_factor(&self) -> f64 {
        global_factor(self.golden_age.as_ref(), self.tick)
    }

    pub fn golden_age_active(&self) -> bool {
        self.golden_age.is_some_and(|g| g.is_active(self.tick))
    }

    pub fn idle_workers(&self) -> i64 {
        self.buildings.idle_workers(self.resources.workforce())
    }

    pub fn dominant_style(&self) -> BuildingStyle {
        self.buildings.dominant_style()
    }

    pub fn rival(&self, id: RivalId) -> Option<&Rival> {
        self.rivals.iter().find(|r| r.id == id)
    }

    pub fn log(&mut self, kind: LogKind, text: impl Into<String>) -> u64 {
        let text = text.into();
        tracing::debug!(tick = self.tick, ?kind, "{}", text);
        self.log.push(kind, self.tick, text)
    }
}

/// Read-only view handed to drivers after every change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusView {
    pub tick: Tick,
    pub era: Era,
    pub climate: Climate,
    pub resources: Resources,
    pub idle_workers: i64,
    pub military_strength: f64,
    pub income: ProductionDeltas,
    pub golden_age_active: bool,
    pub crisis: Option<String>,
    pub overlay: Overlay,
}

/// The simulation engine: state plus the catalogs and random source it runs on
pub struct Simulation {
    pub state: SimulationState,
    pub techs: TechCatalog,
    pub crises: CrisisCatalog,
    pub(crate) config: SimulationConfig,
    pub(crate) rng: ChaCha8Rng,
    outbox: Vec<NarrativeRequest>,
}

impl Simulation {
    /// New game with the built-in catalogs
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_buildings(config, crate::city::catalog::default_buildings())
    }

    /// New game over a custom building list
    pub fn with_buildings(config: SimulationConfig, definitions: Vec<BuildingDefinition>) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let state = SimulationState::new(definitions, config.rival_count, &mut rng);
        Self::from_state(config, state, rng)
    }

    /// Resume from an existing state
    pub fn from_state(config: SimulationConfig, state: SimulationState, rng: ChaCha8Rng) -> Self {
        Self {
            state,
            techs: TechCatalog::with_defaults(),
            crises: CrisisCatalog::with_defaults(),
            config,
            rng,
            outbox: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn tick(&self) -> Tick {
        self.state.tick
    }

    /// Military strength, recomputed from the current state
    pub fn military_strength(&self) -> f64 {
        military_strength(
            &self.state.resources,
            &self.state.buildings,
            &self.state.research,
            &self.techs,
            self.state.global_factor(),
        )
    }

    /// Deltas the next production stage would apply
    pub fn production_preview(&self) -> ProductionDeltas {
        calculate_production(&self.state.buildings, self.state.global_factor())
    }

    pub fn status(&self) -> StatusView {
        StatusView {
            tick: self.state.tick,
            era: self.state.era,
            climate: self.state.climate,
            resources: self.state.resources.clone(),
            idle_workers: self.state.idle_workers(),
            military_strength: self.military_strength(),
            income: self.production_preview(),
            golden_age_active: self.state.golden_age_active(),
            crisis: self.state.active_crisis.as_ref().map(|c| c.name.clone()),
            overlay: self.state.overlay,
        }
    }

    /// Queue a narrative request for the narrator, if narration is on
    pub(crate) fn request_narrative(&mut self, request: NarrativeRequest) {
        if self.config.narration_enabled {
            self.outbox.push(request);
        }
    }

    /// Take every narrative request queued since the last call
    pub fn drain_narrative_requests(&mut self) -> Vec<NarrativeRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Append narrator output to the log
    pub fn record_narrative(&mut self, text: impl Into<String>) -> u64 {
        self.state.log(LogKind::Ai, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_state() {
        let sim = Simulation::new(SimulationConfig::default());

        assert_eq!(sim.state.resources, Resources::initial());
        assert_eq!(sim.state.era, Era::Tribal);
        assert_eq!(sim.state.tick, 0);
        assert_eq!(sim.state.rivals.len(), 3);
        assert_eq!(sim.state.buildings.len(), 13);
        assert!(sim.state.active_crisis.is_none());
        assert_eq!(sim.military_strength(), 5.0);
    }

    #[test]
    fn test_same_seed_same_start() {
        let a = Simulation::new(SimulationConfig::default());
        let b = Simulation::new(SimulationConfig::default());
        assert_eq!(a.state.climate, b.state.climate);
        assert_eq!(a.state.rivals, b.state.rivals);
    }

    #[test]
    fn test_narration_can_be_disabled() {
        let mut sim = Simulation::new(SimulationConfig {
            narration_enabled: false,
            ..Default::default()
        });
        sim.request_narrative(NarrativeRequest::EraTransition(Era::Industrial));
        assert!(sim.drain_narrative_requests().is_empty());
    }
}

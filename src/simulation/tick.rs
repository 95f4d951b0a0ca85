//! Tick system - orchestrates one step of the simulation
//!
//! Stages run strictly in order over the one [`SimulationState`], each
//! reading what the previous stage committed:
//! golden age expiry -> worker-deficit reconciliation -> production ->
//! depletion -> era check -> crisis draw -> rival step -> tick counter.
//!
//! [`SimulationState`]: crate::simulation::state::SimulationState

use crate::city::depletion::roll_depletion;
use crate::city::production::{calculate_production, ProductionDeltas};
use crate::city::workforce::reconcile_deficit;
use crate::core::types::{Era, Tick};
use crate::diplomacy::military::military_strength;
use crate::diplomacy::raids::{rival_step, RaidReport};
use crate::llm::narrator::NarrativeRequest;
use crate::simulation::crisis::roll_crisis;
use crate::simulation::era::{era_land_bonus, next_era_reached, Overlay};
use crate::simulation::events::LogKind;
use crate::simulation::state::Simulation;

/// Events generated during a simulation tick
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    GoldenAgeEnded,
    /// Assignments removed because the population shrank below them
    WorkersReleased { count: u32 },
    Produced(ProductionDeltas),
    BuildingDepleted { building_id: String, remaining: u32 },
    EraReached { era: Era, land_bonus: u32 },
    CrisisStarted { crisis_id: String },
    Raided(RaidReport),
}

/// What one scheduler fire did
#[derive(Debug, Clone, PartialEq)]
pub enum FireOutcome {
    /// A full tick ran
    Ticked(Vec<SimulationEvent>),
    /// An era announcement is showing; the tick counter did not move
    HeldByOverlay,
    /// A crisis is waiting for the player and pauses everything
    HeldByCrisis,
}

impl Simulation {
    /// Handle one scheduler fire
    ///
    /// An era overlay counts down instead of ticking. An unresolved crisis
    /// holds the whole tick unless the config lets the economy run on.
    pub fn fire(&mut self) -> FireOutcome {
        if self.state.overlay.is_blocking() {
            self.state.overlay.count_down();
            return FireOutcome::HeldByOverlay;
        }
        if self.state.active_crisis.is_some() && self.config.crisis_pauses_simulation {
            return FireOutcome::HeldByCrisis;
        }
        FireOutcome::Ticked(run_simulation_tick(self))
    }

    /// Fire until `ticks` full ticks have run, returning every event
    ///
    /// Overlays are skipped through. Stops early if a crisis pauses the game.
    pub fn advance(&mut self, ticks: Tick) -> Vec<SimulationEvent> {
        let target = self.state.tick + ticks;
        let mut events = Vec::new();
        while self.state.tick < target {
            match self.fire() {
                FireOutcome::Ticked(mut e) => events.append(&mut e),
                FireOutcome::HeldByOverlay => {}
                FireOutcome::HeldByCrisis => break,
            }
        }
        events
    }
}

/// Run a single simulation tick
///
/// The caller is responsible for overlay and crisis gating; see
/// [`Simulation::fire`]. With a crisis pending here, only the crisis draw
/// and the rival step are skipped.
pub fn run_simulation_tick(sim: &mut Simulation) -> Vec<SimulationEvent> {
    let mut events = Vec::new();

    expire_golden_age(sim, &mut events);
    reconcile_workers(sim, &mut events);
    run_production(sim, &mut events);
    run_depletion(sim, &mut events);
    check_era(sim, &mut events);

    if sim.state.active_crisis.is_none() {
        draw_crisis(sim, &mut events);
    }
    // A crisis drawn this tick also holds the rivals back
    if sim.state.active_crisis.is_none() {
        run_rivals(sim, &mut events);
    }

    sim.state.tick += 1;
    events
}

fn expire_golden_age(sim: &mut Simulation, events: &mut Vec<SimulationEvent>) {
    let now = sim.state.tick;
    if sim.state.golden_age.is_some_and(|g| !g.is_active(now)) {
        sim.state.golden_age = None;
        sim.state.log(LogKind::Game, "The Golden Age has come to an end.");
        events.push(SimulationEvent::GoldenAgeEnded);
    }
}

fn reconcile_workers(sim: &mut Simulation, events: &mut Vec<SimulationEvent>) {
    let state = &mut sim.state;
    let released = reconcile_deficit(&state.resources, &mut state.buildings);
    if released > 0 {
        state.log(
            LogKind::Warning,
            format!("Not enough people: {} workers left their posts.", released),
        );
        events.push(SimulationEvent::WorkersReleased { count: released });
    }
}

fn run_production(sim: &mut Simulation, events: &mut Vec<SimulationEvent>) {
    let factor = sim.state.global_factor();
    let deltas = calculate_production(&sim.state.buildings, factor);
    deltas.apply(&mut sim.state.resources);
    tracing::debug!(
        tick = sim.state.tick,
        gold = deltas.gold,
        science = deltas.science,
        population = deltas.population,
        "Production applied"
    );
    events.push(SimulationEvent::Produced(deltas));
}

fn run_depletion(sim: &mut Simulation, events: &mut Vec<SimulationEvent>) {
    let lost = roll_depletion(&mut sim.state.buildings, &mut sim.rng);
    for d in lost {
        let def = sim.state.buildings.definition(d.building_idx);
        let (id, name) = (def.id.clone(), def.name.clone());
        sim.state.log(
            LogKind::Warning,
            format!("A {} has been exhausted and abandoned.", name),
        );
        events.push(SimulationEvent::BuildingDepleted {
            building_id: id,
            remaining: d.remaining,
        });
    }
}

fn check_era(sim: &mut Simulation, events: &mut Vec<SimulationEvent>) {
    let Some(era) = next_era_reached(sim.state.era, &sim.state.resources) else {
        return;
    };

    let land_bonus = era_land_bonus(era);
    sim.state.era = era;
    sim.state.resources.max_land += land_bonus;
    for rival in &mut sim.state.rivals {
        rival.era = era;
    }
    sim.state.overlay = match sim.config.era_transition_ticks {
        0 => Overlay::None,
        remaining => Overlay::EraTransition { era, remaining },
    };

    tracing::info!(tick = sim.state.tick, %era, land_bonus, "Era transition");
    sim.state.log(
        LogKind::Game,
        format!("A new era dawns: the {}! (+{} max land)", era, land_bonus),
    );
    sim.request_narrative(NarrativeRequest::EraTransition(era));
    events.push(SimulationEvent::EraReached { era, land_bonus });
}

fn draw_crisis(sim: &mut Simulation, events: &mut Vec<SimulationEvent>) {
    let Some(crisis) = roll_crisis(&sim.crises, sim.state.era, &mut sim.rng) else {
        return;
    };

    sim.state.log(
        LogKind::Crisis,
        format!("CRISIS: {}! {}", crisis.name, crisis.description),
    );
    events.push(SimulationEvent::CrisisStarted {
        crisis_id: crisis.id.clone(),
    });
    sim.state.active_crisis = Some(crisis);
}

fn run_rivals(sim: &mut Simulation, events: &mut Vec<SimulationEvent>) {
    let factor = sim.state.global_factor();
    let state = &mut sim.state;
    let (roster, research, techs) = (&state.buildings, &state.research, &sim.techs);

    let raids = rival_step(
        &mut state.resources,
        &mut state.rivals,
        |resources| military_strength(resources, roster, research, techs, factor),
        &mut sim.rng,
    );

    for report in raids {
        let text = if report.predatory {
            format!(
                "{} sensed weakness and raided us! Lost {} gold, {} soldiers and {} land.",
                report.rival_name, report.gold_stolen, report.soldiers_killed, report.land_lost
            )
        } else {
            format!(
                "{} launched a raid! Lost {} gold, {} soldiers and {} land.",
                report.rival_name, report.gold_stolen, report.soldiers_killed, report.land_lost
            )
        };
        sim.state.log(LogKind::War, text);
        events.push(SimulationEvent::Raided(report));
    }
}

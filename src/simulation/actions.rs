//! Player actions on the simulation
//!
//! Every action either applies completely or returns a [`Rejection`] and
//! leaves the state untouched. Rejections are also written to the log as
//! warnings so a driver only has to show the log.

use crate::city::construction::{construct, Constructed};
use crate::city::workforce::assign_workers;
use crate::core::error::Rejection;
use crate::diplomacy::military::recruit;
use crate::diplomacy::rival::{Relation, RivalId};
use crate::diplomacy::trade::{gift, trade};
use crate::diplomacy::warfare::{attack, AttackOutcome, AttackReport};
use crate::llm::context::EmpireContext;
use crate::llm::narrator::NarrativeRequest;
use crate::research::future::research_future;
use crate::research::technology::{research, Researched};
use crate::simulation::crisis;
use crate::simulation::era::Overlay;
use crate::simulation::events::LogKind;
use crate::simulation::projects::{self, Gathered, GoldenAge};
use crate::simulation::state::Simulation;

impl Simulation {
    /// Log a rejection as a warning and pass the result through
    fn checked<T>(&mut self, result: Result<T, Rejection>) -> Result<T, Rejection> {
        if let Err(reason) = &result {
            self.state.log(LogKind::Warning, reason.to_string());
        }
        result
    }

    fn rival_index(&self, id: RivalId) -> Result<usize, Rejection> {
        self.state
            .rivals
            .iter()
            .position(|r| r.id == id)
            .ok_or(Rejection::UnknownRival(id.0))
    }

    // === CITY ===

    pub fn construct(&mut self, building_id: &str) -> Result<Constructed, Rejection> {
        let state = &mut self.state;
        let result = construct(
            &mut state.resources,
            &mut state.buildings,
            &state.research,
            state.era,
            building_id,
        );
        let built = self.checked(result)?;

        let name = self.state.buildings.definition(built.index).name.clone();
        self.state.log(
            LogKind::Game,
            format!("Built a {} for {} gold.", name, built.gold_spent),
        );
        Ok(built)
    }

    /// Move workers on (positive) or off (negative) a building type
    ///
    /// Only a shortage of idle workers is worth a warning; the other
    /// rejections are plain input errors.
    pub fn assign_workers(&mut self, building_id: &str, delta: i64) -> Result<u32, Rejection> {
        let state = &mut self.state;
        let result = assign_workers(&state.resources, &mut state.buildings, building_id, delta);
        if let Err(reason @ Rejection::InsufficientIdleWorkers { .. }) = &result {
            state.log(LogKind::Warning, reason.to_string());
        }
        result
    }

    /// One gold by hand, with a chance of land and science
    pub fn gather(&mut self) -> Gathered {
        let found = projects::gather(&mut self.state.resources, &mut self.rng);
        if found.land_explored {
            self.state.log(LogKind::Game, "Scouts found new land beyond the border.");
        }
        found
    }

    pub fn expand_land(&mut self) -> Result<f64, Rejection> {
        let result = projects::expand_land(&mut self.state.resources);
        let spent = self.checked(result)?;
        self.state.log(
            LogKind::Game,
            format!("Purchased new territory for {} gold.", spent),
        );
        Ok(spent)
    }

    // === RESEARCH ===

    pub fn research(&mut self, tech_id: &str) -> Result<Researched, Rejection> {
        let state = &mut self.state;
        let result = research(
            &mut state.resources,
            &mut state.research,
            &self.techs,
            state.era,
            tech_id,
        );
        let done = self.checked(result)?;

        let text = match done.max_land_bonus {
            Some(land) => format!("Discovered {}! (+{} max land)", done.name, land),
            None => format!("Discovered {}!", done.name),
        };
        self.state.log(LogKind::Tech, text);
        Ok(done)
    }

    pub fn research_future(&mut self) -> Result<u32, Rejection> {
        let state = &mut self.state;
        let result = research_future(&mut state.resources, &mut state.research, state.era);
        let level = self.checked(result)?;
        self.state
            .log(LogKind::Tech, format!("Future technology level {} reached.", level));
        Ok(level)
    }

    // === DIPLOMACY ===

    pub fn recruit(&mut self, amount: u32) -> Result<u32, Rejection> {
        let result = recruit(&mut self.state.resources, amount);
        let soldiers = self.checked(result)?;
        self.state.log(
            LogKind::Game,
            format!("Recruited {} soldiers. The army now counts {}.", amount, soldiers),
        );
        Ok(soldiers)
    }

    pub fn attack(&mut self, rival: RivalId) -> Result<AttackReport, Rejection> {
        let index = self.rival_index(rival);
        let index = self.checked(index)?;
        let mine = self.military_strength();

        let state = &mut self.state;
        let result = attack(
            &mut state.resources,
            &mut state.rivals[index],
            mine,
            state.tick,
            &mut self.rng,
        );
        let report = self.checked(result)?;

        let name = self.state.rivals[index].name.clone();
        if report.declared_war {
            self.state
                .log(LogKind::War, format!("We declared war on {}!", name));
        }
        let text = match &report.outcome {
            AttackOutcome::Victory {
                loot, land_gained, ..
            } => format!(
                "Victory over {}! Looted {} gold and gained {} land.",
                name, loot, land_gained
            ),
            AttackOutcome::Defeat { soldiers_lost } => {
                format!("Our army was beaten by {}. {} soldiers fell.", name, soldiers_lost)
            }
        };
        self.state.log(LogKind::War, text);
        Ok(report)
    }

    /// Trade gold for science. Returns the science gained.
    pub fn trade(&mut self, rival: RivalId) -> Result<f64, Rejection> {
        let index = self.rival_index(rival);
        let index = self.checked(index)?;

        let state = &mut self.state;
        let result = trade(&mut state.resources, &mut state.rivals[index], &mut self.rng);
        let science = self.checked(result)?;

        let name = self.state.rivals[index].name.clone();
        self.state.log(
            LogKind::Game,
            format!("Traded with {}: +{} science.", name, science),
        );
        Ok(science)
    }

    pub fn gift(&mut self, rival: RivalId) -> Result<Relation, Rejection> {
        let index = self.rival_index(rival);
        let index = self.checked(index)?;

        let state = &mut self.state;
        let result = gift(&mut state.resources, &mut state.rivals[index]);
        let relation = self.checked(result)?;

        let name = self.state.rivals[index].name.clone();
        self.state.log(
            LogKind::Game,
            format!("Sent gifts to {}. Relations are now {}.", name, relation.name()),
        );
        Ok(relation)
    }

    // === IMPERIAL PROJECTS ===

    pub fn start_golden_age(&mut self) -> Result<GoldenAge, Rejection> {
        let state = &mut self.state;
        let result =
            projects::start_golden_age(&mut state.resources, state.golden_age.as_ref(), state.tick);
        let golden = self.checked(result)?;

        self.state.golden_age = Some(golden);
        self.state
            .log(LogKind::Game, "A Golden Age begins! Production and strength are doubled.");
        Ok(golden)
    }

    pub fn hold_festival(&mut self) -> Result<f64, Rejection> {
        let result = projects::hold_festival(&mut self.state.resources);
        let spent = self.checked(result)?;
        self.state.log(
            LogKind::Game,
            format!("A great festival for {} gold draws new settlers.", spent),
        );
        Ok(spent)
    }

    pub fn science_grant(&mut self) -> Result<f64, Rejection> {
        let result = projects::science_grant(&mut self.state.resources);
        let spent = self.checked(result)?;
        self.state
            .log(LogKind::Tech, "The scholars received a grand endowment.");
        Ok(spent)
    }

    pub fn reclaim_land(&mut self) -> Result<f64, Rejection> {
        let result = projects::reclaim_land(&mut self.state.resources);
        let spent = self.checked(result)?;
        self.state
            .log(LogKind::Game, "Marshes were drained and new land reclaimed.");
        Ok(spent)
    }

    // === CRISIS ===

    /// Pay the active crisis off in full
    pub fn solve_crisis(&mut self) -> Result<(), Rejection> {
        let result = self
            .state
            .active_crisis
            .clone()
            .ok_or(Rejection::NoActiveCrisis)
            .and_then(|c| crisis::solve(&mut self.state.resources, &c).map(|()| c));
        let solved = self.checked(result)?;

        self.state.active_crisis = None;
        self.state
            .log(LogKind::Crisis, format!("Crisis resolved: {}.", solved.name));
        self.request_narrative(NarrativeRequest::CrisisLog {
            crisis: solved,
            solved: true,
        });
        Ok(())
    }

    /// Let the active crisis run its course and take the penalties
    pub fn ignore_crisis(&mut self) -> Result<(), Rejection> {
        let result = self.state.active_crisis.take().ok_or(Rejection::NoActiveCrisis);
        let ignored = self.checked(result)?;

        crisis::ignore(&mut self.state.resources, &ignored);
        self.state.log(
            LogKind::Crisis,
            format!("The {} was ignored and took its toll.", ignored.name),
        );
        self.request_narrative(NarrativeRequest::CrisisLog {
            crisis: ignored,
            solved: false,
        });
        Ok(())
    }

    // === PRESENTATION ===

    /// Close the era announcement early. Returns whether one was showing.
    pub fn dismiss_overlay(&mut self) -> bool {
        let was_showing = self.state.overlay.is_blocking();
        self.state.overlay = Overlay::None;
        was_showing
    }

    pub fn empire_context(&self) -> EmpireContext {
        EmpireContext::from_state(&self.state)
    }

    pub fn request_chronicle(&mut self) {
        let context = self.empire_context();
        self.request_narrative(NarrativeRequest::Chronicle(context));
    }

    pub fn request_snapshot(&mut self) {
        let context = self.empire_context();
        let style = self.state.dominant_style();
        self.request_narrative(NarrativeRequest::EmpireSnapshot { context, style });
    }

    pub fn share_text(&self) -> String {
        self.empire_context().share_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::Era;

    fn sim() -> Simulation {
        Simulation::new(SimulationConfig::default())
    }

    #[test]
    fn test_rejected_construct_logs_warning_only() {
        let mut sim = sim();
        let before = sim.state.resources.clone();

        let result = sim.construct("tent");

        assert!(matches!(result, Err(Rejection::InsufficientGold { .. })));
        assert_eq!(sim.state.resources, before);
        assert_eq!(sim.state.buildings.counts[0], 0);
        assert_eq!(sim.state.log.last().map(|e| e.kind), Some(LogKind::Warning));
    }

    #[test]
    fn test_construct_logs_game_entry() {
        let mut sim = sim();
        sim.state.resources.gold = 10.0;

        let built = sim.construct("tent").unwrap();
        assert_eq!(built.gold_spent, 10.0);
        assert_eq!(sim.state.resources.land, 2);
        assert_eq!(sim.state.log.last().map(|e| e.kind), Some(LogKind::Game));
    }

    #[test]
    fn test_unknown_rival_rejected() {
        let mut sim = sim();
        sim.state.resources.gold = 1000.0;
        assert_eq!(sim.trade(RivalId(99)), Err(Rejection::UnknownRival(99)));
        assert_eq!(sim.state.resources.gold, 1000.0);
    }

    #[test]
    fn test_attack_declares_war() {
        let mut sim = sim();
        let id = sim.state.rivals[0].id;
        let was_at_war = sim.state.rivals[0].relation == Relation::War;

        let report = sim.attack(id).unwrap();
        assert_eq!(sim.state.rivals[0].relation, Relation::War);
        assert_eq!(report.declared_war, !was_at_war);
        assert!(sim.state.log.of_kind(LogKind::War).count() >= 1);
    }

    #[test]
    fn test_solve_crisis_pays_and_clears() {
        let mut sim = sim();
        sim.state.active_crisis = sim.crises.get("storm").cloned();
        sim.state.resources.gold = 50.0;

        sim.solve_crisis().unwrap();

        assert_eq!(sim.state.resources.gold, 45.0);
        assert!(sim.state.active_crisis.is_none());
        let requests = sim.drain_narrative_requests();
        assert!(matches!(
            requests.as_slice(),
            [NarrativeRequest::CrisisLog { solved: true, .. }]
        ));
    }

    #[test]
    fn test_unaffordable_crisis_stays_active() {
        let mut sim = sim();
        sim.state.active_crisis = sim.crises.get("wild_beasts").cloned();
        sim.state.resources.gold = 50.0;

        assert_eq!(sim.solve_crisis(), Err(Rejection::CrisisUnaffordable));
        assert!(sim.state.active_crisis.is_some());
        assert_eq!(sim.state.resources.gold, 50.0);
        assert!(sim.drain_narrative_requests().is_empty());
    }

    #[test]
    fn test_ignore_crisis_clamps_penalty() {
        let mut sim = sim();
        sim.state.active_crisis = sim.crises.get("storm").cloned();
        sim.state.resources.gold = 5.0;

        sim.ignore_crisis().unwrap();

        assert_eq!(sim.state.resources.gold, 0.0);
        assert!(sim.state.active_crisis.is_none());
        assert_eq!(sim.drain_narrative_requests().len(), 1);
    }

    #[test]
    fn test_crisis_actions_without_crisis() {
        let mut sim = sim();
        assert_eq!(sim.solve_crisis(), Err(Rejection::NoActiveCrisis));
        assert_eq!(sim.ignore_crisis(), Err(Rejection::NoActiveCrisis));
    }

    #[test]
    fn test_golden_age_doubles_strength() {
        let mut sim = sim();
        sim.state.resources.gold = 2000.0;
        sim.state.resources.soldiers = 10;
        let before = sim.military_strength();

        sim.start_golden_age().unwrap();

        assert_eq!(sim.military_strength(), before * 2.0);
        assert_eq!(sim.start_golden_age(), Err(Rejection::ModifierActive));
    }

    #[test]
    fn test_dismiss_overlay() {
        let mut sim = sim();
        assert!(!sim.dismiss_overlay());
        sim.state.overlay = Overlay::EraTransition {
            era: Era::Agricultural,
            remaining: 3,
        };
        assert!(sim.dismiss_overlay());
        assert_eq!(sim.state.overlay, Overlay::None);
    }

    #[test]
    fn test_snapshot_request_carries_style() {
        let mut sim = sim();
        sim.request_snapshot();
        sim.request_chronicle();
        let requests = sim.drain_narrative_requests();
        assert_eq!(requests.len(), 2);
        assert!(matches!(requests[0], NarrativeRequest::EmpireSnapshot { .. }));
    }
}

//! Gather empire context for narrator prompts
//!
//! Builds a compact summary of the simulation that the narrator can turn
//! into chronicle text or an image prompt.

use serde::{Deserialize, Serialize};

use crate::core::types::{BuildingStyle, Climate, Era, Tick};
use crate::simulation::state::SimulationState;

/// Snapshot of the empire for narration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpireContext {
    pub era: Era,
    pub climate: Climate,
    pub tick: Tick,
    pub population: u32,
    /// People assigned to buildings
    pub employed: u32,
    /// Unassigned people, negative while a deficit is pending
    pub idle: i64,
    pub gold: f64,
    pub land: u32,
    pub max_land: u32,
    pub science: f64,
    pub soldiers: u32,
    /// Built buildings as (name, count), registry order
    pub buildings: Vec<(String, u32)>,
    pub technologies: Vec<String>,
    pub dominant_style: BuildingStyle,
    pub largest_building: Option<String>,
}

impl EmpireContext {
    pub fn from_state(state: &SimulationState) -> Self {
        let roster = &state.buildings;
        let buildings = roster
            .iter_built()
            .map(|i| (roster.definition(i).name.clone(), roster.counts[i]))
            .collect();

        Self {
            era: state.era,
            climate: state.climate,
            tick: state.tick,
            population: state.resources.workforce(),
            employed: roster.total_assigned(),
            idle: state.idle_workers(),
            gold: state.resources.gold,
            land: state.resources.land,
            max_land: state.resources.max_land,
            science: state.resources.science,
            soldiers: state.resources.soldiers,
            buildings,
            technologies: state.research.unlocked.clone(),
            dominant_style: roster.dominant_style(),
            largest_building: roster.largest().map(|d| d.name.clone()),
        }
    }

    /// Comma-separated "name (count)" list, or a fallback for an empty city
    pub fn building_list(&self) -> String {
        if self.buildings.is_empty() {
            return "a small settlement".into();
        }
        self.buildings
            .iter()
            .map(|(name, count)| format!("{} ({})", name, count))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Text summary for narrator prompts
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str(&format!("Era: {}\n", self.era));
        s.push_str(&format!("Climate: {}\n", self.climate));
        s.push_str(&format!(
            "Population: {} (employed: {}, idle: {})\n",
            self.population, self.employed, self.idle
        ));
        s.push_str(&format!("Gold: {}\n", self.gold.floor()));
        s.push_str(&format!("Land: {} / {}\n", self.land, self.max_land));
        s.push_str(&format!("Buildings: {}\n", self.building_list()));

        if !self.technologies.is_empty() {
            s.push_str(&format!("Technologies: {}\n", self.technologies.join(", ")));
        }

        s
    }

    /// Shareable status report of the empire
    pub fn share_text(&self) -> String {
        format!(
            "CIVILIZATION STATUS REPORT\n\
             Era: {}\n\
             Climate: {}\n\
             Population: {}\n\
             Treasury: {} gold\n\
             Largest building: {}\n\n\
             My empire is rising! How is yours doing?",
            self.era,
            self.climate,
            self.population,
            self.gold.floor(),
            self.largest_building.as_deref().unwrap_or("None"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::simulation::state::Simulation;

    #[test]
    fn test_context_of_new_game() {
        let sim = Simulation::new(SimulationConfig::default());
        let ctx = EmpireContext::from_state(&sim.state);

        assert_eq!(ctx.population, 5);
        assert_eq!(ctx.idle, 5);
        assert_eq!(ctx.building_list(), "a small settlement");
        assert_eq!(ctx.dominant_style, BuildingStyle::None);
        assert!(ctx.share_text().contains("Largest building: None"));
    }

    #[test]
    fn test_summary_lists_buildings() {
        let mut sim = Simulation::new(SimulationConfig::default());
        sim.state.buildings.counts[0] = 3;
        sim.state.resources.gold = 1234.7;

        let ctx = EmpireContext::from_state(&sim.state);
        assert!(ctx.summary().contains("Hide Tent (3)"));
        assert!(ctx.share_text().contains("Treasury: 1234 gold"));
        assert_eq!(ctx.largest_building.as_deref(), Some("Hide Tent"));
    }
}

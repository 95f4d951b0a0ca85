//! Production calculator - per-tick resource deltas from staffed buildings
//!
//! Everything here is a pure function of the roster and the active global
//! multiplier. Calling it twice on the same state yields the same deltas.
//!
//! - Effective units are fractional: a half-staffed instance produces half
//! - Gold and science scale with `1.05^count` once a type has two instances
//! - Population scales with `1.02^count` for every count
//! - The Golden Age factor multiplies the three totals once

use serde::{Deserialize, Serialize};

use crate::city::building::BuildingRoster;
use crate::city::stockpile::Resources;
use crate::core::config::{
    BASE_POPULATION_GROWTH, GOLD_EFFICIENCY_BASE, POPULATION_EFFICIENCY_BASE,
};

/// Resource change produced by one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionDeltas {
    /// Net gold, negative when upkeep outweighs income
    pub gold: f64,
    pub science: f64,
    pub population: f64,
}

impl ProductionDeltas {
    /// Add the deltas to the ledger, flooring gold and science at zero
    pub fn apply(&self, resources: &mut Resources) {
        resources.gold = (resources.gold + self.gold).max(0.0);
        resources.science = (resources.science + self.science).max(0.0);
        resources.population = (resources.population + self.population).max(0.0);
    }
}

/// Per-building share of the tick's production
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingYield {
    pub building_idx: usize,
    pub effective_units: f64,
    pub gold: f64,
    pub science: f64,
    pub population: f64,
}

/// Gold and science concentration bonus
pub fn efficiency_multiplier(count: u32) -> f64 {
    if count <= 1 {
        1.0
    } else {
        GOLD_EFFICIENCY_BASE.powi(count as i32)
    }
}

/// Population concentration bonus, applied from the first instance
pub fn population_multiplier(count: u32) -> f64 {
    POPULATION_EFFICIENCY_BASE.powi(count as i32)
}

/// Unscaled yield of every built slot, in registry order
pub fn building_yields(roster: &BuildingRoster) -> Vec<BuildingYield> {
    roster
        .iter_built()
        .map(|i| {
            let def = roster.definition(i);
            let count = roster.counts[i];
            let eff = roster.effective_units(i);
            let m = efficiency_multiplier(count);
            BuildingYield {
                building_idx: i,
                effective_units: eff,
                gold: def.production.gold * eff * m,
                science: def.production.science * eff * m,
                population: def.production.population * eff * population_multiplier(count),
            }
        })
        .collect()
}

/// Compute the deltas of one production tick
///
/// `global_factor` is the Golden Age multiplier, 1.0 when none is active.
pub fn calculate_production(roster: &BuildingRoster, global_factor: f64) -> ProductionDeltas {
    let mut deltas = ProductionDeltas {
        gold: 0.0,
        science: 0.0,
        population: BASE_POPULATION_GROWTH,
    };

    for y in building_yields(roster) {
        deltas.gold += y.gold;
        deltas.science += y.science;
        deltas.population += y.population;
    }

    deltas.gold *= global_factor;
    deltas.science *= global_factor;
    deltas.population *= global_factor;
    deltas
}

/// Military output of the staffed buildings, no multipliers
pub fn building_military(roster: &BuildingRoster) -> f64 {
    roster
        .iter_built()
        .map(|i| roster.definition(i).production.military * roster.effective_units(i))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::{BaseCost, BuildingDefinition, Production};
    use crate::core::types::{BuildingStyle, Era};

    fn single(workers: u32, production: Production) -> BuildingRoster {
        BuildingRoster::new(vec![BuildingDefinition {
            id: "b".into(),
            name: "B".into(),
            description: String::new(),
            era: Era::Tribal,
            base_cost: BaseCost {
                gold: 10.0,
                land: 1,
                workers,
            },
            production,
            depletion_chance: None,
            style: BuildingStyle::None,
            required_tech: None,
        }])
    }

    #[test]
    fn test_fully_staffed_concentration() {
        let mut roster = single(
            5,
            Production {
                gold: 5.0,
                ..Default::default()
            },
        );
        roster.counts[0] = 10;
        roster.assigned_workers[0] = 50;

        let deltas = calculate_production(&roster, 1.0);

        // 5 * 10 * 1.05^10
        assert!((deltas.gold - 81.444).abs() < 0.01, "got {}", deltas.gold);
        assert_eq!(deltas.population, BASE_POPULATION_GROWTH);
    }

    #[test]
    fn test_half_staffed_produces_half() {
        let mut roster = single(
            4,
            Production {
                science: 2.0,
                ..Default::default()
            },
        );
        roster.counts[0] = 1;
        roster.assigned_workers[0] = 2;

        let deltas = calculate_production(&roster, 1.0);
        assert_eq!(deltas.science, 1.0);
    }

    #[test]
    fn test_population_multiplier_has_no_single_instance_guard() {
        let mut roster = single(
            0,
            Production {
                population: 0.5,
                ..Default::default()
            },
        );
        roster.counts[0] = 1;

        let deltas = calculate_production(&roster, 1.0);
        assert!((deltas.population - (0.01 + 0.5 * 1.02)).abs() < 1e-12);
        assert_eq!(efficiency_multiplier(1), 1.0);
    }

    #[test]
    fn test_golden_age_applied_once_to_totals() {
        let mut roster = single(
            0,
            Production {
                gold: 3.0,
                population: 0.1,
                ..Default::default()
            },
        );
        roster.counts[0] = 1;

        let normal = calculate_production(&roster, 1.0);
        let golden = calculate_production(&roster, 2.0);
        assert_eq!(golden.gold, normal.gold * 2.0);
        assert_eq!(golden.population, normal.population * 2.0);
    }

    #[test]
    fn test_calculation_is_idempotent() {
        let mut roster = BuildingRoster::with_defaults();
        roster.counts[1] = 3;
        roster.assigned_workers[1] = 2;
        roster.counts[0] = 4;

        assert_eq!(
            calculate_production(&roster, 1.0),
            calculate_production(&roster, 1.0)
        );
    }

    #[test]
    fn test_upkeep_cannot_drive_gold_negative() {
        let mut resources = Resources::initial();
        resources.gold = 1.0;
        let deltas = ProductionDeltas {
            gold: -4.0,
            science: 0.0,
            population: 0.01,
        };

        deltas.apply(&mut resources);
        assert_eq!(resources.gold, 0.0);
        assert!((resources.population - 5.01).abs() < 1e-9);
    }

    #[test]
    fn test_unstaffed_building_yields_nothing() {
        let mut roster = single(
            2,
            Production {
                gold: 10.0,
                military: 4.0,
                ..Default::default()
            },
        );
        roster.counts[0] = 3;

        assert_eq!(calculate_production(&roster, 1.0).gold, 0.0);
        assert_eq!(building_military(&roster), 0.0);

        roster.assigned_workers[0] = 3;
        assert_eq!(building_military(&roster), 6.0);
    }
}

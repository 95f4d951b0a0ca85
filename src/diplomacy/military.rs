//! Military strength and recruitment

use crate::city::building::BuildingRoster;
use crate::city::production::building_military;
use crate::city::stockpile::Resources;
use crate::core::config::{DEFENSELESS_STRENGTH, RECRUIT_GOLD_COST, STRENGTH_PER_SOLDIER};
use crate::core::error::Rejection;
use crate::research::future::future_military_multiplier;
use crate::research::technology::{ResearchState, TechCatalog};

/// Population consumed per recruited soldier
pub const RECRUIT_POPULATION_COST: f64 = 1.0;

/// Current military strength, recomputed on every call
///
/// An empire without soldiers is defenseless: buildings and technology do
/// not count until at least one soldier is under arms.
pub fn military_strength(
    resources: &Resources,
    roster: &BuildingRoster,
    research: &ResearchState,
    techs: &TechCatalog,
    global_factor: f64,
) -> f64 {
    if resources.soldiers == 0 {
        return DEFENSELESS_STRENGTH;
    }

    let base = resources.soldiers as f64 * STRENGTH_PER_SOLDIER
        + building_military(roster)
        + research.military_bonus(techs);

    base * future_military_multiplier(research.future_level) * global_factor
}

/// Turn gold and population into soldiers, all or nothing
pub fn recruit(resources: &mut Resources, amount: u32) -> Result<u32, Rejection> {
    let gold = RECRUIT_GOLD_COST * amount as f64;
    let population = RECRUIT_POPULATION_COST * amount as f64;

    if resources.gold < gold {
        return Err(Rejection::InsufficientGold {
            needed: gold,
            available: resources.gold,
        });
    }
    if resources.population < population {
        return Err(Rejection::InsufficientPopulation {
            needed: population,
            available: resources.population,
        });
    }

    resources.spend_gold(gold);
    resources.spend_population(population);
    resources.soldiers += amount;
    Ok(resources.soldiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defenseless_floor_ignores_bonuses() {
        let techs = TechCatalog::with_defaults();
        let research = ResearchState {
            unlocked: vec!["masonry".into(), "bronze_working".into()],
            future_level: 3,
        };
        let mut roster = BuildingRoster::with_defaults();
        let barracks = roster.index_of("barracks").unwrap();
        roster.counts[barracks] = 2;
        roster.assigned_workers[barracks] = 20;

        let strength = military_strength(&Resources::initial(), &roster, &research, &techs, 2.0);
        assert_eq!(strength, 5.0);
    }

    #[test]
    fn test_strength_formula() {
        let techs = TechCatalog::with_defaults();
        let research = ResearchState {
            unlocked: vec!["masonry".into()],
            future_level: 2,
        };
        let mut roster = BuildingRoster::with_defaults();
        let barracks = roster.index_of("barracks").unwrap();
        roster.counts[barracks] = 1;
        roster.assigned_workers[barracks] = 5; // half staffed: 2.5 military

        let resources = Resources {
            soldiers: 10,
            ..Resources::initial()
        };

        // (20 + 2.5 + 10) * 1.1 * 2
        let strength = military_strength(&resources, &roster, &research, &techs, 2.0);
        assert!((strength - 71.5).abs() < 1e-9, "got {}", strength);
    }

    #[test]
    fn test_recruit_all_or_nothing() {
        let mut resources = Resources {
            gold: 120.0,
            ..Resources::initial()
        };

        assert!(matches!(
            recruit(&mut resources, 3),
            Err(Rejection::InsufficientGold { .. })
        ));
        assert_eq!(resources.soldiers, 0);
        assert_eq!(resources.gold, 120.0);

        assert_eq!(recruit(&mut resources, 2), Ok(2));
        assert_eq!(resources.gold, 20.0);
        assert_eq!(resources.population, 3.0);
    }

    #[test]
    fn test_recruit_needs_population() {
        let mut resources = Resources {
            gold: 10_000.0,
            ..Resources::initial()
        };
        assert!(matches!(
            recruit(&mut resources, 6),
            Err(Rejection::InsufficientPopulation { .. })
        ));
    }
}

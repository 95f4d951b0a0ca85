//! Crisis engine - random disasters the player must pay for or suffer
//!
//! State machine: no crisis -> active -> no crisis. At most one crisis is
//! active at a time and the draw only runs while none is.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::city::stockpile::Resources;
use crate::core::error::Rejection;
use crate::core::types::Era;

/// Per-tick chance of a crisis once past the Tribal era
pub const CRISIS_CHANCE: f64 = 0.005;

/// Price of solving a crisis. Every field must be affordable at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrisisCost {
    pub gold: Option<f64>,
    pub population: Option<f64>,
    pub science: Option<f64>,
    pub soldiers: Option<u32>,
}

/// Damage done by ignoring a crisis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrisisPenalty {
    pub gold: Option<f64>,
    pub population: Option<f64>,
    pub land: Option<u32>,
    pub science: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crisis {
    pub id: String,
    pub name: String,
    pub description: String,
    pub era: Era,
    pub cost: CrisisCost,
    pub penalty: CrisisPenalty,
}

fn crisis(
    id: &str,
    name: &str,
    description: &str,
    era: Era,
    cost: CrisisCost,
    penalty: CrisisPenalty,
) -> Crisis {
    Crisis {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        era,
        cost,
        penalty,
    }
}

/// The crisis templates
#[derive(Debug, Clone, Default)]
pub struct CrisisCatalog {
    crises: Vec<Crisis>,
}

impl CrisisCatalog {
    pub fn new(crises: Vec<Crisis>) -> Self {
        Self { crises }
    }

    pub fn with_defaults() -> Self {
        use Era::{Agricultural, Industrial, Technological, Tribal};

        let gold = |g: f64| CrisisCost {
            gold: Some(g),
            ..Default::default()
        };
        let science = |s: f64| CrisisCost {
            science: Some(s),
            ..Default::default()
        };
        let lose_pop = |p: f64| CrisisPenalty {
            population: Some(p),
            ..Default::default()
        };

        Self::new(vec![
            crisis("wild_beasts", "Wild Beast Attack",
                "Wolf packs circle the village. Organise the hunters or the people will suffer.",
                Tribal,
                CrisisCost { gold: Some(10.0), soldiers: Some(1), ..Default::default() },
                lose_pop(2.0)),
            crisis("storm", "Violent Storm",
                "Our shelters are in danger. Materials are needed for repairs.",
                Tribal, gold(5.0),
                CrisisPenalty { gold: Some(20.0), ..Default::default() }),
            crisis("drought", "Drought",
                "The crops are withering. We must buy water and grain from neighbouring tribes.",
                Agricultural, gold(100.0), lose_pop(5.0)),
            crisis("plague", "Plague",
                "An unknown disease is spreading. The healers are helpless.",
                Agricultural, science(50.0), lose_pop(8.0)),
            crisis("strike", "Workers' Strike",
                "Working conditions are too harsh. The workers demand a raise.",
                Industrial, gold(500.0), lose_pop(10.0)),
            crisis("pollution", "Toxic Waste Spill",
                "The factories poisoned the river. Without a cleanup, disease will spread.",
                Industrial, gold(300.0), lose_pop(15.0)),
            crisis("cyber_attack", "Cyber Attack",
                "The banking systems were hacked. Strengthen the firewall.",
                Technological, gold(2000.0),
                CrisisPenalty { gold: Some(10_000.0), ..Default::default() }),
            crisis("data_leak", "Data Leak",
                "Secret research has been stolen.",
                Technological, science(1000.0),
                CrisisPenalty { science: Some(5000.0), ..Default::default() }),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&Crisis> {
        self.crises.iter().find(|c| c.id == id)
    }

    pub fn for_era(&self, era: Era) -> Vec<&Crisis> {
        self.crises.iter().filter(|c| c.era == era).collect()
    }

    pub fn len(&self) -> usize {
        self.crises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crises.is_empty()
    }
}

/// Draw for a new crisis
///
/// Nothing can trigger in the Tribal era. The chance roll is always taken
/// outside it, so the random stream does not depend on the catalog.
pub fn roll_crisis(catalog: &CrisisCatalog, era: Era, rng: &mut impl Rng) -> Option<Crisis> {
    if era == Era::Tribal {
        return None;
    }
    if rng.gen::<f64>() >= CRISIS_CHANCE {
        return None;
    }
    catalog.for_era(era).choose(rng).map(|c| (*c).clone())
}

/// Whether every cost of a crisis can be paid right now
pub fn can_afford(resources: &Resources, cost: &CrisisCost) -> bool {
    resources.gold >= cost.gold.unwrap_or(0.0)
        && resources.population >= cost.population.unwrap_or(0.0)
        && resources.science >= cost.science.unwrap_or(0.0)
        && resources.soldiers >= cost.soldiers.unwrap_or(0)
}

/// Pay the full cost of a crisis, or change nothing
pub fn solve(resources: &mut Resources, crisis: &Crisis) -> Result<(), Rejection> {
    if !can_afford(resources, &crisis.cost) {
        return Err(Rejection::CrisisUnaffordable);
    }

    let cost = &crisis.cost;
    resources.spend_gold(cost.gold.unwrap_or(0.0));
    resources.spend_population(cost.population.unwrap_or(0.0));
    resources.spend_science(cost.science.unwrap_or(0.0));
    resources.soldiers -= cost.soldiers.unwrap_or(0);
    Ok(())
}

/// Suffer every penalty of a crisis, each floored at zero
pub fn ignore(resources: &mut Resources, crisis: &Crisis) {
    let penalty = &crisis.penalty;
    if let Some(gold) = penalty.gold {
        resources.spend_gold(gold);
    }
    if let Some(population) = penalty.population {
        resources.spend_population(population);
    }
    if let Some(land) = penalty.land {
        resources.release_land(land);
    }
    if let Some(science) = penalty.science {
        resources.spend_science(science);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_catalog_covers_every_era() {
        let catalog = CrisisCatalog::with_defaults();
        assert_eq!(catalog.len(), 8);
        for era in Era::ALL {
            assert_eq!(catalog.for_era(era).len(), 2);
        }
    }

    #[test]
    fn test_no_crisis_in_tribal_era() {
        let catalog = CrisisCatalog::with_defaults();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..10_000 {
            assert!(roll_crisis(&catalog, Era::Tribal, &mut rng).is_none());
        }
    }

    #[test]
    fn test_drawn_crisis_matches_era() {
        let catalog = CrisisCatalog::with_defaults();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut drawn = 0;
        for _ in 0..10_000 {
            if let Some(c) = roll_crisis(&catalog, Era::Industrial, &mut rng) {
                assert_eq!(c.era, Era::Industrial);
                drawn += 1;
            }
        }
        assert!(drawn > 0, "0.5% over 10000 draws should trigger");
    }

    #[test]
    fn test_ignore_clamps_each_penalty() {
        let catalog = CrisisCatalog::with_defaults();
        let storm = catalog.get("storm").unwrap();
        let mut resources = Resources {
            gold: 5.0,
            ..Resources::initial()
        };

        ignore(&mut resources, storm);
        assert_eq!(resources.gold, 0.0);
        assert_eq!(resources.population, 5.0);
    }

    #[test]
    fn test_solve_requires_every_cost() {
        let catalog = CrisisCatalog::with_defaults();
        let beasts = catalog.get("wild_beasts").unwrap();
        let mut resources = Resources {
            gold: 50.0,
            ..Resources::initial()
        };

        assert_eq!(solve(&mut resources, beasts), Err(Rejection::CrisisUnaffordable));
        assert_eq!(resources.gold, 50.0);

        resources.soldiers = 2;
        assert_eq!(solve(&mut resources, beasts), Ok(()));
        assert_eq!(resources.gold, 40.0);
        assert_eq!(resources.soldiers, 1);
    }
}

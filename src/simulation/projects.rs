//! Treasury actions - manual gathering, land purchase, and imperial projects
//!
//! Imperial projects scale their price with the treasury so they stay a
//! meaningful sink late in the game. The Golden Age is the only timed
//! global modifier; while one runs, production and strength are doubled.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::city::stockpile::Resources;
use crate::core::error::Rejection;
use crate::core::types::Tick;

pub const GOLDEN_AGE_FACTOR: f64 = 2.0;
pub const GOLDEN_AGE_TICKS: Tick = 60;
pub const GOLDEN_AGE_MIN_COST: f64 = 1000.0;

pub const FESTIVAL_MIN_COST: f64 = 200.0;
pub const FESTIVAL_POPULATION: f64 = 10.0;

pub const SCIENCE_GRANT_COST: f64 = 5000.0;
pub const SCIENCE_GRANT_SCIENCE: f64 = 1000.0;

pub const RECLAMATION_LAND: u32 = 10;
pub const EXPANSION_LAND: u32 = 5;

/// Single-slot timed production multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoldenAge {
    pub factor: f64,
    pub ends_at: Tick,
}

impl GoldenAge {
    pub fn is_active(&self, now: Tick) -> bool {
        now < self.ends_at
    }
}

/// Multiplier currently in force, 1.0 without an active Golden Age
pub fn global_factor(golden_age: Option<&GoldenAge>, now: Tick) -> f64 {
    match golden_age {
        Some(g) if g.is_active(now) => g.factor,
        _ => 1.0,
    }
}

fn pay(resources: &mut Resources, cost: f64) -> Result<f64, Rejection> {
    if !resources.has_gold(cost) {
        return Err(Rejection::InsufficientGold {
            needed: cost,
            available: resources.gold,
        });
    }
    resources.spend_gold(cost);
    Ok(cost)
}

/// What one manual gather turned up
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Gathered {
    pub land_found: bool,
    pub land_explored: bool,
    pub science_found: bool,
}

/// Work the land by hand: one gold, with a chance of land and science
///
/// A single roll decides everything, compared against the state before the
/// gather.
pub fn gather(resources: &mut Resources, rng: &mut impl Rng) -> Gathered {
    let chance: f64 = rng.gen();
    let capped = resources.land >= resources.max_land;

    let found = Gathered {
        land_found: !capped && chance > 0.8,
        land_explored: capped && chance > 0.98,
        science_found: chance > 0.6,
    };

    resources.gold += 1.0;
    if found.land_found {
        resources.land += 1;
    }
    if found.land_explored {
        resources.max_land += 1;
    }
    if found.science_found {
        resources.science += 1.0;
    }
    found
}

pub fn expand_land_cost(resources: &Resources) -> f64 {
    (resources.max_land as f64 * 2.5).floor()
}

/// Buy more land cap. Returns the gold spent.
pub fn expand_land(resources: &mut Resources) -> Result<f64, Rejection> {
    let spent = pay(resources, expand_land_cost(resources))?;
    resources.max_land += EXPANSION_LAND;
    Ok(spent)
}

pub fn golden_age_cost(resources: &Resources) -> f64 {
    GOLDEN_AGE_MIN_COST.max((resources.gold * 0.8).floor())
}

/// Start a Golden Age. Rejected while one is still running.
pub fn start_golden_age(
    resources: &mut Resources,
    current: Option<&GoldenAge>,
    now: Tick,
) -> Result<GoldenAge, Rejection> {
    if current.is_some_and(|g| g.is_active(now)) {
        return Err(Rejection::ModifierActive);
    }
    pay(resources, golden_age_cost(resources))?;
    Ok(GoldenAge {
        factor: GOLDEN_AGE_FACTOR,
        ends_at: now + GOLDEN_AGE_TICKS,
    })
}

pub fn festival_cost(resources: &Resources) -> f64 {
    FESTIVAL_MIN_COST.max((resources.gold * 0.3).floor())
}

/// Throw a festival. Returns the gold spent.
pub fn hold_festival(resources: &mut Resources) -> Result<f64, Rejection> {
    let spent = pay(resources, festival_cost(resources))?;
    resources.population += FESTIVAL_POPULATION;
    Ok(spent)
}

/// Fund the scholars. Returns the gold spent.
pub fn science_grant(resources: &mut Resources) -> Result<f64, Rejection> {
    let spent = pay(resources, SCIENCE_GRANT_COST)?;
    resources.science += SCIENCE_GRANT_SCIENCE;
    Ok(spent)
}

pub fn reclamation_cost(resources: &Resources) -> f64 {
    (resources.max_land as f64 * 10.0).floor()
}

/// Reclaim marsh and coast. Returns the gold spent.
pub fn reclaim_land(resources: &mut Resources) -> Result<f64, Rejection> {
    let spent = pay(resources, reclamation_cost(resources))?;
    resources.max_land += RECLAMATION_LAND;
    Ok(spent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_gather_always_pays_one_gold() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut resources = Resources::initial();

        for _ in 0..200 {
            gather(&mut resources, &mut rng);
            assert!(resources.land <= resources.max_land);
        }
        assert_eq!(resources.gold, 200.0);
        assert!(resources.land > 0);
        assert!(resources.science > 0.0);
    }

    #[test]
    fn test_gather_at_cap_only_explores() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut resources = Resources {
            land: 60,
            ..Resources::initial()
        };

        for _ in 0..500 {
            let found = gather(&mut resources, &mut rng);
            assert!(!found.land_found || resources.land <= resources.max_land);
        }
        assert!(resources.max_land >= 60);
        assert!(resources.land <= resources.max_land);
    }

    #[test]
    fn test_expand_land() {
        let mut resources = Resources {
            gold: 200.0,
            ..Resources::initial()
        };
        assert_eq!(expand_land(&mut resources), Ok(150.0));
        assert_eq!(resources.max_land, 65);
        assert!(expand_land(&mut resources).is_err());
    }

    #[test]
    fn test_golden_age_lifecycle() {
        let mut resources = Resources {
            gold: 5000.0,
            ..Resources::initial()
        };

        let golden = start_golden_age(&mut resources, None, 10).unwrap();
        assert_eq!(resources.gold, 1000.0);
        assert_eq!(golden.ends_at, 70);
        assert_eq!(global_factor(Some(&golden), 69), 2.0);
        assert_eq!(global_factor(Some(&golden), 70), 1.0);

        resources.gold = 5000.0;
        assert_eq!(
            start_golden_age(&mut resources, Some(&golden), 20),
            Err(Rejection::ModifierActive)
        );
        assert!(start_golden_age(&mut resources, Some(&golden), 70).is_ok());
    }

    #[test]
    fn test_project_costs_have_floors() {
        let resources = Resources {
            gold: 100.0,
            ..Resources::initial()
        };
        assert_eq!(golden_age_cost(&resources), 1000.0);
        assert_eq!(festival_cost(&resources), 200.0);
        assert_eq!(reclamation_cost(&resources), 600.0);
    }

    #[test]
    fn test_festival_and_grant() {
        let mut resources = Resources {
            gold: 6000.0,
            ..Resources::initial()
        };
        assert_eq!(science_grant(&mut resources), Ok(5000.0));
        assert_eq!(resources.science, 1000.0);

        assert_eq!(hold_festival(&mut resources), Ok(300.0));
        assert_eq!(resources.population, 15.0);
    }
}

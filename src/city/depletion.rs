//! Depletion - working buildings with a wear-out chance may lose an instance

use rand::Rng;

use crate::city::building::BuildingRoster;

/// A building instance lost to depletion this tick
#[derive(Debug, Clone, PartialEq)]
pub struct Depleted {
    pub building_idx: usize,
    pub remaining: u32,
}

/// Roll depletion for every built slot that has a depletion chance
///
/// The chance scales with the working ratio, so unstaffed buildings never
/// deplete. A loss removes one instance and clamps the assignment to the
/// capacity that is left.
pub fn roll_depletion(roster: &mut BuildingRoster, rng: &mut impl Rng) -> Vec<Depleted> {
    let mut lost = Vec::new();

    for i in 0..roster.len() {
        if roster.counts[i] == 0 {
            continue;
        }
        let Some(chance) = roster.definition(i).depletion_chance else {
            continue;
        };

        let ratio = roster.working_ratio(i);
        if ratio <= 0.0 {
            continue;
        }

        if rng.gen::<f64>() < chance * ratio {
            roster.counts[i] -= 1;
            let capacity = roster.capacity(i);
            roster.assigned_workers[i] = roster.assigned_workers[i].min(capacity);
            lost.push(Depleted {
                building_idx: i,
                remaining: roster.counts[i],
            });
        }
    }

    lost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::{BaseCost, BuildingDefinition, Production};
    use crate::core::types::{BuildingStyle, Era};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn mine(chance: f64) -> BuildingRoster {
        BuildingRoster::new(vec![BuildingDefinition {
            id: "mine".into(),
            name: "Mine".into(),
            description: String::new(),
            era: Era::Tribal,
            base_cost: BaseCost {
                gold: 10.0,
                land: 1,
                workers: 5,
            },
            production: Production::default(),
            depletion_chance: Some(chance),
            style: BuildingStyle::Economic,
            required_tech: None,
        }])
    }

    #[test]
    fn test_certain_depletion_clamps_workers() {
        let mut roster = mine(1.0);
        roster.counts[0] = 2;
        roster.assigned_workers[0] = 10;
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let lost = roll_depletion(&mut roster, &mut rng);

        assert_eq!(lost, vec![Depleted { building_idx: 0, remaining: 1 }]);
        assert_eq!(roster.counts[0], 1);
        assert_eq!(roster.assigned_workers[0], 5);
    }

    #[test]
    fn test_unstaffed_building_never_depletes() {
        let mut roster = mine(1.0);
        roster.counts[0] = 3;
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..100 {
            assert!(roll_depletion(&mut roster, &mut rng).is_empty());
        }
        assert_eq!(roster.counts[0], 3);
    }
}

//! Attack resolution against a rival

use rand::Rng;

use crate::city::stockpile::Resources;
use crate::core::error::Rejection;
use crate::core::types::Tick;
use crate::diplomacy::rival::{Relation, Rival};

/// Score an attack must beat to win
pub const VICTORY_THRESHOLD: f64 = 1.1;

/// Share of rival wealth taken as loot
pub const LOOT_SHARE: f64 = 0.3;

/// Land cap won by a victory
pub const VICTORY_LAND: u32 = 10;

/// Soldiers surviving a victory
pub const VICTORY_SURVIVAL: f64 = 0.95;

/// Soldiers surviving a defeat
pub const DEFEAT_SURVIVAL: f64 = 0.7;

/// Rival strength and wealth kept after losing
pub const RIVAL_WEAKENING: f64 = 0.7;

/// Ticks a beaten rival is protected for
pub const VICTORY_COOLDOWN: Tick = 30;

#[derive(Debug, Clone, PartialEq)]
pub enum AttackOutcome {
    Victory {
        loot: f64,
        land_gained: u32,
        soldiers_lost: u32,
    },
    Defeat {
        soldiers_lost: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttackReport {
    /// The rival was not at war before this attack
    pub declared_war: bool,
    pub score: f64,
    pub outcome: AttackOutcome,
}

/// Resolve a battle with a known random factor
///
/// `score = my_strength / max(1, rival.strength) * random_factor`. Both
/// outcomes leave the rival at WAR. Only a victory starts a cooldown.
pub fn resolve_attack(
    resources: &mut Resources,
    rival: &mut Rival,
    my_strength: f64,
    random_factor: f64,
    now: Tick,
) -> (f64, AttackOutcome) {
    let advantage = my_strength / rival.strength.max(1.0);
    let score = advantage * random_factor;
    let soldiers_before = resources.soldiers;

    rival.relation = Relation::War;

    let outcome = if score > VICTORY_THRESHOLD {
        let loot = (rival.wealth * LOOT_SHARE).floor();
        resources.gold += loot;
        resources.max_land += VICTORY_LAND;
        resources.apply_soldier_attrition(VICTORY_SURVIVAL);

        rival.strength *= RIVAL_WEAKENING;
        rival.wealth *= RIVAL_WEAKENING;
        rival.cooldown_end = now + VICTORY_COOLDOWN;

        AttackOutcome::Victory {
            loot,
            land_gained: VICTORY_LAND,
            soldiers_lost: soldiers_before - resources.soldiers,
        }
    } else {
        resources.apply_soldier_attrition(DEFEAT_SURVIVAL);
        AttackOutcome::Defeat {
            soldiers_lost: soldiers_before - resources.soldiers,
        }
    };

    (score, outcome)
}

/// Attack a rival, declaring war first when not already at war
///
/// Rejected while the rival is regrouping after an earlier defeat.
pub fn attack(
    resources: &mut Resources,
    rival: &mut Rival,
    my_strength: f64,
    now: Tick,
    rng: &mut impl Rng,
) -> Result<AttackReport, Rejection> {
    if rival.on_cooldown(now) {
        return Err(Rejection::OnCooldown {
            until: rival.cooldown_end,
        });
    }

    let declared_war = rival.relation != Relation::War;
    let random_factor = rng.gen_range(0.8..=1.2);
    let (score, outcome) = resolve_attack(resources, rival, my_strength, random_factor, now);

    Ok(AttackReport {
        declared_war,
        score,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Era;
    use crate::diplomacy::rival::{Attitude, RivalId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rival(strength: f64, wealth: f64) -> Rival {
        Rival {
            id: RivalId(0),
            name: "Iron Legion".into(),
            strength,
            wealth,
            relation: Relation::Neutral,
            attitude: Attitude::Defensive,
            era: Era::Tribal,
            cooldown_end: 0,
        }
    }

    #[test]
    fn test_victory_branch() {
        let mut resources = Resources {
            soldiers: 40,
            ..Resources::initial()
        };
        let mut target = rival(50.0, 200.0);

        let (score, outcome) = resolve_attack(&mut resources, &mut target, 100.0, 1.0, 12);

        assert_eq!(score, 2.0);
        assert_eq!(
            outcome,
            AttackOutcome::Victory {
                loot: 60.0,
                land_gained: 10,
                soldiers_lost: 2
            }
        );
        assert_eq!(resources.gold, 60.0);
        assert_eq!(resources.max_land, 70);
        assert_eq!(resources.soldiers, 38);
        assert!((target.strength - 35.0).abs() < 1e-9);
        assert!((target.wealth - 140.0).abs() < 1e-9);
        assert_eq!(target.relation, Relation::War);
        assert_eq!(target.cooldown_end, 42);
    }

    #[test]
    fn test_defeat_sets_no_cooldown() {
        let mut resources = Resources {
            soldiers: 10,
            ..Resources::initial()
        };
        let mut target = rival(100.0, 100.0);

        let (_, outcome) = resolve_attack(&mut resources, &mut target, 50.0, 1.2, 5);

        assert_eq!(outcome, AttackOutcome::Defeat { soldiers_lost: 3 });
        assert_eq!(resources.soldiers, 7);
        assert_eq!(target.relation, Relation::War);
        assert_eq!(target.cooldown_end, 0);
        assert_eq!(target.strength, 100.0);
    }

    #[test]
    fn test_attack_blocked_on_cooldown() {
        let mut resources = Resources::initial();
        let mut target = rival(10.0, 10.0);
        target.cooldown_end = 50;
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let result = attack(&mut resources, &mut target, 100.0, 20, &mut rng);

        assert_eq!(result, Err(Rejection::OnCooldown { until: 50 }));
        assert_eq!(target.relation, Relation::Neutral);
    }

    #[test]
    fn test_attack_declares_war() {
        let mut resources = Resources {
            soldiers: 100,
            ..Resources::initial()
        };
        let mut target = rival(1.0, 10.0);
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let report = attack(&mut resources, &mut target, 200.0, 0, &mut rng).unwrap();

        assert!(report.declared_war);
        assert!((0.8 * 200.0..=1.2 * 200.0).contains(&report.score));
        assert!(matches!(report.outcome, AttackOutcome::Victory { .. }));
    }
}

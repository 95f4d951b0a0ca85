//! Rival autonomous step - growth and raids on the player

use rand::Rng;

use crate::city::stockpile::Resources;
use crate::diplomacy::rival::{Attitude, Rival, RivalId};

/// Raid chance per tick when the player is under half the rival's strength
pub const PREDATORY_RAID_CHANCE: f64 = 0.02;

/// Raid chance per tick otherwise
pub const RAID_CHANCE: f64 = 0.005;

/// Land cap lost to a raid
pub const RAID_LAND_LOSS: u32 = 5;

/// Rival strength gained from a successful raid
pub const RAID_STRENGTH_GAIN: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RaidReport {
    pub rival: RivalId,
    pub rival_name: String,
    /// The player was under half the rival's strength
    pub predatory: bool,
    pub gold_stolen: f64,
    pub soldiers_killed: u32,
    pub land_lost: u32,
}

/// Per-tick growth of a rival
pub fn grow(rival: &mut Rival, rng: &mut impl Rng) {
    let mut growth = 0.5 + rng.gen::<f64>();
    if rival.attitude == Attitude::Aggressive {
        growth *= 1.2;
    }
    rival.strength += growth;
    rival.wealth += 1.0;
}

/// Whether a raid by a rival this strong counts as predatory
///
/// Exactly half the rival's strength is not predatory.
pub fn is_predatory(player_strength: f64, rival_strength: f64) -> bool {
    player_strength < rival_strength * 0.5
}

/// Apply a successful raid to both sides
///
/// The land loss comes off `max_land`; occupied land above the new cap is
/// clamped down to it.
pub fn raid(resources: &mut Resources, rival: &mut Rival, predatory: bool) -> RaidReport {
    let gold_stolen = (resources.gold * 0.1).floor();
    let soldiers_killed = (resources.soldiers as f64 * 0.1).floor() as u32;
    let max_land_before = resources.max_land;

    resources.spend_gold(gold_stolen);
    resources.soldiers -= soldiers_killed;
    resources.reduce_max_land(RAID_LAND_LOSS);

    rival.wealth += gold_stolen;
    rival.strength += RAID_STRENGTH_GAIN;

    RaidReport {
        rival: rival.id,
        rival_name: rival.name.clone(),
        predatory,
        gold_stolen,
        soldiers_killed,
        land_lost: max_land_before - resources.max_land,
    }
}

/// Run every rival's autonomous step in roster order
///
/// The player's strength is re-measured for each rival so that a raid by an
/// earlier rival weakens the defence against later ones.
pub fn rival_step<F>(
    resources: &mut Resources,
    rivals: &mut [Rival],
    player_strength: F,
    rng: &mut impl Rng,
) -> Vec<RaidReport>
where
    F: Fn(&Resources) -> f64,
{
    let mut raids = Vec::new();

    for rival in rivals.iter_mut() {
        grow(rival, rng);

        let mine = player_strength(resources);
        if rival.strength <= mine || !rival.is_hostile() {
            continue;
        }

        let predatory = is_predatory(mine, rival.strength);
        let chance = if predatory {
            PREDATORY_RAID_CHANCE
        } else {
            RAID_CHANCE
        };

        if rng.gen::<f64>() < chance {
            raids.push(raid(resources, rival, predatory));
        }
    }

    raids
}

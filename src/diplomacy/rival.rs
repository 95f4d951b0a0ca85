//! Rival factions - roster, relations, and attitudes

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{Era, Tick};

/// Stable identifier of a rival within one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RivalId(pub u32);

impl std::fmt::Display for RivalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relation ladder from open war to alliance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Relation {
    War,
    Hostile,
    Neutral,
    Friendly,
    Ally,
}

impl Relation {
    /// One step toward ALLY, saturating
    pub fn warmer(self) -> Relation {
        match self {
            Relation::War => Relation::Hostile,
            Relation::Hostile => Relation::Neutral,
            Relation::Neutral => Relation::Friendly,
            Relation::Friendly | Relation::Ally => Relation::Ally,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Relation::War => "At War",
            Relation::Hostile => "Hostile",
            Relation::Neutral => "Neutral",
            Relation::Friendly => "Friendly",
            Relation::Ally => "Ally",
        }
    }
}

/// Fixed temperament of a rival
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attitude {
    Aggressive,
    Defensive,
    Trader,
}

/// A rival faction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rival {
    pub id: RivalId,
    pub name: String,
    pub strength: f64,
    pub wealth: f64,
    pub relation: Relation,
    pub attitude: Attitude,
    pub era: Era,
    /// Tick until which the rival cannot be attacked
    pub cooldown_end: Tick,
}

impl Rival {
    pub fn on_cooldown(&self, now: Tick) -> bool {
        self.cooldown_end > now
    }

    /// Willing to raid: at war, or aggressive and not friendly
    pub fn is_hostile(&self) -> bool {
        self.relation == Relation::War
            || (self.attitude == Attitude::Aggressive && self.relation != Relation::Friendly)
    }
}

/// Name and temperament pool the starting roster is drawn from
pub const RIVAL_TEMPLATES: [(&str, Attitude); 6] = [
    ("Red Axe Tribe", Attitude::Aggressive),
    ("River Traders", Attitude::Trader),
    ("Mountain Wardens", Attitude::Defensive),
    ("Shadow Empire", Attitude::Aggressive),
    ("Sun Priests", Attitude::Trader),
    ("Iron Legion", Attitude::Defensive),
];

/// Draw the starting roster without repeating a template
pub fn generate_rivals(count: usize, era: Era, rng: &mut impl Rng) -> Vec<Rival> {
    let picks: Vec<(&str, Attitude)> = RIVAL_TEMPLATES
        .choose_multiple(rng, count)
        .cloned()
        .collect();

    picks
        .into_iter()
        .enumerate()
        .map(|(i, (name, attitude))| Rival {
            id: RivalId(i as u32),
            name: name.to_string(),
            strength: rng.gen_range(20.0..40.0),
            wealth: rng.gen_range(50.0..150.0),
            relation: if attitude == Attitude::Aggressive {
                Relation::Hostile
            } else {
                Relation::Neutral
            },
            attitude,
            era,
            cooldown_end: 0,
        })
        .collect()
}

/// How dangerous a rival looks next to the player's strength
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatLevel {
    Low,
    Even,
    High,
    Deadly,
}

pub fn threat_level(player_strength: f64, rival: &Rival) -> ThreatLevel {
    let ratio = if player_strength > 0.0 {
        rival.strength / player_strength
    } else {
        f64::INFINITY
    };
    if ratio > 1.5 {
        ThreatLevel::Deadly
    } else if ratio > 1.1 {
        ThreatLevel::High
    } else if ratio > 0.8 {
        ThreatLevel::Even
    } else {
        ThreatLevel::Low
    }
}

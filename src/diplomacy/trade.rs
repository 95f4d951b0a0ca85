//! Peaceful diplomacy - trade and gifts

use rand::Rng;

use crate::city::stockpile::Resources;
use crate::core::error::Rejection;
use crate::diplomacy::rival::{Relation, Rival};

pub const TRADE_COST: f64 = 100.0;
pub const GIFT_COST: f64 = 200.0;

/// Rival wealth gained from one trade
pub const TRADE_RIVAL_WEALTH: f64 = 50.0;

fn pay(resources: &mut Resources, cost: f64) -> Result<(), Rejection> {
    if !resources.has_gold(cost) {
        return Err(Rejection::InsufficientGold {
            needed: cost,
            available: resources.gold,
        });
    }
    resources.spend_gold(cost);
    Ok(())
}

/// Exchange gold for science
///
/// Trading with a rival at war cools the relation to HOSTILE; any other
/// relation is left as is. Returns the science gained.
pub fn trade(
    resources: &mut Resources,
    rival: &mut Rival,
    rng: &mut impl Rng,
) -> Result<f64, Rejection> {
    pay(resources, TRADE_COST)?;

    let science = rng.gen_range(10..=30) as f64;
    resources.science += science;
    rival.wealth += TRADE_RIVAL_WEALTH;
    if rival.relation == Relation::War {
        rival.relation = Relation::Hostile;
    }
    Ok(science)
}

/// Send gold to improve relations by one step. Returns the new relation.
pub fn gift(resources: &mut Resources, rival: &mut Rival) -> Result<Relation, Rejection> {
    pay(resources, GIFT_COST)?;

    rival.wealth += GIFT_COST;
    rival.relation = rival.relation.warmer();
    Ok(rival.relation)
}

//! Construction system - buying new building instances

use crate::city::building::BuildingRoster;
use crate::city::stockpile::Resources;
use crate::core::config::BUILDING_COST_GROWTH;
use crate::core::error::Rejection;
use crate::core::types::Era;
use crate::research::ResearchState;

/// Result of a successful construction
#[derive(Debug, Clone, PartialEq)]
pub struct Constructed {
    pub index: usize,
    pub gold_spent: f64,
    pub land_used: u32,
    /// Workers moved onto the new instance automatically
    pub workers_assigned: u32,
}

/// Gold price of the next instance of a slot
///
/// Formula: floor(base_gold * 1.15^count)
pub fn gold_cost(roster: &BuildingRoster, index: usize) -> f64 {
    let base = roster.definition(index).base_cost.gold;
    (base * BUILDING_COST_GROWTH.powi(roster.counts[index] as i32)).floor()
}

/// Check every precondition for building one more instance
pub fn check_construct(
    resources: &Resources,
    roster: &BuildingRoster,
    research: &ResearchState,
    era: Era,
    building_id: &str,
) -> Result<usize, Rejection> {
    let index = roster
        .index_of(building_id)
        .ok_or_else(|| Rejection::UnknownBuilding(building_id.to_string()))?;
    let def = roster.definition(index);

    if def.era > era {
        return Err(Rejection::WrongEra);
    }
    if let Some(tech) = &def.required_tech {
        if !research.is_unlocked(tech) {
            return Err(Rejection::Locked(tech.clone()));
        }
    }

    let cost = gold_cost(roster, index);
    if !resources.has_gold(cost) {
        return Err(Rejection::InsufficientGold {
            needed: cost,
            available: resources.gold,
        });
    }
    if resources.free_land() < def.base_cost.land {
        return Err(Rejection::InsufficientLand {
            needed: def.base_cost.land,
            available: resources.free_land(),
        });
    }

    Ok(index)
}

/// Build one instance of a building type
///
/// On success gold and land are paid, the count grows by one and up to one
/// instance worth of idle workers is assigned to it. The idle workforce is
/// measured before the new instance exists. On rejection nothing changes.
pub fn construct(
    resources: &mut Resources,
    roster: &mut BuildingRoster,
    research: &ResearchState,
    era: Era,
    building_id: &str,
) -> Result<Constructed, Rejection> {
    let index = check_construct(resources, roster, research, era, building_id)?;

    let cost = gold_cost(roster, index);
    let land = roster.definition(index).base_cost.land;
    let per_instance = roster.definition(index).base_cost.workers;
    let idle = roster.idle_workers(resources.workforce()).max(0) as u32;

    resources.spend_gold(cost);
    resources.occupy_land(land);
    roster.counts[index] += 1;

    let workers_assigned = idle.min(per_instance);
    roster.assigned_workers[index] += workers_assigned;

    Ok(Constructed {
        index,
        gold_spent: cost,
        land_used: land,
        workers_assigned,
    })
}

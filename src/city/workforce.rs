//! Worker assignment and population-deficit reconciliation

use crate::city::building::BuildingRoster;
use crate::city::stockpile::Resources;
use crate::core::error::Rejection;

/// Move `delta` workers onto (positive) or off (negative) a building type
///
/// Rejected without any change when there are not enough idle people, when
/// the building's capacity would be exceeded, or when the assignment would
/// go negative.
pub fn assign_workers(
    resources: &Resources,
    roster: &mut BuildingRoster,
    building_id: &str,
    delta: i64,
) -> Result<u32, Rejection> {
    let index = roster
        .index_of(building_id)
        .ok_or_else(|| Rejection::UnknownBuilding(building_id.to_string()))?;
    let current = roster.assigned_workers[index] as i64;

    if delta > 0 {
        let idle = roster.idle_workers(resources.workforce());
        if idle < delta {
            return Err(Rejection::InsufficientIdleWorkers {
                needed: u32::try_from(delta).unwrap_or(u32::MAX),
                available: u32::try_from(idle).unwrap_or(0),
            });
        }
    }

    let capacity = roster.capacity(index);
    let target = match current.checked_add(delta) {
        Some(target) if target < 0 => return Err(Rejection::NegativeAssignment),
        Some(target) if delta > 0 && target > capacity as i64 => {
            return Err(Rejection::CapacityExceeded { capacity })
        }
        Some(target) => target as u32,
        None if delta > 0 => return Err(Rejection::CapacityExceeded { capacity }),
        None => return Err(Rejection::NegativeAssignment),
    };

    roster.assigned_workers[index] = target;
    Ok(target)
}

/// Remove assignments the population can no longer cover
///
/// Walks the roster from the last slot backward, taking workers away until
/// the total assignment fits inside the workforce. Returns how many workers
/// were removed.
pub fn reconcile_deficit(resources: &Resources, roster: &mut BuildingRoster) -> u32 {
    let workforce = resources.workforce();
    let assigned = roster.total_assigned();
    if assigned <= workforce {
        return 0;
    }

    let mut remaining = assigned - workforce;
    for slot in roster.assigned_workers.iter_mut().rev() {
        if remaining == 0 {
            break;
        }
        let taken = (*slot).min(remaining);
        *slot -= taken;
        remaining -= taken;
    }

    assigned - workforce
}

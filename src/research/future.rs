//! Future technology - repeatable late-game research

use crate::city::stockpile::Resources;
use crate::core::config::FUTURE_TECH_MILITARY_STEP;
use crate::core::error::Rejection;
use crate::core::types::Era;
use crate::research::technology::ResearchState;

/// Science cost of the first future-tech level
pub const FUTURE_TECH_BASE_COST: f64 = 10_000.0;

/// Cost growth per level
pub const FUTURE_TECH_COST_GROWTH: f64 = 1.5;

/// Land cap gained per level
pub const FUTURE_TECH_LAND: u32 = 50;

/// Science cost of the next level
pub fn future_tech_cost(level: u32) -> f64 {
    (FUTURE_TECH_BASE_COST * FUTURE_TECH_COST_GROWTH.powi(level as i32)).floor()
}

/// Military multiplier for a future-tech level, recomputed from the level
pub fn future_military_multiplier(level: u32) -> f64 {
    1.0 + FUTURE_TECH_MILITARY_STEP * level as f64
}

/// Buy one future-tech level. Only offered in the Technological era.
///
/// Returns the new level.
pub fn research_future(
    resources: &mut Resources,
    state: &mut ResearchState,
    era: Era,
) -> Result<u32, Rejection> {
    if era != Era::Technological {
        return Err(Rejection::WrongEra);
    }
    let cost = future_tech_cost(state.future_level);
    if resources.science < cost {
        return Err(Rejection::InsufficientScience {
            needed: cost,
            available: resources.science,
        });
    }

    resources.spend_science(cost);
    state.future_level += 1;
    resources.max_land += FUTURE_TECH_LAND;
    Ok(state.future_level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_curve() {
        assert_eq!(future_tech_cost(0), 10_000.0);
        assert_eq!(future_tech_cost(1), 15_000.0);
        assert_eq!(future_tech_cost(3), 33_750.0);
    }

    #[test]
    fn test_multiplier_from_level() {
        assert_eq!(future_military_multiplier(0), 1.0);
        assert!((future_military_multiplier(4) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_future_research_levels_up() {
        let mut resources = Resources {
            science: 30_000.0,
            ..Resources::initial()
        };
        let mut state = ResearchState::new();

        assert_eq!(research_future(&mut resources, &mut state, Era::Technological), Ok(1));
        assert_eq!(research_future(&mut resources, &mut state, Era::Technological), Ok(2));
        assert_eq!(resources.science, 5_000.0);
        assert_eq!(resources.max_land, 160);

        let result = research_future(&mut resources, &mut state, Era::Technological);
        assert!(matches!(result, Err(Rejection::InsufficientScience { .. })));
        assert_eq!(state.future_level, 2);
    }

    #[test]
    fn test_future_research_needs_last_era() {
        let mut resources = Resources {
            science: 30_000.0,
            ..Resources::initial()
        };
        let mut state = ResearchState::new();
        assert_eq!(
            research_future(&mut resources, &mut state, Era::Industrial),
            Err(Rejection::WrongEra)
        );
    }
}

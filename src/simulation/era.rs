//! Era progression - thresholds, one-time bonuses, and the transition overlay

use serde::{Deserialize, Serialize};

use crate::city::stockpile::Resources;
use crate::core::types::Era;

/// Gold and population needed to enter an era
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EraRequirement {
    pub gold: f64,
    pub population: f64,
}

pub fn era_requirement(era: Era) -> EraRequirement {
    let (gold, population) = match era {
        Era::Tribal => (0.0, 0.0),
        Era::Agricultural => (500.0, 20.0),
        Era::Industrial => (5_000.0, 100.0),
        Era::Technological => (50_000.0, 500.0),
    };
    EraRequirement { gold, population }
}

/// Land cap granted once on entering an era
pub fn era_land_bonus(era: Era) -> u32 {
    match era {
        Era::Tribal => 0,
        Era::Agricultural => 50,
        Era::Industrial => 150,
        Era::Technological => 500,
    }
}

/// The next era, if the ledger meets its thresholds
pub fn next_era_reached(current: Era, resources: &Resources) -> Option<Era> {
    let next = current.next()?;
    let req = era_requirement(next);
    (resources.gold >= req.gold && resources.population >= req.population).then_some(next)
}

/// Blocking display state between scheduler fires
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overlay {
    #[default]
    None,
    /// A new era is being announced; ticks are held for `remaining` fires
    EraTransition { era: Era, remaining: u32 },
}

impl Overlay {
    pub fn is_blocking(&self) -> bool {
        !matches!(self, Overlay::None)
    }

    /// Count one blocked fire down, clearing the overlay when it runs out
    pub fn count_down(&mut self) {
        if let Overlay::EraTransition { remaining, .. } = self {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                *self = Overlay::None;
            }
        }
    }
}

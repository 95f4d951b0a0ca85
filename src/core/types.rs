//! Core type definitions used throughout the codebase

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Historical era. Ordered: an empire only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Era {
    Tribal,
    Agricultural,
    Industrial,
    Technological,
}

impl Era {
    pub const ALL: [Era; 4] = [
        Era::Tribal,
        Era::Agricultural,
        Era::Industrial,
        Era::Technological,
    ];

    /// The era that follows this one, if any
    pub fn next(self) -> Option<Era> {
        match self {
            Era::Tribal => Some(Era::Agricultural),
            Era::Agricultural => Some(Era::Industrial),
            Era::Industrial => Some(Era::Technological),
            Era::Technological => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Era::Tribal => "Tribal Age",
            Era::Agricultural => "Agricultural Age",
            Era::Industrial => "Industrial Age",
            Era::Technological => "Technological Age",
        }
    }
}

impl std::fmt::Display for Era {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Climate of the starting lands. Cosmetic for the engine, flavours narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Climate {
    Temperate,
    Arid,
    Arctic,
    Tropical,
}

impl Climate {
    pub const ALL: [Climate; 4] = [
        Climate::Temperate,
        Climate::Arid,
        Climate::Arctic,
        Climate::Tropical,
    ];

    /// Pick a climate uniformly at random
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn name(self) -> &'static str {
        match self {
            Climate::Temperate => "temperate",
            Climate::Arid => "arid",
            Climate::Arctic => "arctic",
            Climate::Tropical => "tropical",
        }
    }
}

impl std::fmt::Display for Climate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Architectural style of a building, used for dominant-style classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingStyle {
    None,
    Military,
    Economic,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_era_ordering() {
        assert!(Era::Tribal < Era::Agricultural);
        assert!(Era::Industrial < Era::Technological);
        assert_eq!(Era::Tribal.next(), Some(Era::Agricultural));
        assert_eq!(Era::Technological.next(), None);
    }

    #[test]
    fn test_random_climate_is_deterministic() {
        let a = Climate::random(&mut ChaCha8Rng::seed_from_u64(7));
        let b = Climate::random(&mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a, b);
    }
}

//! Resource ledger - the empire's scalar resources with their caps and floors

use serde::{Deserialize, Serialize};

/// The empire's resources
///
/// `land` counts occupied land and never exceeds `max_land`. The float
/// resources are never negative: every spend path clamps at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub population: f64,
    pub gold: f64,
    pub land: u32,
    pub max_land: u32,
    pub science: f64,
    pub soldiers: u32,
}

impl Default for Resources {
    fn default() -> Self {
        Self::initial()
    }
}

impl Resources {
    /// Starting resources of a fresh game
    pub fn initial() -> Self {
        Self {
            population: 5.0,
            gold: 0.0,
            land: 0,
            max_land: 60,
            science: 0.0,
            soldiers: 0,
        }
    }

    /// Whole people available for work
    pub fn workforce(&self) -> u32 {
        self.population.max(0.0).floor() as u32
    }

    /// Land that can still be built on
    pub fn free_land(&self) -> u32 {
        self.max_land.saturating_sub(self.land)
    }

    pub fn has_gold(&self, amount: f64) -> bool {
        self.gold >= amount
    }

    /// Remove gold, never going below zero
    pub fn spend_gold(&mut self, amount: f64) {
        self.gold = (self.gold - amount).max(0.0);
    }

    /// Remove science, never going below zero
    pub fn spend_science(&mut self, amount: f64) {
        self.science = (self.science - amount).max(0.0);
    }

    /// Remove population, never going below zero
    pub fn spend_population(&mut self, amount: f64) {
        self.population = (self.population - amount).max(0.0);
    }

    /// Occupy land, returns amount actually occupied
    pub fn occupy_land(&mut self, amount: u32) -> u32 {
        let occupied = amount.min(self.free_land());
        self.land += occupied;
        occupied
    }

    /// Release occupied land (crisis penalties), clamped at zero
    pub fn release_land(&mut self, amount: u32) {
        self.land = self.land.saturating_sub(amount);
    }

    /// Shrink the land cap. Occupied land above the new cap is lost with it.
    pub fn reduce_max_land(&mut self, amount: u32) {
        self.max_land = self.max_land.saturating_sub(amount);
        self.land = self.land.min(self.max_land);
    }

    /// Lose a share of soldiers, rounding the survivors down
    pub fn apply_soldier_attrition(&mut self, survival_rate: f64) {
        self.soldiers = (self.soldiers as f64 * survival_rate).floor() as u32;
    }
}

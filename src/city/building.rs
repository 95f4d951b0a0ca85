//! Building definitions and the per-type instance roster (SoA layout)

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{BuildingStyle, Era};

/// Price of one building instance, before the count-based cost growth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseCost {
    pub gold: f64,
    pub land: u32,
    /// Workers one instance employs at full staffing. Zero = automatic.
    pub workers: u32,
}

/// Per-tick output of one fully-staffed instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Production {
    /// May be negative (upkeep)
    pub gold: f64,
    pub science: f64,
    pub population: f64,
    pub military: f64,
}

/// Immutable description of a building type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Era in which the building becomes constructible
    pub era: Era,
    pub base_cost: BaseCost,
    #[serde(default)]
    pub production: Production,
    /// Per-tick chance of losing one working instance
    #[serde(default)]
    pub depletion_chance: Option<f64>,
    pub style: BuildingStyle,
    #[serde(default)]
    pub required_tech: Option<String>,
}

impl BuildingDefinition {
    /// Automatic buildings produce from their count, not from staffing
    pub fn is_automatic(&self) -> bool {
        self.base_cost.workers == 0
    }
}

/// Structure of Arrays for building types and their mutable state
///
/// One slot per definition, in registry order. Registry order matters: the
/// population-deficit reconciliation destaffs from the last slot backward.
#[derive(Debug, Clone, Default)]
pub struct BuildingRoster {
    /// Static definitions
    pub definitions: Vec<BuildingDefinition>,
    /// Number of instances built
    pub counts: Vec<u32>,
    /// Workers currently assigned across all instances
    pub assigned_workers: Vec<u32>,
    /// id -> slot
    index: AHashMap<String, usize>,
}

impl BuildingRoster {
    /// Build a roster with every count and assignment at zero
    pub fn new(definitions: Vec<BuildingDefinition>) -> Self {
        let index = definitions
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id.clone(), i))
            .collect();
        let len = definitions.len();
        Self {
            definitions,
            counts: vec![0; len],
            assigned_workers: vec![0; len],
            index,
        }
    }

    /// Roster over the built-in building catalog
    pub fn with_defaults() -> Self {
        Self::new(crate::city::catalog::default_buildings())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn definition(&self, index: usize) -> &BuildingDefinition {
        &self.definitions[index]
    }

    /// Maximum workers the built instances of a slot can employ
    pub fn capacity(&self, index: usize) -> u32 {
        self.counts[index] * self.definitions[index].base_cost.workers
    }

    /// Workers assigned across every building
    pub fn total_assigned(&self) -> u32 {
        self.assigned_workers.iter().sum()
    }

    /// Idle workforce given the current population
    ///
    /// Signed: after a population drop and before reconciliation the
    /// assignment can exceed the workforce.
    pub fn idle_workers(&self, workforce: u32) -> i64 {
        workforce as i64 - self.total_assigned() as i64
    }

    /// Fractional number of instances actually producing
    pub fn effective_units(&self, index: usize) -> f64 {
        let workers = self.definitions[index].base_cost.workers;
        if workers > 0 {
            self.assigned_workers[index] as f64 / workers as f64
        } else {
            self.counts[index] as f64
        }
    }

    /// Share of worker capacity that is staffed, 1.0 for automatic buildings
    pub fn working_ratio(&self, index: usize) -> f64 {
        let capacity = self.capacity(index);
        if self.definitions[index].is_automatic() {
            1.0
        } else if capacity == 0 {
            0.0
        } else {
            self.assigned_workers[index] as f64 / capacity as f64
        }
    }

    /// Iterate over slots with at least one instance built
    pub fn iter_built(&self) -> impl Iterator<Item = usize> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(i, _)| i)
    }

    /// Restore a slot's state from a save, clamping it into the invariants
    pub fn restore_slot(&mut self, id: &str, count: u32, assigned: u32) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.counts[index] = count;
        self.assigned_workers[index] = assigned.min(self.capacity(index));
        true
    }

    /// MILITARY or ECONOMIC depending on which style has more instances
    ///
    /// Ties go to MILITARY; an empire with neither is NONE.
    pub fn dominant_style(&self) -> BuildingStyle {
        let mut military = 0;
        let mut economic = 0;
        for (def, count) in self.definitions.iter().zip(&self.counts) {
            match def.style {
                BuildingStyle::Military => military += count,
                BuildingStyle::Economic => economic += count,
                BuildingStyle::None => {}
            }
        }
        if military == 0 && economic == 0 {
            BuildingStyle::None
        } else if military >= economic {
            BuildingStyle::Military
        } else {
            BuildingStyle::Economic
        }
    }

    /// The building type with the most instances, if anything is built
    pub fn largest(&self) -> Option<&BuildingDefinition> {
        self.iter_built()
            .max_by_key(|&i| self.counts[i])
            .map(|i| &self.definitions[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(id: &str, workers: u32, style: BuildingStyle) -> BuildingDefinition {
        BuildingDefinition {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            era: Era::Tribal,
            base_cost: BaseCost { gold: 10.0, land: 1, workers },
            production: Production::default(),
            depletion_chance: None,
            style,
            required_tech: None,
        }
    }

    #[test]
    fn test_roster_starts_empty() {
        let roster = BuildingRoster::new(vec![def("a", 2, BuildingStyle::None)]);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.counts[0], 0);
        assert_eq!(roster.assigned_workers[0], 0);
        assert_eq!(roster.index_of("a"), Some(0));
        assert_eq!(roster.index_of("b"), None);
    }

    #[test]
    fn test_effective_units_fractional() {
        let mut roster = BuildingRoster::new(vec![
            def("staffed", 4, BuildingStyle::None),
            def("auto", 0, BuildingStyle::None),
        ]);
        roster.counts[0] = 2;
        roster.assigned_workers[0] = 6;
        roster.counts[1] = 3;

        assert_eq!(roster.effective_units(0), 1.5);
        assert_eq!(roster.effective_units(1), 3.0);
        assert_eq!(roster.working_ratio(0), 0.75);
        assert_eq!(roster.working_ratio(1), 1.0);
    }

    #[test]
    fn test_dominant_style() {
        let mut roster = BuildingRoster::new(vec![
            def("camp", 1, BuildingStyle::Military),
            def("market", 1, BuildingStyle::Economic),
        ]);
        assert_eq!(roster.dominant_style(), BuildingStyle::None);

        roster.counts[1] = 2;
        assert_eq!(roster.dominant_style(), BuildingStyle::Economic);

        roster.counts[0] = 2;
        assert_eq!(roster.dominant_style(), BuildingStyle::Military);
    }

    #[test]
    fn test_restore_slot_clamps_workers() {
        let mut roster = BuildingRoster::new(vec![def("farm", 5, BuildingStyle::Economic)]);
        assert!(roster.restore_slot("farm", 2, 99));
        assert_eq!(roster.assigned_workers[0], 10);
        assert!(!roster.restore_slot("gone", 1, 1));
    }

    #[test]
    fn test_default_roster_ids_unique() {
        let roster = BuildingRoster::with_defaults();
        for (i, def) in roster.definitions.iter().enumerate() {
            assert_eq!(roster.index_of(&def.id), Some(i));
        }
    }
}

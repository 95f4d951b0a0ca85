//! City layer - resources, buildings, workers, and production

pub mod building;
pub mod catalog;
pub mod construction;
pub mod depletion;
pub mod production;
pub mod stockpile;
pub mod workforce;

pub use building::{BaseCost, BuildingDefinition, BuildingRoster, Production};
pub use catalog::{default_buildings, load_buildings_toml, CatalogLoadError};
pub use construction::{construct, gold_cost, Constructed};
pub use depletion::{roll_depletion, Depleted};
pub use production::{calculate_production, BuildingYield, ProductionDeltas};
pub use stockpile::Resources;
pub use workforce::{assign_workers, reconcile_deficit};

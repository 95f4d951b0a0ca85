//! Building catalog - the built-in building types and TOML loading
//!
//! Registry order is significant (see [`BuildingRoster`]), so the catalog
//! lists buildings era by era, cheapest first.
//!
//! [`BuildingRoster`]: crate::city::building::BuildingRoster

use serde::Deserialize;
use thiserror::Error;

use crate::city::building::{BaseCost, BuildingDefinition, Production};
use crate::core::types::{BuildingStyle, Era};

#[allow(clippy::too_many_arguments)]
fn building(
    id: &str,
    name: &str,
    description: &str,
    era: Era,
    (gold, land, workers): (f64, u32, u32),
    production: Production,
    depletion_chance: Option<f64>,
    style: BuildingStyle,
    required_tech: Option<&str>,
) -> BuildingDefinition {
    BuildingDefinition {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        era,
        base_cost: BaseCost { gold, land, workers },
        production,
        depletion_chance,
        style,
        required_tech: required_tech.map(Into::into),
    }
}

fn yields(gold: f64, science: f64, population: f64, military: f64) -> Production {
    Production {
        gold,
        science,
        population,
        military,
    }
}

/// The built-in buildings, in registry order
pub fn default_buildings() -> Vec<BuildingDefinition> {
    use BuildingStyle::{Economic, Military, None as Civic};
    use Era::{Agricultural, Industrial, Technological, Tribal};

    vec![
        // Tribal
        building("tent", "Hide Tent", "Simple shelter. Slightly speeds population growth.",
            Tribal, (10.0, 2, 0), yields(0.0, 0.0, 0.1, 0.0), None, Civic, None),
        building("house", "Wooden House", "Better housing. Speeds population growth.",
            Tribal, (50.0, 5, 1), yields(0.0, 0.0, 0.5, 0.0), None, Civic, None),
        building("hunting_grounds", "Hunting Grounds", "Steady food and hides. The roots of military discipline.",
            Tribal, (25.0, 5, 2), yields(1.0, 0.0, 0.0, 1.0), Some(0.0005), Military, Some("stone_tools")),
        building("storyteller", "Storyteller's Fire", "Stories are told and the first knowledge is passed on.",
            Tribal, (50.0, 2, 1), yields(0.0, 0.5, 0.0, 0.0), None, Civic, Some("oral_tradition")),
        // Agricultural
        building("farm", "Wheat Field", "Regular harvests. The base of the economy.",
            Agricultural, (100.0, 10, 5), yields(5.0, 0.0, 0.0, 0.0), None, Economic, Some("agriculture")),
        building("market", "Marketplace", "A centre of trade that enlivens the economy.",
            Agricultural, (300.0, 5, 3), yields(15.0, 0.0, 0.0, 0.0), None, Economic, Some("currency")),
        building("library", "Library", "Where knowledge is gathered. Produces science.",
            Agricultural, (500.0, 8, 4), yields(0.0, 2.0, 0.0, 0.0), None, Civic, Some("writing")),
        building("barracks", "Barracks", "Warrior training. Costs gold to maintain the army.",
            Agricultural, (400.0, 15, 10), yields(-2.0, 0.0, 0.0, 5.0), None, Military, Some("masonry")),
        // Industrial
        building("mine", "Gold Mine", "Deep excavation. High yield with a risk of collapse.",
            Industrial, (1000.0, 20, 15), yields(50.0, 0.0, 0.0, 0.0), Some(0.002), Economic, Some("metallurgy")),
        building("factory", "Factory", "Mass production. Breakdowns can stop output.",
            Industrial, (2500.0, 15, 50), yields(120.0, 0.0, 0.0, 0.0), Some(0.001), Economic, Some("steam_power")),
        building("fortress", "Steel Fortress", "Impregnable walls that strike fear into enemies.",
            Industrial, (5000.0, 25, 40), yields(0.0, 0.0, 2.0, 20.0), None, Military, Some("masonry")),
        building("bank", "Central Bank", "A financial empire. The power of money.",
            Industrial, (8000.0, 10, 20), yields(300.0, 0.0, 0.0, 0.0), None, Economic, Some("banking")),
        // Technological
        building("lab", "Research Laboratory", "The summit of science. Needs the brightest minds.",
            Technological, (10000.0, 10, 30), yields(100.0, 20.0, 0.0, 0.0), None, Civic, Some("computing")),
    ]
}

/// Error type for building catalog loading
#[derive(Error, Debug, Clone)]
pub enum CatalogLoadError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Duplicate building id: {0}")]
    DuplicateId(String),
    #[error("Invalid cost for building: {0}")]
    InvalidCost(String),
}

/// TOML representation of a buildings file
#[derive(Debug, Deserialize)]
struct TomlBuildings {
    buildings: Vec<BuildingDefinition>,
}

/// Load building definitions from a TOML file
pub fn load_buildings_toml(path: &std::path::Path) -> Result<Vec<BuildingDefinition>, CatalogLoadError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| CatalogLoadError::IoError(e.to_string()))?;
    parse_buildings_toml(&content)
}

/// Parse building definitions from TOML text
pub fn parse_buildings_toml(content: &str) -> Result<Vec<BuildingDefinition>, CatalogLoadError> {
    let data: TomlBuildings =
        toml::from_str(content).map_err(|e| CatalogLoadError::ParseError(e.to_string()))?;

    let mut seen = ahash::AHashSet::new();
    for def in &data.buildings {
        if !seen.insert(def.id.as_str()) {
            return Err(CatalogLoadError::DuplicateId(def.id.clone()));
        }
        if def.base_cost.gold < 0.0 || !def.base_cost.gold.is_finite() {
            return Err(CatalogLoadError::InvalidCost(def.id.clone()));
        }
    }

    Ok(data.buildings)
}

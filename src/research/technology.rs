//! Technology graph - static prerequisite DAG and the unlocked set

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::city::stockpile::Resources;
use crate::core::error::Rejection;
use crate::core::types::Era;

/// Permanent bonus granted when a technology is researched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechBonus {
    /// Added to the land cap once, at research time
    pub max_land: Option<u32>,
    /// Added to military strength while unlocked
    pub military: Option<f64>,
}

/// Immutable description of a technology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Science cost
    pub cost: f64,
    pub era: Era,
    pub prerequisite: Option<String>,
    pub bonus: TechBonus,
    pub unlocks_building: Option<String>,
}

#[allow(clippy::too_many_arguments)]
fn tech(
    id: &str,
    name: &str,
    description: &str,
    cost: f64,
    era: Era,
    prerequisite: Option<&str>,
    bonus: TechBonus,
    unlocks_building: Option<&str>,
) -> Technology {
    Technology {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        cost,
        era,
        prerequisite: prerequisite.map(Into::into),
        bonus,
        unlocks_building: unlocks_building.map(Into::into),
    }
}

fn land(amount: u32) -> TechBonus {
    TechBonus {
        max_land: Some(amount),
        military: None,
    }
}

fn military(amount: f64) -> TechBonus {
    TechBonus {
        max_land: None,
        military: Some(amount),
    }
}

/// Catalog of all technologies with id lookup
#[derive(Debug, Clone, Default)]
pub struct TechCatalog {
    technologies: Vec<Technology>,
    index: AHashMap<String, usize>,
}

impl TechCatalog {
    pub fn new(technologies: Vec<Technology>) -> Self {
        let index = technologies
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        Self {
            technologies,
            index,
        }
    }

    /// Catalog with the built-in technology tree
    pub fn with_defaults() -> Self {
        use Era::{Agricultural, Industrial, Technological, Tribal};
        let none = TechBonus::default;

        Self::new(vec![
            // Tribal
            tech("stone_tools", "Stone Tools", "Better hunting techniques.",
                10.0, Tribal, None, none(), Some("hunting_grounds")),
            tech("oral_tradition", "Oral Tradition", "Knowledge passed from generation to generation.",
                25.0, Tribal, None, none(), Some("storyteller")),
            tech("scouting", "Scouting", "Discover new hunting grounds.",
                40.0, Tribal, None, land(20), None),
            // Agricultural
            tech("agriculture", "Agriculture", "The move to settled life.",
                100.0, Agricultural, Some("stone_tools"), none(), Some("farm")),
            tech("masonry", "Masonry", "Stone structures and defences.",
                150.0, Agricultural, None, military(10.0), Some("barracks")),
            tech("cartography", "Cartography", "Chart your borders in detail.",
                200.0, Agricultural, Some("scouting"), land(50), None),
            tech("writing", "Writing", "Knowledge made permanent.",
                300.0, Agricultural, Some("oral_tradition"), none(), Some("library")),
            tech("currency", "Currency", "Standardised trade.",
                250.0, Agricultural, None, none(), Some("market")),
            tech("bronze_working", "Bronze Working", "Stronger weapons.",
                350.0, Agricultural, Some("masonry"), military(20.0), None),
            // Industrial
            tech("steam_power", "Steam Power", "The rise of machines.",
                1000.0, Industrial, Some("masonry"), none(), Some("factory")),
            tech("urbanization", "Urbanization", "Vertical architecture and efficient use of space.",
                1500.0, Industrial, Some("masonry"), land(150), None),
            tech("banking", "Banking", "A modern financial system.",
                1200.0, Industrial, Some("currency"), none(), Some("bank")),
            tech("metallurgy", "Metallurgy", "Advanced mining and steel.",
                800.0, Industrial, None, none(), Some("mine")),
            tech("ballistics", "Ballistics", "Long range artillery.",
                2000.0, Industrial, Some("metallurgy"), military(100.0), None),
            // Technological
            tech("computing", "Computing", "The dawn of the digital age.",
                5000.0, Technological, None, none(), Some("lab")),
            tech("drones", "Autonomous Drones", "Unmanned war machines.",
                15000.0, Technological, Some("computing"), military(500.0), None),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&Technology> {
        self.index.get(id).map(|&i| &self.technologies[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Technology> {
        self.technologies.iter()
    }

    pub fn len(&self) -> usize {
        self.technologies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.technologies.is_empty()
    }
}

/// Researched technologies plus the repeatable future-tech level
///
/// `unlocked` is append-only and keeps research order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchState {
    pub unlocked: Vec<String>,
    pub future_level: u32,
}

impl ResearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self, tech_id: &str) -> bool {
        self.unlocked.iter().any(|t| t == tech_id)
    }

    /// Sum of the military bonuses of every unlocked technology
    pub fn military_bonus(&self, catalog: &TechCatalog) -> f64 {
        self.unlocked
            .iter()
            .filter_map(|id| catalog.get(id))
            .filter_map(|t| t.bonus.military)
            .sum()
    }

    /// Technologies that could be researched right now, ignoring cost
    pub fn available<'a>(
        &'a self,
        catalog: &'a TechCatalog,
        era: Era,
    ) -> impl Iterator<Item = &'a Technology> + 'a {
        catalog
            .iter()
            .filter(move |t| self.check_offered(t, era).is_ok())
    }

    fn check_offered(&self, tech: &Technology, era: Era) -> Result<(), Rejection> {
        if self.is_unlocked(&tech.id) {
            return Err(Rejection::AlreadyResearched);
        }
        if let Some(pre) = &tech.prerequisite {
            if !self.is_unlocked(pre) {
                return Err(Rejection::MissingPrerequisite(pre.clone()));
            }
        }
        // The tree shows the current era and the one after it
        if tech.era > era.next().unwrap_or(era) {
            return Err(Rejection::WrongEra);
        }
        Ok(())
    }
}

/// Result of a successful research
#[derive(Debug, Clone, PartialEq)]
pub struct Researched {
    pub tech_id: String,
    pub name: String,
    pub science_spent: f64,
    pub max_land_bonus: Option<u32>,
}

/// Research one technology
///
/// Rejected when already researched, when the prerequisite is missing, when
/// the technology lies more than one era ahead, or when science is short.
/// On success the cost is paid, the id is appended to the unlocked list and
/// any land bonus is applied.
pub fn research(
    resources: &mut Resources,
    state: &mut ResearchState,
    catalog: &TechCatalog,
    era: Era,
    tech_id: &str,
) -> Result<Researched, Rejection> {
    let tech = catalog
        .get(tech_id)
        .ok_or_else(|| Rejection::UnknownTechnology(tech_id.to_string()))?;

    state.check_offered(tech, era)?;
    if resources.science < tech.cost {
        return Err(Rejection::InsufficientScience {
            needed: tech.cost,
            available: resources.science,
        });
    }

    resources.spend_science(tech.cost);
    state.unlocked.push(tech.id.clone());
    if let Some(bonus) = tech.bonus.max_land {
        resources.max_land += bonus;
    }

    Ok(Researched {
        tech_id: tech.id.clone(),
        name: tech.name.clone(),
        science_spent: tech.cost,
        max_land_bonus: tech.bonus.max_land,
    })
}

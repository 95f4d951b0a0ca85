//! Research - the technology tree and repeatable future technology

pub mod future;
pub mod technology;

pub use future::{future_military_multiplier, future_tech_cost, research_future};
pub use technology::{research, ResearchState, Researched, TechBonus, TechCatalog, Technology};

//! Diplomacy - rival factions, military strength, war, raids, and trade

pub mod military;
pub mod raids;
pub mod rival;
pub mod trade;
pub mod warfare;

pub use military::{military_strength, recruit};
pub use raids::{rival_step, RaidReport};
pub use rival::{generate_rivals, threat_level, Attitude, Relation, Rival, RivalId, ThreatLevel};
pub use trade::{gift, trade};
pub use warfare::{attack, resolve_attack, AttackOutcome, AttackReport};

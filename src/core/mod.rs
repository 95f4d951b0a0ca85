pub mod config;
pub mod error;
pub mod types;

pub use config::SimulationConfig;
pub use error::{CivError, Rejection, Result};
pub use types::{BuildingStyle, Climate, Era, Tick};

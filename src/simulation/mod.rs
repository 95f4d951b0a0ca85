//! Simulation engine - state, tick orchestration, player actions, and the scheduler

pub mod actions;
pub mod crisis;
pub mod era;
pub mod events;
pub mod projects;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use crisis::{Crisis, CrisisCatalog};
pub use era::Overlay;
pub use events::{EventLog, LogEntry, LogKind};
pub use projects::GoldenAge;
pub use scheduler::SchedulerHandle;
pub use state::{Simulation, SimulationState, StatusView};
pub use tick::{run_simulation_tick, FireOutcome, SimulationEvent};

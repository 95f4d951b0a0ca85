//! Command execution - applies player commands to the simulation

use serde::{Deserialize, Serialize};

use crate::core::error::Rejection;
use crate::diplomacy::rival::RivalId;
use crate::diplomacy::warfare::AttackOutcome;
use crate::simulation::state::Simulation;

/// A player command, as sent by any driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Construct { building: String },
    /// Positive moves idle people on, negative takes workers off
    AssignWorkers { building: String, delta: i64 },
    Research { tech: String },
    ResearchFuture,
    Recruit { amount: u32 },
    Attack { rival: RivalId },
    Trade { rival: RivalId },
    Gift { rival: RivalId },
    Gather,
    ExpandLand,
    GoldenAge,
    Festival,
    ScienceGrant,
    ReclaimLand,
    SolveCrisis,
    IgnoreCrisis,
    DismissOverlay,
    Chronicle,
    Snapshot,
}

impl Command {
    /// Whether an accepted command changes what gets saved
    pub fn changes_state(&self) -> bool {
        !matches!(
            self,
            Command::DismissOverlay | Command::Chronicle | Command::Snapshot
        )
    }
}

/// Result of executing a command
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub message: String,
    pub error: Option<Rejection>,
}

impl ExecutionResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }

    fn rejected(error: Rejection) -> Self {
        Self {
            message: error.to_string(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Executes commands against a simulation
pub struct CommandExecutor;

impl CommandExecutor {
    pub fn execute(sim: &mut Simulation, command: &Command) -> ExecutionResult {
        match Self::apply(sim, command) {
            Ok(message) => ExecutionResult::ok(message),
            Err(rejection) => ExecutionResult::rejected(rejection),
        }
    }

    fn apply(sim: &mut Simulation, command: &Command) -> Result<String, Rejection> {
        Ok(match command {
            Command::Construct { building } => {
                let built = sim.construct(building)?;
                format!(
                    "Built {} ({} workers assigned)",
                    sim.state.buildings.definition(built.index).name,
                    built.workers_assigned
                )
            }
            Command::AssignWorkers { building, delta } => {
                let assigned = sim.assign_workers(building, *delta)?;
                format!("{} now has {} workers", building, assigned)
            }
            Command::Research { tech } => {
                let done = sim.research(tech)?;
                format!("Researched {}", done.name)
            }
            Command::ResearchFuture => {
                format!("Future technology level {}", sim.research_future()?)
            }
            Command::Recruit { amount } => {
                format!("Army strength: {} soldiers", sim.recruit(*amount)?)
            }
            Command::Attack { rival } => match sim.attack(*rival)?.outcome {
                AttackOutcome::Victory { loot, .. } => format!("Victory! Looted {} gold", loot),
                AttackOutcome::Defeat { soldiers_lost } => {
                    format!("Defeat. Lost {} soldiers", soldiers_lost)
                }
            },
            Command::Trade { rival } => format!("Gained {} science", sim.trade(*rival)?),
            Command::Gift { rival } => format!("Relations now {}", sim.gift(*rival)?.name()),
            Command::Gather => {
                let found = sim.gather();
                let mut message = String::from("+1 gold");
                if found.land_found {
                    message.push_str(", +1 land");
                }
                if found.land_explored {
                    message.push_str(", +1 max land");
                }
                if found.science_found {
                    message.push_str(", +1 science");
                }
                message
            }
            Command::ExpandLand => format!("Expanded territory for {} gold", sim.expand_land()?),
            Command::GoldenAge => {
                let golden = sim.start_golden_age()?;
                format!("Golden Age until tick {}", golden.ends_at)
            }
            Command::Festival => format!("Festival held for {} gold", sim.hold_festival()?),
            Command::ScienceGrant => format!("Grant paid: {} gold", sim.science_grant()?),
            Command::ReclaimLand => format!("Land reclaimed for {} gold", sim.reclaim_land()?),
            Command::SolveCrisis => {
                sim.solve_crisis()?;
                "Crisis solved".into()
            }
            Command::IgnoreCrisis => {
                sim.ignore_crisis()?;
                "Crisis ignored".into()
            }
            Command::DismissOverlay => {
                if sim.dismiss_overlay() {
                    "Announcement dismissed".into()
                } else {
                    "Nothing to dismiss".into()
                }
            }
            Command::Chronicle => {
                sim.request_chronicle();
                "The chronicler is writing".into()
            }
            Command::Snapshot => {
                sim.request_snapshot();
                "The painter is at work".into()
            }
        })
    }
}

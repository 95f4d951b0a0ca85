//! Command pipeline
//!
//! Text from a driver becomes a [`Command`], and the executor applies it to
//! the simulation: line -> parse_command -> Command -> CommandExecutor.

pub mod executor;
pub mod parser;

pub use executor::{Command, CommandExecutor, ExecutionResult};
pub use parser::{parse_command, ParseError, COMMAND_HELP};

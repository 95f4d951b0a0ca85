//! Text command parser for interactive drivers

use thiserror::Error;

use crate::command::executor::Command;
use crate::diplomacy::rival::RivalId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing {0}")]
    MissingArgument(&'static str),

    #[error("Not a number: {0}")]
    InvalidNumber(String),
}

pub const COMMAND_HELP: &str = "\
  build <building>          construct one building
  assign <building> <n>     move n idle workers onto a building
  unassign <building> <n>   take n workers off a building
  research <tech>           research a technology
  future                    research the next future technology
  recruit <n>               train n soldiers (50 gold, 1 population each)
  attack|trade|gift <rival> deal with a rival by number
  gather                    work the land by hand
  expand | reclaim          buy more land
  golden | festival | grant imperial projects
  solve | ignore            resolve the active crisis
  dismiss                   close the era announcement
  chronicle | snapshot      ask the narrator for text or an image";

fn number<T: std::str::FromStr>(arg: Option<&str>, what: &'static str) -> Result<T, ParseError> {
    let arg = arg.ok_or(ParseError::MissingArgument(what))?;
    arg.parse()
        .map_err(|_| ParseError::InvalidNumber(arg.to_string()))
}

fn word(arg: Option<&str>, what: &'static str) -> Result<String, ParseError> {
    arg.map(str::to_string).ok_or(ParseError::MissingArgument(what))
}

/// Parse one line of player input
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let mut parts = line.split_whitespace();
    let verb = parts.next().ok_or(ParseError::Empty)?.to_lowercase();
    let first = parts.next();
    let second = parts.next();

    let command = match verb.as_str() {
        "build" | "construct" => Command::Construct {
            building: word(first, "building")?,
        },
        "assign" => Command::AssignWorkers {
            building: word(first, "building")?,
            delta: number(second, "worker count")?,
        },
        "unassign" => Command::AssignWorkers {
            building: word(first, "building")?,
            delta: -number::<i64>(second, "worker count")?,
        },
        "research" => Command::Research {
            tech: word(first, "technology")?,
        },
        "future" => Command::ResearchFuture,
        "recruit" => Command::Recruit {
            amount: number(first, "soldier count")?,
        },
        "attack" => Command::Attack {
            rival: RivalId(number(first, "rival")?),
        },
        "trade" => Command::Trade {
            rival: RivalId(number(first, "rival")?),
        },
        "gift" => Command::Gift {
            rival: RivalId(number(first, "rival")?),
        },
        "gather" | "g" => Command::Gather,
        "expand" => Command::ExpandLand,
        "reclaim" => Command::ReclaimLand,
        "golden" => Command::GoldenAge,
        "festival" => Command::Festival,
        "grant" => Command::ScienceGrant,
        "solve" => Command::SolveCrisis,
        "ignore" => Command::IgnoreCrisis,
        "dismiss" => Command::DismissOverlay,
        "chronicle" => Command::Chronicle,
        "snapshot" => Command::Snapshot,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_arguments() {
        assert_eq!(
            parse_command("build farm"),
            Ok(Command::Construct {
                building: "farm".into()
            })
        );
        assert_eq!(
            parse_command("unassign farm 3"),
            Ok(Command::AssignWorkers {
                building: "farm".into(),
                delta: -3
            })
        );
        assert_eq!(
            parse_command("  ATTACK 2 "),
            Ok(Command::Attack { rival: RivalId(2) })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_command("   "), Err(ParseError::Empty));
        assert_eq!(
            parse_command("assign farm"),
            Err(ParseError::MissingArgument("worker count"))
        );
        assert_eq!(
            parse_command("recruit many"),
            Err(ParseError::InvalidNumber("many".into()))
        );
        assert_eq!(
            parse_command("dance"),
            Err(ParseError::UnknownCommand("dance".into()))
        );
    }
}

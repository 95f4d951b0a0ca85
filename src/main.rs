//! Civ Ascent - Entry Point
//!
//! Interactive driver: the simulation runs in real time on the scheduler
//! while this loop reads commands from stdin.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use civ_ascent::command::{parse_command, COMMAND_HELP};
use civ_ascent::core::config::SimulationConfig;
use civ_ascent::core::error::Result;
use civ_ascent::diplomacy::threat_level;
use civ_ascent::llm::LlmNarrator;
use civ_ascent::persistence::Session;
use civ_ascent::simulation::{Overlay, SchedulerHandle, StatusView};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "civ_ascent=warn".into()))
        .init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load(&PathBuf::from(path))?,
        None => SimulationConfig::default(),
    };
    if config.save_path.is_none() {
        config.save_path = Some(PathBuf::from("civ_save.json"));
    }

    let rt = Runtime::new()?;

    // Narration is optional - the game runs the same without it
    let narrator = LlmNarrator::from_env().ok();
    if narrator.is_none() {
        tracing::warn!("LLM_API_KEY not set - running without narration");
    }

    let session = Session::load_or_new(config);
    let session_id = session.id;
    let handle = rt.block_on(async { SchedulerHandle::spawn(session, Arc::new(narrator)) });

    println!("\n=== CIV ASCENT ===");
    println!("Session {}", session_id);
    println!();
    println!("  status / s      - Show the empire");
    println!("  log [n]         - Show the last n log entries");
    println!("  buildings       - Show buildings and workers");
    println!("  techs           - Show technologies on offer");
    println!("  rivals          - Show rival factions");
    println!("  share           - Print the empire status report");
    println!("  help            - Show game commands");
    println!("  quit / q        - Save and exit");
    println!();

    let mut last_seen = None;
    loop {
        print_new_log(&rt, &handle, &mut last_seen)?;

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        let mut words = input.split_whitespace();

        match words.next() {
            None => continue,
            Some("quit" | "q") => break,
            Some("status" | "s") => display_status(&handle.status()),
            Some("help") => println!("{}", COMMAND_HELP),
            Some("log") => {
                let n = words.next().and_then(|w| w.parse().ok()).unwrap_or(10);
                for entry in rt.block_on(handle.recent_log(n))? {
                    println!("  [{:>5}] {:?}: {}", entry.tick, entry.kind, entry.text);
                }
            }
            Some("share") => println!("{}", rt.block_on(handle.query(|sim| sim.share_text()))?),
            Some("buildings") => {
                let lines = rt.block_on(handle.query(|sim| {
                    let roster = &sim.state.buildings;
                    (0..roster.len())
                        .map(|i| {
                            let def = roster.definition(i);
                            format!(
                                "  {:<16} x{:<3} workers {}/{}  next: {} gold  ({})",
                                def.id,
                                roster.counts[i],
                                roster.assigned_workers[i],
                                roster.capacity(i),
                                civ_ascent::city::gold_cost(roster, i),
                                def.era
                            )
                        })
                        .collect::<Vec<_>>()
                }))?;
                lines.iter().for_each(|l| println!("{}", l));
            }
            Some("techs") => {
                let lines = rt.block_on(handle.query(|sim| {
                    sim.state
                        .research
                        .available(&sim.techs, sim.state.era)
                        .map(|t| format!("  {:<16} {:>6} science  {}", t.id, t.cost, t.description))
                        .collect::<Vec<_>>()
                }))?;
                lines.iter().for_each(|l| println!("{}", l));
            }
            Some("rivals") => {
                let lines = rt.block_on(handle.query(|sim| {
                    let mine = sim.military_strength();
                    sim.state
                        .rivals
                        .iter()
                        .map(|r| {
                            format!(
                                "  #{} {:<20} {:<9} strength {:>6.0}  threat {:?}",
                                r.id,
                                r.name,
                                r.relation.name(),
                                r.strength,
                                threat_level(mine, r)
                            )
                        })
                        .collect::<Vec<_>>()
                }))?;
                lines.iter().for_each(|l| println!("{}", l));
            }
            Some(_) => match parse_command(input) {
                Ok(command) => {
                    let result = rt.block_on(handle.execute(command))?;
                    println!("{}", result.message);
                }
                Err(e) => println!("{} (type 'help' for commands)", e),
            },
        }
    }

    let session = rt.block_on(handle.shutdown())?;
    println!(
        "\nGoodbye! The {} endures after {} ticks.",
        session.simulation.state.era,
        session.simulation.tick()
    );
    Ok(())
}

fn print_new_log(rt: &Runtime, handle: &SchedulerHandle, last_seen: &mut Option<u64>) -> Result<()> {
    let entries = rt.block_on(handle.recent_log(20))?;
    for entry in entries
        .iter()
        .filter(|e| last_seen.map_or(true, |seen| e.id > seen))
    {
        println!("  [{:>5}] {}", entry.tick, entry.text);
    }
    if let Some(last) = entries.last() {
        *last_seen = Some(last.id);
    }
    Ok(())
}

fn display_status(status: &StatusView) {
    let r = &status.resources;
    println!();
    println!(
        "--- Tick {} | {} | {} climate ---",
        status.tick, status.era, status.climate
    );
    println!(
        "  Gold {:.0} ({:+.1}/tick)  Science {:.0} ({:+.1}/tick)",
        r.gold, status.income.gold, r.science, status.income.science
    );
    println!(
        "  Population {:.1} ({:+.2}/tick), idle {}",
        r.population, status.income.population, status.idle_workers
    );
    println!(
        "  Land {}/{}  Soldiers {}  Strength {:.0}",
        r.land, r.max_land, r.soldiers, status.military_strength
    );
    if status.golden_age_active {
        println!("  A Golden Age is under way");
    }
    if let Some(crisis) = &status.crisis {
        println!("  CRISIS: {} - 'solve' or 'ignore'", crisis);
    }
    if let Overlay::EraTransition { era, .. } = status.overlay {
        println!("  Entering the {}! ('dismiss' to continue)", era);
    }
    println!();
}

//! Headless simulation runner
//!
//! Plays a session with a simple greedy policy and prints a summary. Useful
//! for balance checks and for reproducing a seed.

use std::path::PathBuf;
use std::time::Instant;

use civ_ascent::city::construction::{check_construct, gold_cost};
use civ_ascent::city::load_buildings_toml;
use civ_ascent::core::config::SimulationConfig;
use civ_ascent::core::error::Result;
use civ_ascent::persistence::{SaveSnapshot, SaveStore};
use civ_ascent::simulation::{LogKind, Simulation, SimulationEvent};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Headless Civ Ascent - run a session without a driver
#[derive(Parser, Debug)]
#[command(name = "headless_sim")]
#[command(about = "Run a greedy autoplayer for a number of ticks and report the outcome")]
struct Args {
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 2000)]
    ticks: u64,

    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Building catalog (TOML) replacing the built-in buildings
    #[arg(long)]
    buildings: Option<PathBuf>,

    /// Manual gathers per tick
    #[arg(long, default_value_t = 5)]
    gathers: u32,

    /// Write the final snapshot here
    #[arg(long)]
    save: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

#[derive(Serialize, Default)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    era: String,
    population: f64,
    gold: f64,
    science: f64,
    land: u32,
    max_land: u32,
    soldiers: u32,
    buildings: u32,
    technologies: usize,
    crises: usize,
    raids: usize,
    depletions: usize,
    rejections: usize,
    elapsed_ms: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "civ_ascent=info".into()))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    // No narrator is attached here
    config.narration_enabled = false;

    let mut sim = match &args.buildings {
        Some(path) => match load_buildings_toml(path) {
            Ok(definitions) => Simulation::with_buildings(config.clone(), definitions),
            Err(e) => {
                tracing::warn!("Could not load {}: {}. Using built-in buildings.", path.display(), e);
                Simulation::new(config.clone())
            }
        },
        None => Simulation::new(config.clone()),
    };

    let start = Instant::now();
    let mut summary = RunSummary {
        seed: config.seed,
        ..Default::default()
    };

    while sim.tick() < args.ticks {
        autoplay(&mut sim, args.gathers);
        if let civ_ascent::simulation::FireOutcome::Ticked(events) = sim.fire() {
            for event in events {
                match event {
                    SimulationEvent::CrisisStarted { .. } => summary.crises += 1,
                    SimulationEvent::Raided(_) => summary.raids += 1,
                    SimulationEvent::BuildingDepleted { .. } => summary.depletions += 1,
                    _ => {}
                }
            }
        }
    }

    let state = &sim.state;
    summary.ticks = state.tick;
    summary.era = state.era.to_string();
    summary.population = state.resources.population.floor();
    summary.gold = state.resources.gold.floor();
    summary.science = state.resources.science.floor();
    summary.land = state.resources.land;
    summary.max_land = state.resources.max_land;
    summary.soldiers = state.resources.soldiers;
    summary.buildings = state.buildings.counts.iter().sum();
    summary.technologies = state.research.unlocked.len();
    summary.rejections = state.log.of_kind(LogKind::Warning).count();
    summary.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    if let Some(path) = &args.save {
        let snapshot = SaveSnapshot::capture(&sim.state, Uuid::new_v4());
        SaveStore::new(path).write_blocking(&snapshot)?;
        tracing::info!("Snapshot written to {}", path.display());
    }

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// One decision round of the greedy policy
///
/// Only acts on what is affordable right now, so it never trips a rejection
/// except for crisis costs it cannot meet.
fn autoplay(sim: &mut Simulation, gathers: u32) {
    if sim.state.overlay.is_blocking() {
        sim.dismiss_overlay();
    }

    for _ in 0..gathers {
        sim.gather();
    }

    if let Some(crisis) = &sim.state.active_crisis {
        let affordable = civ_ascent::simulation::crisis::can_afford(&sim.state.resources, &crisis.cost);
        let _ = if affordable {
            sim.solve_crisis()
        } else {
            sim.ignore_crisis()
        };
    }

    let science = sim.state.resources.science;
    let next_tech = sim
        .state
        .research
        .available(&sim.techs, sim.state.era)
        .filter(|t| t.cost <= science)
        .min_by(|a, b| a.cost.total_cmp(&b.cost))
        .map(|t| t.id.clone());
    if let Some(id) = next_tech {
        let _ = sim.research(&id);
    }

    let state = &sim.state;
    let cheapest = (0..state.buildings.len())
        .filter(|&i| {
            let id = &state.buildings.definition(i).id;
            check_construct(&state.resources, &state.buildings, &state.research, state.era, id)
                .is_ok()
        })
        .min_by(|&a, &b| {
            gold_cost(&state.buildings, a).total_cmp(&gold_cost(&state.buildings, b))
        })
        .map(|i| state.buildings.definition(i).id.clone());
    if let Some(id) = cheapest {
        let _ = sim.construct(&id);
    }

    staff_idle_workers(sim);
}

fn staff_idle_workers(sim: &mut Simulation) {
    for i in 0..sim.state.buildings.len() {
        let idle = sim.state.idle_workers();
        if idle <= 0 {
            return;
        }
        let roster = &sim.state.buildings;
        let spare = roster.capacity(i).saturating_sub(roster.assigned_workers[i]) as i64;
        if spare > 0 {
            let id = roster.definition(i).id.clone();
            let _ = sim.assign_workers(&id, spare.min(idle));
        }
    }
}

fn print_summary(s: &RunSummary) {
    println!("Civ Ascent headless run (seed {})", s.seed);
    println!("==================================");
    println!("Ticks:        {}", s.ticks);
    println!("Era:          {}", s.era);
    println!("Population:   {}", s.population);
    println!("Gold:         {}", s.gold);
    println!("Science:      {}", s.science);
    println!("Land:         {} / {}", s.land, s.max_land);
    println!("Soldiers:     {}", s.soldiers);
    println!("Buildings:    {}", s.buildings);
    println!("Technologies: {}", s.technologies);
    println!();
    println!("Crises: {}  Raids: {}  Depletions: {}  Rejections: {}",
        s.crises, s.raids, s.depletions, s.rejections);
    println!("Actual time: {:.2}ms", s.elapsed_ms);
}

//! # Drift Encounter Simulator
//!
//! Runs the encounter engine headless against the sandbox world: a scripted
//! player stands on open land, turns toward the nearest creature, swings on a
//! fixed rhythm, and answers every Resolve prompt with the same choice.

use clap::Parser;
use drift_encounter::sandbox::Sandbox;
use drift_encounter::{
    ArchetypeCatalog, Collaborators, EncounterConfig, EncounterEngine, EncounterError,
    EncounterResult, Facing, JsonFileStore, PlayerPort, ResolveChoice, Vec2,
};
use log::{info, LevelFilter};
use std::path::PathBuf;

/// Command line arguments for the encounter simulator.
#[derive(Parser, Debug)]
#[command(name = "drift-encounter")]
#[command(about = "Headless simulator for the Drift Fauna encounter engine")]
#[command(version)]
struct Args {
    /// Random seed for the encounter
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 3600)]
    frames: u64,

    /// Simulated frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Frames between swings
    #[arg(long, default_value_t = 20)]
    swing_every: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Encounter configuration JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Archetype catalog JSON
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Statistics file; kept in memory when absent
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Answer to every Resolve prompt (disperse, stabilize, release)
    #[arg(long, default_value = "disperse")]
    choice: ResolveChoice,
}

fn main() -> EncounterResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;

    info!("Starting Drift Encounter simulator v{}", drift_encounter::VERSION);

    let mut config = match &args.config {
        Some(path) => EncounterConfig::from_json_file(path)?,
        None => EncounterConfig::new(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let catalog = match &args.catalog {
        Some(path) => ArchetypeCatalog::from_json_file(path)?,
        None => ArchetypeCatalog::standard(),
    };

    if args.fps == 0 {
        return Err(EncounterError::InvalidConfig(
            "fps must be positive".to_string(),
        ));
    }

    let sandbox = Sandbox::new();
    let mut ports: Collaborators = sandbox.collaborators();
    if let Some(path) = &args.stats {
        ports.stats = Box::new(JsonFileStore::new(path));
    }

    let mut engine = EncounterEngine::new(catalog, config, ports)?;
    run(&args, &sandbox, &mut engine);
    report(&sandbox, &engine);
    Ok(())
}

/// Initializes `env_logger` at the given level; `RUST_LOG` refines it.
fn initialize_logging(log_level: &str) -> EncounterResult<()> {
    let level: LevelFilter = log_level
        .parse()
        .map_err(|_| EncounterError::InvalidConfig(format!("unknown log level '{}'", log_level)))?;

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .init();
    Ok(())
}

fn run(args: &Args, sandbox: &Sandbox, engine: &mut EncounterEngine) {
    let dt = 1.0 / args.fps as f32;

    for frame in 0..args.frames {
        if engine.is_suspended() {
            engine.commit_choice(args.choice);
        }

        if let Some(facing) = facing_toward_nearest(sandbox, engine) {
            sandbox.player.borrow_mut().set_facing(facing);
            if args.swing_every > 0 && frame % args.swing_every == 0 {
                engine.request_attack();
            }
        }

        engine.update(dt);

        for event in engine.drain_events() {
            log::trace!("frame {}: {:?}", frame, event);
        }
    }
}

/// Facing along the dominant axis toward the closest live enemy.
fn facing_toward_nearest(sandbox: &Sandbox, engine: &EncounterEngine) -> Option<Facing> {
    let player = sandbox.player.center();
    let nearest = engine
        .enemies()
        .iter()
        .filter(|e| e.is_alive())
        .map(|e| e.center() - player)
        .min_by(|a, b| a.length().total_cmp(&b.length()))?;

    Some(dominant_facing(nearest))
}

fn dominant_facing(offset: Vec2) -> Facing {
    if offset.x.abs() >= offset.y.abs() {
        if offset.x >= 0.0 {
            Facing::Right
        } else {
            Facing::Left
        }
    } else if offset.y >= 0.0 {
        Facing::Down
    } else {
        Facing::Up
    }
}

fn report(sandbox: &Sandbox, engine: &EncounterEngine) {
    let ledger = sandbox.ledger.snapshot();
    let stats = engine.stats();
    let continuity: u32 = ledger.progress.iter().map(|(amount, _)| amount).sum();

    println!("Frames simulated:   {}", engine.frame());
    println!("Live enemies:       {}", engine.live_enemy_count());
    println!("Kills (all time):   {}", stats.total_kills);
    for (archetype, kills) in &stats.kills_by_archetype {
        println!("  {:<16}  {}", archetype, kills);
    }
    println!(
        "Choices:            disperse {} / stabilize {} / release {}",
        stats.choices.disperse, stats.choices.stabilize, stats.choices.release
    );
    match stats.choices.dominant() {
        Some(choice) => println!("Dominant tendency:  {}", choice),
        None => println!("Dominant tendency:  none"),
    }
    println!("Brine Tokens:       {}", ledger.currency);
    println!("Continuity:         {}", continuity);
    println!("Pickups placed:     {}", ledger.items.len());
    println!("Damage taken:       {}", sandbox.player.borrow().damage_taken());
}

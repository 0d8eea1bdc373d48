//! Headless Sky Pecker host
//!
//! Runs one autopilot episode as fast as possible and prints the final
//! report as JSON. Useful for soak-testing seeds and tuning.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use sky_pecker::sim::tables::ARCHETYPES;
use sky_pecker::{
    EpisodePhase, GameEvent, GameMode, QualityPreset, RunConfig, Simulation, TickInput,
};

/// Run a headless Sky Pecker episode
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run config JSON file (flags below override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Archetype index
    #[arg(short, long)]
    archetype: Option<usize>,

    /// Play the relaxed ruleset
    #[arg(long)]
    relaxed: bool,

    /// Quality preset (low, medium, high)
    #[arg(short, long)]
    quality: Option<String>,

    /// Accept the continue offer after the first fatal hit
    #[arg(long)]
    continue_run: bool,

    /// Stop after this many ticks even if the episode is still running
    #[arg(short, long, default_value_t = 60 * 60 * 10)]
    ticks: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(args: &Args) -> anyhow::Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            RunConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => RunConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(archetype) = args.archetype {
        config.archetype = archetype;
    }
    if args.relaxed {
        config.mode = GameMode::Relaxed;
    }
    if let Some(quality) = &args.quality {
        config.quality = QualityPreset::parse(quality)
            .with_context(|| format!("unknown quality preset '{quality}'"))?;
    }
    if args.continue_run {
        config.continue_available = true;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    log::info!(
        "Sky Pecker (headless) starting: {} seed={}",
        ARCHETYPES[config.archetype].name,
        config.seed
    );

    let mut sim = Simulation::new(config);
    sim.reset();

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };
    let started = Instant::now();
    let mut last_frame = Instant::now();
    let mut report = None;

    for _ in 0..args.ticks {
        let now = Instant::now();
        let frame_time = now - last_frame;
        last_frame = now;
        sim.tick(&TickInput {
            frame_time: Some(frame_time),
            ..input.clone()
        });

        for event in sim.drain_events() {
            match event {
                GameEvent::ContinueRunRequested => {
                    sim.continue_run();
                }
                GameEvent::EpisodeEnded(ended) => report = Some(ended),
                other => log::debug!("{other:?}"),
            }
        }
        if sim.phase == EpisodePhase::Terminated {
            break;
        }
    }

    let report = report.unwrap_or_else(|| sim.report());
    log::info!(
        "Finished {} ticks in {:.2?}",
        report.ticks,
        started.elapsed()
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

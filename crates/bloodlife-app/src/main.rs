use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use bloodlife_app::ControlRuntime;
use bloodlife_core::GridConfig;

/// Headless runner for the predator-extended game of life.
#[derive(Debug, Parser)]
#[command(name = "bloodlife", version, about)]
struct Cli {
    /// Field width in cells.
    #[arg(long, default_value_t = 160)]
    width: u32,
    /// Field height in cells.
    #[arg(long, default_value_t = 100)]
    height: u32,
    /// Randomize denominator: each cell starts alive with chance 1/N.
    #[arg(long, default_value_t = 10)]
    alive_chance: u64,
    /// Predator-conversion denominator: a survivor turns with chance 1/N.
    #[arg(long, default_value_t = 500)]
    bloody_chance: u64,
    /// RNG seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,
    /// Delay between background steps, in milliseconds.
    #[arg(long, default_value_t = 50)]
    delay_ms: u64,
    /// Stop after this many generations unless the field stabilizes first.
    #[arg(long, default_value_t = 1_000)]
    generations: u64,
    /// Pattern file loaded (centered) before the run starts.
    #[arg(long)]
    load: Option<PathBuf>,
    /// Write the final field to this pattern file.
    #[arg(long)]
    save: Option<PathBuf>,
    /// Print the final snapshot as JSON on stdout.
    #[arg(long)]
    json: bool,
    /// Start from an empty field instead of a random one.
    #[arg(long)]
    empty: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = GridConfig {
        width: cli.width,
        height: cli.height,
        alive_chance: cli.alive_chance,
        bloody_chance: cli.bloody_chance,
        rng_seed: cli.seed,
        step_delay_ms: cli.delay_ms,
    };
    let runtime = ControlRuntime::start(&config).context("failed to start simulation")?;
    let handle = runtime.handle().clone();

    if let Some(path) = &cli.load {
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read pattern file {}", path.display()))?;
        handle.load(&bytes)?;
        info!(path = %path.display(), "pattern loaded");
    } else if !cli.empty {
        handle.randomize()?;
    }

    handle.set_paused(false);
    info!(
        width = cli.width,
        height = cli.height,
        delay_ms = cli.delay_ms,
        "simulation running"
    );

    loop {
        thread::sleep(Duration::from_millis(50));
        let snapshot = handle.snapshot()?;
        if snapshot.stable {
            info!(generation = snapshot.generation, "field reached a steady state");
            break;
        }
        if snapshot.generation >= cli.generations {
            break;
        }
    }
    handle.set_paused(true);

    let snapshot = handle.snapshot()?;
    if let Some(path) = &cli.save {
        let bytes = handle.save()?;
        fs::write(path, bytes)
            .with_context(|| format!("failed to write pattern file {}", path.display()))?;
        info!(path = %path.display(), "field saved");
    }
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    info!(
        generation = snapshot.generation,
        live = snapshot.live_cells(),
        stable = snapshot.stable,
        "simulation finished"
    );

    runtime.shutdown();
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

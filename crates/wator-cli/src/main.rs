//! Command-line front end for the Wa-Tor simulator.

mod bench;
mod render;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use wator_core::{RawConfig, SimConfig};
use wator_world::{Observer, Simulation, World};

#[derive(Parser, Debug)]
#[command(name = "wator")]
#[command(version)]
#[command(about = "Wa-Tor predator-prey simulation on a toroidal ocean")]
struct Cli {
    /// Initial number of sharks
    #[arg(value_name = "NumShark", allow_negative_numbers = true)]
    num_shark: i64,

    /// Initial number of fish
    #[arg(value_name = "NumFish", allow_negative_numbers = true)]
    num_fish: i64,

    /// Chronons a fish must survive before it breeds
    #[arg(value_name = "FishBreed", allow_negative_numbers = true)]
    fish_breed: i64,

    /// Chronons a shark must survive before it breeds
    #[arg(value_name = "SharkBreed", allow_negative_numbers = true)]
    shark_breed: i64,

    /// Shark energy on spawn and after eating
    #[arg(value_name = "Starve", allow_negative_numbers = true)]
    starve: i64,

    /// Side length of the square grid
    #[arg(value_name = "GridSize", allow_negative_numbers = true)]
    grid_size: i64,

    /// Number of step workers
    #[arg(value_name = "Threads", allow_negative_numbers = true)]
    threads: i64,

    /// Stop after this many chronons (0 runs until a species dies out)
    #[arg(long, default_value_t = 0)]
    chronons: u64,

    /// Render the grid every N chronons (0 disables rendering)
    #[arg(long = "draw", value_name = "N", default_value_t = 1)]
    draw_every: u64,

    /// Append a benchmark row to this CSV file
    #[arg(long = "bench", value_name = "PATH")]
    bench_file: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
}

impl From<Cli> for RawConfig {
    fn from(cli: Cli) -> Self {
        RawConfig {
            num_shark: cli.num_shark,
            num_fish: cli.num_fish,
            fish_breed: cli.fish_breed,
            shark_breed: cli.shark_breed,
            starve: cli.starve,
            grid_size: cli.grid_size,
            threads: cli.threads,
            chronons: cli.chronons,
            draw_every: cli.draw_every,
            bench_file: cli.bench_file,
            seed: cli.seed,
        }
    }
}

/// Prints each drawn generation to stdout
struct Console;

impl Observer for Console {
    fn on_draw(&mut self, chronon: u64, world: &World) {
        print!("{}", render::render(world, chronon));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SimConfig::try_from(RawConfig::from(cli)).context("Invalid configuration")?;

    telemetry::init_telemetry()?;

    let json = serde_json::to_string(&config).map_err(wator_core::Error::from)?;
    info!(config = %json, "Configuration loaded");

    let mut simulation = Simulation::new(config)?;
    let result = simulation.run(&mut Console)?;

    println!(
        "Threads: {}  Time: {:?}",
        simulation.config().threads,
        result.elapsed
    );

    if let Some(path) = &simulation.config().bench_file {
        match bench::append_run(path, simulation.config(), result.elapsed) {
            Ok(()) => info!(path = %path.display(), "Benchmark row written"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to write benchmark row"),
        }
    }

    Ok(())
}

//! Run driver: advances the world chronon by chronon until a species dies
//! out or the chronon limit is reached.

use crate::step::{step, StepStats};
use crate::world::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, instrument};
use wator_core::{Census, Result, SimConfig};

/// How often a population snapshot is logged
const SNAPSHOT_INTERVAL: u64 = 100;

/// Hooks for collaborators that watch a run (renderer, progress output)
pub trait Observer {
    /// Called after every chronon
    fn on_step(&mut self, _chronon: u64, _world: &World, _stats: &StepStats) {}

    /// Called every `draw_every` chronons
    fn on_draw(&mut self, _chronon: u64, _world: &World) {}
}

impl Observer for () {}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    FishExtinct,
    SharksExtinct,
    ChrononLimit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub seed: u64,
    pub chronons: u64,
    pub stop_reason: StopReason,
    pub census: Census,
    /// Births and deaths summed over the run
    pub totals: StepStats,
    pub elapsed: Duration,
}

pub struct Simulation {
    world: World,
    config: SimConfig,
    seed: u64,
    chronon: u64,
    totals: StepStats,
}

impl Simulation {
    /// Validate the config, then create and populate the initial world
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut world = World::new(&config);
        let placed = world.populate(config.num_shark, config.num_fish, &mut rng);

        info!(
            seed,
            grid_size = config.grid_size,
            threads = config.effective_threads(),
            fish = placed.fish,
            sharks = placed.sharks,
            "Simulation created"
        );

        Ok(Self::from_world(world, config, seed))
    }

    /// Start from an existing world, e.g. a hand-built fixture
    pub fn from_world(world: World, config: SimConfig, seed: u64) -> Self {
        Self {
            world,
            config,
            seed,
            chronon: 0,
            totals: StepStats::default(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn chronon(&self) -> u64 {
        self.chronon
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Advance one chronon, replacing the current world with the next one
    pub fn step(&mut self) -> Result<StepStats> {
        let chronon = self.chronon + 1;
        let (next, stats) = step(&self.world, self.config.threads, chronon, self.seed)?;

        self.world = next;
        self.chronon = chronon;
        self.totals += stats;
        Ok(stats)
    }

    /// Check the stopping conditions for the current generation
    pub fn stop_reason(&self) -> Option<StopReason> {
        let census = self.world.census();
        if census.is_extinct() {
            Some(if census.fish == 0 {
                StopReason::FishExtinct
            } else {
                StopReason::SharksExtinct
            })
        } else if self.config.chronons > 0 && self.chronon >= self.config.chronons {
            Some(StopReason::ChrononLimit)
        } else {
            None
        }
    }

    /// Run until a species dies out or the chronon limit is reached
    #[instrument(skip(self, observer), fields(seed = self.seed, limit = self.config.chronons))]
    pub fn run<O: Observer + ?Sized>(&mut self, observer: &mut O) -> Result<SimulationResult> {
        info!("Starting simulation");
        let start = Instant::now();

        let stop_reason = loop {
            let stats = self.step()?;
            observer.on_step(self.chronon, &self.world, &stats);

            if self.config.draw_every > 0 && self.chronon % self.config.draw_every == 0 {
                observer.on_draw(self.chronon, &self.world);
            }

            if self.chronon % SNAPSHOT_INTERVAL == 0 {
                self.emit_population_metrics();
            }

            if let Some(reason) = self.stop_reason() {
                break reason;
            }
        };

        let result = SimulationResult {
            seed: self.seed,
            chronons: self.chronon,
            stop_reason,
            census: self.world.census(),
            totals: self.totals,
            elapsed: start.elapsed(),
        };
        self.emit_summary(&result);
        Ok(result)
    }

    fn emit_population_metrics(&self) {
        let census = self.world.census();
        info!(
            event = "population_metrics",
            chronon = self.chronon,
            fish = census.fish,
            sharks = census.sharks,
            fish_births = self.totals.fish_births,
            shark_births = self.totals.shark_births,
            "Population metrics snapshot"
        );
    }

    fn emit_summary(&self, result: &SimulationResult) {
        info!(
            event = "run_summary",
            chronons = result.chronons,
            stop_reason = ?result.stop_reason,
            fish = result.census.fish,
            sharks = result.census.sharks,
            fish_births = result.totals.fish_births,
            shark_births = result.totals.shark_births,
            starved = result.totals.starved,
            eaten = result.totals.eaten,
            blocked_moves = result.totals.blocked_moves,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "Simulation complete"
        );
    }
}

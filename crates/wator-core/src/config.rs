//! Configuration types for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Unvalidated simulation parameters as they arrive from the command line.
///
/// Values are kept signed so that a negative count can be reported against
/// the bound it violates instead of failing to parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    pub num_shark: i64,
    pub num_fish: i64,
    pub fish_breed: i64,
    pub shark_breed: i64,
    pub starve: i64,
    pub grid_size: i64,
    pub threads: i64,
    pub chronons: u64,
    pub draw_every: u64,
    pub bench_file: Option<PathBuf>,
    pub seed: Option<u64>,
}

/// Validated, immutable simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Initial number of sharks
    pub num_shark: usize,
    /// Initial number of fish
    pub num_fish: usize,
    /// Chronons a fish must survive before it breeds
    pub fish_breed: u32,
    /// Chronons a shark must survive before it breeds
    pub shark_breed: u32,
    /// Shark energy on spawn and after eating
    pub starve: i32,
    /// Side length of the square grid
    pub grid_size: usize,
    /// Number of step workers
    pub threads: usize,
    /// Chronon limit (0 = run until extinction)
    pub chronons: u64,
    /// Render every N chronons (0 = never)
    pub draw_every: u64,
    /// Append-only benchmark CSV
    pub bench_file: Option<PathBuf>,
    /// Top-level random seed
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_shark: 50,
            num_fish: 200,
            fish_breed: 3,
            shark_breed: 8,
            starve: 4,
            grid_size: 40,
            threads: 1,
            chronons: 0,
            draw_every: 1,
            bench_file: None,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Check every bound, reporting the first violated field
    pub fn validate(&self) -> Result<()> {
        if self.fish_breed == 0 {
            return Err(Error::invalid("FishBreed", "must be greater than 0"));
        }
        if self.shark_breed == 0 {
            return Err(Error::invalid("SharkBreed", "must be greater than 0"));
        }
        if self.starve <= 0 {
            return Err(Error::invalid(
                "Starve",
                format!("must be greater than 0 (got {})", self.starve),
            ));
        }
        if self.grid_size <= 1 {
            return Err(Error::invalid(
                "GridSize",
                format!("must be greater than 1 (got {})", self.grid_size),
            ));
        }
        if self.grid_size.checked_mul(self.grid_size).is_none() {
            return Err(Error::invalid(
                "GridSize",
                format!("is too large (got {})", self.grid_size),
            ));
        }
        if self.threads == 0 {
            return Err(Error::invalid("Threads", "must be 1 or greater"));
        }
        Ok(())
    }

    /// Number of row partitions a step actually uses
    pub fn effective_threads(&self) -> usize {
        self.threads.clamp(1, self.grid_size.max(1))
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| Error::invalid(field, format!("must be 0 or greater (got {value})")))
}

fn positive<T: TryFrom<i64>>(field: &'static str, value: i64) -> Result<T> {
    if value <= 0 {
        return Err(Error::invalid(
            field,
            format!("must be greater than 0 (got {value})"),
        ));
    }
    T::try_from(value).map_err(|_| Error::invalid(field, format!("is too large (got {value})")))
}

impl TryFrom<RawConfig> for SimConfig {
    type Error = Error;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let num_shark = non_negative("NumShark", raw.num_shark)?;
        let num_fish = non_negative("NumFish", raw.num_fish)?;
        let fish_breed = positive("FishBreed", raw.fish_breed)?;
        let shark_breed = positive("SharkBreed", raw.shark_breed)?;
        let starve = positive("Starve", raw.starve)?;

        if raw.grid_size <= 1 {
            return Err(Error::invalid(
                "GridSize",
                format!("must be greater than 1 (got {})", raw.grid_size),
            ));
        }
        let grid_size = usize::try_from(raw.grid_size)
            .map_err(|_| Error::invalid("GridSize", "is too large"))?;

        if raw.threads < 1 {
            return Err(Error::invalid(
                "Threads",
                format!("must be 1 or greater (got {})", raw.threads),
            ));
        }
        let threads =
            usize::try_from(raw.threads).map_err(|_| Error::invalid("Threads", "is too large"))?;

        let config = Self {
            num_shark,
            num_fish,
            fish_breed,
            shark_breed,
            starve,
            grid_size,
            threads,
            chronons: raw.chronons,
            draw_every: raw.draw_every,
            bench_file: raw.bench_file,
            seed: raw.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

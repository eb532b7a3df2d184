//! Append-only benchmark log.

use std::fs::OpenOptions;
use std::io::{Result, Write};
use std::path::Path;
use std::time::Duration;
use wator_core::SimConfig;

pub const HEADER: &str =
    "Threads,GridSize,NumFish,NumShark,FishBreed,SharkBreed,Starve,Chronons,TimeMillis";

/// Append one row for a finished run, writing the header first if the file
/// is new or empty
pub fn append_run<P: AsRef<Path>>(path: P, config: &SimConfig, elapsed: Duration) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    if file.metadata()?.len() == 0 {
        writeln!(file, "{HEADER}")?;
    }

    writeln!(
        file,
        "{},{},{},{},{},{},{},{},{}",
        config.threads,
        config.grid_size,
        config.num_fish,
        config.num_shark,
        config.fish_breed,
        config.shark_breed,
        config.starve,
        config.chronons,
        elapsed.as_millis(),
    )
}

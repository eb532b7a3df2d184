//! ASCII rendering of a world.

use std::fmt::Write;
use wator_world::World;

/// Render one generation: a `Chronon: N` header, one glyph per cell, then
/// the population counts and a blank line
pub fn render(world: &World, chronon: u64) -> String {
    let size = world.size();
    let mut out = String::with_capacity((size + 1) * size + 64);

    let _ = writeln!(out, "Chronon: {chronon}");
    for row in 0..size {
        out.extend(world.grid().row(row).iter().map(|cell| cell.entity.glyph()));
        out.push('\n');
    }

    let census = world.census();
    let _ = writeln!(out, "Fish: {}  Sharks: {}", census.fish, census.sharks);
    out.push('\n');
    out
}

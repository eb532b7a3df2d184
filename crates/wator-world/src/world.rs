//! The ocean: a grid plus the rule parameters it was created with.

use crate::grid::Grid;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wator_core::{Cell, Census, Coord, Entity, SimConfig};

/// One generation of the simulation.
///
/// The breed thresholds and starvation energy are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    grid: Grid,
    fish_breed: u32,
    shark_breed: u32,
    starve: i32,
}

impl World {
    /// Create an empty world sized and parameterised from the config
    pub fn new(config: &SimConfig) -> Self {
        Self::from_grid(
            Grid::new(config.grid_size),
            config.fish_breed,
            config.shark_breed,
            config.starve,
        )
    }

    pub fn from_grid(grid: Grid, fish_breed: u32, shark_breed: u32, starve: i32) -> Self {
        Self {
            grid,
            fish_breed,
            shark_breed,
            starve,
        }
    }

    /// Randomly scatter sharks, then fish, over distinct cells.
    ///
    /// Every coordinate is used at most once. When the grid runs out of
    /// coordinates the remaining creatures are not placed. Returns what was
    /// actually placed.
    pub fn populate(&mut self, num_shark: usize, num_fish: usize, rng: &mut ChaCha8Rng) -> Census {
        let mut positions: Vec<Coord> = (0..self.grid.len())
            .map(|i| self.grid.coord_of(i))
            .collect();
        positions.shuffle(rng);

        let mut slots = positions.into_iter();
        let mut placed = Census::default();

        for pos in slots.by_ref().take(num_shark) {
            self.grid.set(pos, Cell::shark(0, self.starve));
            placed.sharks += 1;
        }

        for pos in slots.take(num_fish) {
            if self.grid.get(pos).is_empty() {
                self.grid.set(pos, Cell::fish(0));
                placed.fish += 1;
            }
        }

        if placed.sharks < num_shark || placed.fish < num_fish {
            warn!(
                requested_sharks = num_shark,
                requested_fish = num_fish,
                placed_sharks = placed.sharks,
                placed_fish = placed.fish,
                cells = self.grid.len(),
                "Grid too small for requested population, excess creatures not placed"
            );
        } else {
            debug!(sharks = placed.sharks, fish = placed.fish, "World populated");
        }

        placed
    }

    pub fn census(&self) -> Census {
        self.grid
            .cells()
            .iter()
            .fold(Census::default(), |mut census, cell| {
                match cell.entity {
                    Entity::Fish => census.fish += 1,
                    Entity::Shark => census.sharks += 1,
                    Entity::Empty => {}
                }
                census
            })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn get(&self, coord: Coord) -> &Cell {
        self.grid.get(coord)
    }

    /// Place a cell directly. Only used while setting up a world.
    pub fn set(&mut self, coord: Coord, cell: Cell) {
        self.grid.set(coord, cell);
    }

    pub fn fish_breed(&self) -> u32 {
        self.fish_breed
    }

    pub fn shark_breed(&self) -> u32 {
        self.shark_breed
    }

    pub fn starve(&self) -> i32 {
        self.starve
    }
}

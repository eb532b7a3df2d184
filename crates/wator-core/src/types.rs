//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What occupies a cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entity {
    #[default]
    Empty,
    Fish,
    Shark,
}

impl Entity {
    pub fn is_empty(&self) -> bool {
        matches!(self, Entity::Empty)
    }

    /// Glyph used by the ASCII renderer
    pub fn glyph(&self) -> char {
        match self {
            Entity::Empty => '~',
            Entity::Fish => 'F',
            Entity::Shark => 'S',
        }
    }
}

/// State of a single grid tile.
///
/// `breed_timer` counts chronons since the occupant last reproduced.
/// `energy` is only read for sharks. Empty cells keep both at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub entity: Entity,
    pub breed_timer: u32,
    pub energy: i32,
}

impl Cell {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fish(breed_timer: u32) -> Self {
        Self {
            entity: Entity::Fish,
            breed_timer,
            energy: 0,
        }
    }

    pub fn shark(breed_timer: u32, energy: i32) -> Self {
        Self {
            entity: Entity::Shark,
            breed_timer,
            energy,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entity.is_empty()
    }
}

/// Grid coordinate, always within `[0, size)` on both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Per-species head count of a world
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    pub fish: usize,
    pub sharks: usize,
}

impl Census {
    pub fn total(&self) -> usize {
        self.fish + self.sharks
    }

    /// True when either species has died out
    pub fn is_extinct(&self) -> bool {
        self.fish == 0 || self.sharks == 0
    }
}

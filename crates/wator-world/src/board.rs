//! Write side of a step: single-acquisition cell slots for the next
//! generation, plus the predation ledger over the current one.
//!
//! Every worker shares one `ClaimBoard` by reference. A slot in the next
//! generation can be claimed exactly once; later claims fail and the caller
//! has to pick another destination or stay put. Sharks act before fish, and
//! a fish marked taken by a shark does not act at all.

use crate::grid::Grid;
use crate::world::World;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use wator_core::{Cell, Coord};

/// Shared, lock-free staging area for the next generation
pub struct ClaimBoard {
    size: usize,
    next: Vec<OnceLock<Cell>>,
    taken: Vec<AtomicBool>,
}

// Shared across scoped step workers.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<ClaimBoard>();
};

impl ClaimBoard {
    pub fn new(size: usize) -> Self {
        let cells = size * size;
        Self {
            size,
            next: (0..cells).map(|_| OnceLock::new()).collect(),
            taken: (0..cells).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    fn index(&self, coord: Coord) -> usize {
        coord.row * self.size + coord.col
    }

    /// Claim `coord` in the next generation. Returns false if another
    /// organism got there first; the stored cell is left untouched.
    pub fn claim(&self, coord: Coord, cell: Cell) -> bool {
        self.next[self.index(coord)].set(cell).is_ok()
    }

    /// A shark takes the fish at `coord`. Fails if another shark took it.
    pub fn take_prey(&self, coord: Coord) -> bool {
        self.taken[self.index(coord)]
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether a shark took the fish at `coord` this chronon
    pub fn is_taken(&self, coord: Coord) -> bool {
        self.taken[self.index(coord)].load(Ordering::Acquire)
    }

    /// Assemble the next world. Unclaimed slots become empty cells.
    pub fn into_world(self, like: &World) -> World {
        let cells: Vec<Cell> = self
            .next
            .into_iter()
            .map(|slot| slot.into_inner().unwrap_or_default())
            .collect();
        World::from_grid(
            Grid::from_raw(self.size, cells),
            like.fish_breed(),
            like.shark_breed(),
            like.starve(),
        )
    }
}

//! Per-species rules.
//!
//! Each rule reads only the current world and stages its effect through the
//! [`ClaimBoard`]. A destination that cannot be claimed is dropped from the
//! candidate list and the draw is repeated; when nothing can be claimed the
//! organism stays where it is.

use crate::board::ClaimBoard;
use crate::world::World;
use rand::Rng;
use tracing::trace;
use wator_core::{Cell, Coord, Entity};

/// What happened to an organism during one chronon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Moved to a neighbouring cell
    Moved,
    /// Moved and left an offspring behind
    Bred,
    /// Could not move
    Stayed,
    /// Shark ran out of energy
    Starved,
    /// Fish was taken by a shark before it could act
    Eaten,
}

/// Outcome of one rule evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    /// The shark took a fish this chronon
    pub ate: bool,
    /// Destinations lost to another organism's claim
    pub blocked: u32,
}

impl Resolution {
    fn new(outcome: Outcome, blocked: u32) -> Self {
        Self {
            outcome,
            ate: false,
            blocked,
        }
    }
}

fn neighbors_holding(current: &World, coord: Coord, entity: Entity) -> Vec<Coord> {
    current
        .grid()
        .neighbors(coord)
        .into_iter()
        .filter(|n| current.get(*n).entity == entity)
        .collect()
}

/// Draw uniformly among `candidates` until `try_claim` accepts one.
/// Rejected candidates are removed. Returns the accepted coordinate and the
/// number of rejections.
fn claim_any<R, F>(candidates: &mut Vec<Coord>, rng: &mut R, mut try_claim: F) -> (Option<Coord>, u32)
where
    R: Rng + ?Sized,
    F: FnMut(Coord) -> bool,
{
    let mut blocked = 0;
    while !candidates.is_empty() {
        let dest = candidates[rng.gen_range(0..candidates.len())];
        if try_claim(dest) {
            return (Some(dest), blocked);
        }
        blocked += 1;
        // on tiny grids the same cell can appear twice
        candidates.retain(|c| *c != dest);
    }
    (None, blocked)
}

fn stay(board: &ClaimBoard, coord: Coord, cell: Cell) {
    // Nothing but this organism can target its own origin.
    let placed = board.claim(coord, cell);
    debug_assert!(placed, "origin {coord} claimed by another organism");
}

/// Fish: move to a random empty neighbour, breeding on the way out once the
/// breed timer is due. Runs only after every shark has acted.
pub fn step_fish<R: Rng + ?Sized>(
    current: &World,
    board: &ClaimBoard,
    coord: Coord,
    rng: &mut R,
) -> Resolution {
    if board.is_taken(coord) {
        return Resolution::new(Outcome::Eaten, 0);
    }

    let timer = current.get(coord).breed_timer + 1;
    let breeds = timer >= current.fish_breed();
    let parent = if breeds { Cell::fish(0) } else { Cell::fish(timer) };

    let mut candidates = neighbors_holding(current, coord, Entity::Empty);
    let (dest, blocked) = claim_any(&mut candidates, rng, |dest| board.claim(dest, parent));

    if blocked > 0 {
        trace!(%coord, blocked, moved = dest.is_some(), "Fish move blocked");
    }

    match dest {
        Some(_) if breeds => {
            stay(board, coord, Cell::fish(0));
            Resolution::new(Outcome::Bred, blocked)
        }
        Some(_) => Resolution::new(Outcome::Moved, blocked),
        None => {
            stay(board, coord, Cell::fish(timer));
            Resolution::new(Outcome::Stayed, blocked)
        }
    }
}

/// Shark: starve, else eat a neighbouring fish, else move to an empty
/// neighbour, else stay. Breeds on any move once the breed timer is due.
pub fn step_shark<R: Rng + ?Sized>(
    current: &World,
    board: &ClaimBoard,
    coord: Coord,
    rng: &mut R,
) -> Resolution {
    let cell = current.get(coord);
    let new_energy = cell.energy - 1;
    if new_energy <= 0 {
        return Resolution::new(Outcome::Starved, 0);
    }

    let timer = cell.breed_timer + 1;
    let breeds = timer >= current.shark_breed();
    let starve = current.starve();

    let mut prey = neighbors_holding(current, coord, Entity::Fish);
    let (target, blocked_prey) = claim_any(&mut prey, rng, |target| {
        if !board.take_prey(target) {
            return false;
        }
        let parent = if breeds {
            Cell::shark(0, starve)
        } else {
            Cell::shark(timer, starve)
        };
        let placed = board.claim(target, parent);
        debug_assert!(placed, "prey cell {target} claimed twice");
        true
    });

    if target.is_some() {
        let outcome = if breeds {
            stay(board, coord, Cell::shark(0, starve / 2));
            Outcome::Bred
        } else {
            Outcome::Moved
        };
        return Resolution {
            outcome,
            ate: true,
            blocked: blocked_prey,
        };
    }

    let parent = if breeds {
        Cell::shark(0, new_energy)
    } else {
        Cell::shark(timer, new_energy)
    };
    let mut open = neighbors_holding(current, coord, Entity::Empty);
    let (dest, blocked_open) = claim_any(&mut open, rng, |dest| board.claim(dest, parent));
    let blocked = blocked_prey + blocked_open;

    if blocked > 0 {
        trace!(%coord, blocked, moved = dest.is_some(), "Shark move blocked");
    }

    match dest {
        Some(_) if breeds => {
            stay(board, coord, Cell::shark(0, new_energy / 2));
            Resolution::new(Outcome::Bred, blocked)
        }
        Some(_) => Resolution::new(Outcome::Moved, blocked),
        None => {
            stay(board, coord, Cell::shark(timer, new_energy));
            Resolution::new(Outcome::Stayed, blocked)
        }
    }
}

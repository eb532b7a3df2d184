//! Partitioned step engine.
//!
//! A step scans the frozen current world in contiguous row partitions, one
//! scoped worker thread per partition, and stages every organism's fate on a
//! shared [`ClaimBoard`]. Sharks go first: all shark workers are joined
//! before any fish acts, so a fish next to a shark can always be eaten. The
//! board is then turned into the next world.

use crate::board::ClaimBoard;
use crate::rules::{step_fish, step_shark, Outcome, Resolution};
use crate::world::World;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::ops::{AddAssign, Range};
use std::thread;
use tracing::{debug, instrument};
use wator_core::{Coord, Entity, Error, Result};

/// Births, deaths and conflicts recorded during one chronon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStats {
    pub fish_births: u64,
    pub shark_births: u64,
    /// Sharks that ran out of energy
    pub starved: u64,
    /// Fish taken by sharks
    pub eaten: u64,
    /// Moves lost to another organism's claim
    pub blocked_moves: u64,
}

impl StepStats {
    pub fn births(&self) -> u64 {
        self.fish_births + self.shark_births
    }

    pub fn deaths(&self) -> u64 {
        self.starved + self.eaten
    }

    fn record(&mut self, entity: Entity, resolution: &Resolution) {
        self.blocked_moves += u64::from(resolution.blocked);
        if resolution.ate {
            self.eaten += 1;
        }
        match (entity, resolution.outcome) {
            (Entity::Fish, Outcome::Bred) => self.fish_births += 1,
            (Entity::Shark, Outcome::Bred) => self.shark_births += 1,
            (Entity::Shark, Outcome::Starved) => self.starved += 1,
            _ => {}
        }
    }
}

impl AddAssign for StepStats {
    fn add_assign(&mut self, other: Self) {
        self.fish_births += other.fish_births;
        self.shark_births += other.shark_births;
        self.starved += other.starved;
        self.eaten += other.eaten;
        self.blocked_moves += other.blocked_moves;
    }
}

/// Split `size` rows into `min(max(threads, 1), size)` contiguous ranges.
/// Remainder rows go one each to the first ranges.
pub fn partition_rows(size: usize, threads: usize) -> Vec<Range<usize>> {
    let parts = threads.max(1).min(size);
    if parts == 0 {
        return Vec::new();
    }

    let base = size / parts;
    let remainder = size % parts;
    let mut start = 0;

    (0..parts)
        .map(|i| {
            let end = start + base + usize::from(i < remainder);
            let range = start..end;
            start = end;
            range
        })
        .collect()
}

/// Independent random stream for one phase of one partition of one chronon
pub fn worker_rng(seed: u64, chronon: u64, species: Entity, partition: usize) -> ChaCha8Rng {
    let phase = u64::from(species == Entity::Fish);
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ chronon.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    rng.set_stream(((partition as u64) << 1) | phase);
    rng
}

fn run_partition<R: Rng + ?Sized>(
    current: &World,
    board: &ClaimBoard,
    species: Entity,
    rows: Range<usize>,
    rng: &mut R,
) -> StepStats {
    let mut stats = StepStats::default();

    for row in rows {
        for col in 0..current.size() {
            let coord = Coord::new(row, col);
            if current.get(coord).entity != species {
                continue;
            }

            let resolution = match species {
                Entity::Fish => step_fish(current, board, coord, rng),
                Entity::Shark => step_shark(current, board, coord, rng),
                Entity::Empty => continue,
            };
            stats.record(species, &resolution);
        }
    }

    stats
}

/// Let every organism of `species` act, one scoped worker per partition.
/// Returns once all workers have joined.
fn run_phase(
    current: &World,
    board: &ClaimBoard,
    species: Entity,
    partitions: &[Range<usize>],
    chronon: u64,
    seed: u64,
) -> Result<StepStats> {
    thread::scope(|scope| -> Result<StepStats> {
        let mut handles = Vec::with_capacity(partitions.len());

        for (index, rows) in partitions.iter().cloned().enumerate() {
            let handle = thread::Builder::new()
                .name(format!("wator-step-{index}"))
                .spawn_scoped(scope, move || {
                    let mut rng = worker_rng(seed, chronon, species, index);
                    run_partition(current, board, species, rows, &mut rng)
                })?;
            handles.push((index, handle));
        }

        let mut total = StepStats::default();
        for (index, handle) in handles {
            total += handle
                .join()
                .map_err(|_| Error::WorkerPanicked { partition: index })?;
        }
        Ok(total)
    })
}

/// Advance `current` by one chronon.
///
/// `current` is only read. The returned world is freshly allocated with the
/// same size and parameters. Fails only if a worker cannot be spawned or
/// panics; no partial generation is ever returned.
#[instrument(level = "debug", skip(current), fields(size = current.size()))]
pub fn step(
    current: &World,
    threads: usize,
    chronon: u64,
    seed: u64,
) -> Result<(World, StepStats)> {
    let board = ClaimBoard::new(current.size());
    let partitions = partition_rows(current.size(), threads);

    let mut stats = run_phase(current, &board, Entity::Shark, &partitions, chronon, seed)?;
    stats += run_phase(current, &board, Entity::Fish, &partitions, chronon, seed)?;

    debug!(
        chronon,
        partitions = partitions.len(),
        fish_births = stats.fish_births,
        shark_births = stats.shark_births,
        starved = stats.starved,
        eaten = stats.eaten,
        blocked_moves = stats.blocked_moves,
        "Step complete"
    );

    Ok((board.into_world(current), stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use proptest::prelude::*;
    use rand::Rng;
    use wator_core::{Cell, SimConfig};

    fn populated(size: usize, sharks: usize, fish: usize, seed: u64) -> World {
        populated_with(size, sharks, fish, seed, 3)
    }

    fn populated_with(size: usize, sharks: usize, fish: usize, seed: u64, fish_breed: u32) -> World {
        let config = SimConfig {
            grid_size: size,
            fish_breed,
            shark_breed: 6,
            starve: 4,
            ..Default::default()
        };
        let mut world = World::new(&config);
        world.populate(sharks, fish, &mut ChaCha8Rng::seed_from_u64(seed));
        world
    }

    #[test]
    fn test_partition_rows_even() {
        assert_eq!(partition_rows(8, 4), vec![0..2, 2..4, 4..6, 6..8]);
    }

    #[test]
    fn test_partition_rows_remainder_goes_first() {
        assert_eq!(partition_rows(10, 4), vec![0..3, 3..6, 6..8, 8..10]);
    }

    #[test]
    fn test_partition_rows_clamped() {
        assert_eq!(partition_rows(3, 0), vec![0..3]);
        assert_eq!(partition_rows(3, 9), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn test_worker_streams_differ() {
        let a: u64 = worker_rng(1, 5, Entity::Shark, 0).gen();
        let b: u64 = worker_rng(1, 5, Entity::Shark, 1).gen();
        let c: u64 = worker_rng(1, 6, Entity::Shark, 0).gen();
        let d: u64 = worker_rng(1, 5, Entity::Fish, 0).gen();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a, worker_rng(1, 5, Entity::Shark, 0).gen::<u64>());
    }

    #[test]
    fn test_step_keeps_shape_and_parameters() {
        let current = populated(9, 5, 20, 11);
        let (next, _) = step(&current, 3, 1, 11).unwrap();
        assert_eq!(next.grid().len(), 81);
        assert_eq!(next.fish_breed(), current.fish_breed());
        assert_eq!(next.shark_breed(), current.shark_breed());
        assert_eq!(next.starve(), current.starve());
    }

    #[test]
    fn test_empty_world_stays_empty() {
        let current = populated(6, 0, 0, 0);
        let (next, stats) = step(&current, 2, 1, 0).unwrap();
        assert_eq!(next.census().total(), 0);
        assert_eq!(stats, StepStats::default());
    }

    #[test]
    fn test_single_thread_is_deterministic() {
        let mut a = populated(16, 20, 80, 5);
        let mut b = a.clone();
        for chronon in 1..=20 {
            a = step(&a, 1, chronon, 99).unwrap().0;
            b = step(&b, 1, chronon, 99).unwrap().0;
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_contested_cell_has_one_winner() {
        // Fish everywhere but one cell. Its four neighbours sit in three
        // different partitions and each has that cell as its only move.
        let size = 4;
        let mut current = World::from_grid(Grid::new(size), 100, 10, 5);
        for row in 0..size {
            for col in 0..size {
                current.set(Coord::new(row, col), Cell::fish(0));
            }
        }
        let target = Coord::new(1, 1);
        current.set(target, Cell::empty());
        let contenders = current.grid().neighbors(target);

        for seed in 0..32 {
            let (next, stats) = step(&current, 4, 1, seed).unwrap();

            assert_eq!(next.census().fish, 15);
            assert_eq!(next.get(target), &Cell::fish(1));
            let vacated = contenders.iter().filter(|c| next.get(**c).is_empty()).count();
            assert_eq!(vacated, 1);
            // every loser tried the one cell and gave up
            assert_eq!(stats.blocked_moves, 3);
            assert_eq!(stats.births(), 0);
        }
    }

    #[test]
    fn test_shark_eats_lone_fish_in_any_direction() {
        let origin = Coord::new(2, 2);
        let prey_cells = [
            Coord::new(1, 2),
            Coord::new(3, 2),
            Coord::new(2, 1),
            Coord::new(2, 3),
        ];

        for prey in prey_cells {
            let mut current = World::from_grid(Grid::new(5), 3, 10, 4);
            current.set(origin, Cell::shark(0, 4));
            current.set(prey, Cell::fish(0));

            for threads in [1, 3] {
                for seed in 0..64 {
                    let (next, stats) = step(&current, threads, 1, seed).unwrap();
                    assert_eq!(next.census().fish, 0, "fish at {prey} survived");
                    assert_eq!(stats.eaten, 1);
                    assert_eq!(next.get(prey), &Cell::shark(1, 4));
                }
            }
        }
    }

    #[test]
    fn test_lone_fish_moves_then_breeds() {
        let mut world = World::from_grid(Grid::new(3), 2, 10, 5);
        let origin = Coord::new(0, 0);
        world.set(origin, Cell::fish(0));

        let (first, stats) = step(&world, 2, 1, 3).unwrap();
        assert_eq!(stats, StepStats::default());
        let moved: Vec<_> = first.grid().iter().filter(|(_, c)| !c.is_empty()).collect();
        assert_eq!(moved.len(), 1);
        let (at, cell) = moved[0];
        assert_eq!(*cell, Cell::fish(1));
        assert!(first.grid().neighbors(origin).contains(&at));

        let (second, stats) = step(&first, 2, 2, 3).unwrap();
        assert_eq!(stats.fish_births, 1);
        assert_eq!(second.census().fish, 2);
        assert_eq!(second.get(at), &Cell::fish(0));
        let offspring: Vec<_> = second
            .grid()
            .iter()
            .filter(|(c, cell)| *c != at && !cell.is_empty())
            .collect();
        assert_eq!(offspring.len(), 1);
        assert_eq!(*offspring[0].1, Cell::fish(0));
        assert!(second.grid().neighbors(at).contains(&offspring[0].0));
    }

    #[test]
    fn test_hungry_shark_loses_energy_then_starves() {
        let mut world = World::from_grid(Grid::new(5), 3, 50, 5);
        world.set(Coord::new(2, 2), Cell::shark(0, 5));

        for (chronon, expected) in (1..=4).zip([4, 3, 2, 1]) {
            world = step(&world, 1, chronon, 8).unwrap().0;
            let sharks: Vec<_> = world.grid().cells().iter().filter(|c| !c.is_empty()).collect();
            assert_eq!(sharks.len(), 1);
            assert_eq!(sharks[0].energy, expected);
            assert_eq!(sharks[0].breed_timer, chronon as u32);
        }

        let (last, stats) = step(&world, 1, 5, 8).unwrap();
        assert_eq!(last.census().total(), 0);
        assert_eq!(stats.starved, 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn no_spontaneous_creation(
            size in 2usize..14,
            threads in 1usize..6,
            seed in any::<u64>(),
            density in 0.1f64..0.9,
        ) {
            let cells = size * size;
            let organisms = (cells as f64 * density) as usize;
            let mut world = populated(size, organisms / 4, organisms - organisms / 4, seed);

            for chronon in 1..=8 {
                let before = world.census().total() as u64;
                let (next, stats) = step(&world, threads, chronon, seed).unwrap();
                let after = next.census().total() as u64;

                prop_assert_eq!(next.grid().len(), cells);
                prop_assert_eq!(after, before + stats.births() - stats.deaths());
                world = next;
            }
        }

        #[test]
        fn breed_timer_resets_only_on_birth(
            size in 3usize..12,
            threads in 1usize..4,
            seed in any::<u64>(),
        ) {
            // every fish that moves breeds, sharks are far from due
            let world = populated_with(size, size, size * 2, seed, 1);
            let (next, stats) = step(&world, threads, 1, seed).unwrap();

            // everyone starts at 0, so after one step a 0 timer means a
            // birth (parent and offspring both reset)
            let reset = next
                .grid()
                .cells()
                .iter()
                .filter(|c| !c.is_empty() && c.breed_timer == 0)
                .count() as u64;
            prop_assert_eq!(reset, 2 * stats.births());

            let incremented = next
                .grid()
                .cells()
                .iter()
                .filter(|c| !c.is_empty() && c.breed_timer != 0)
                .all(|c| c.breed_timer == 1);
            prop_assert!(incremented);
        }
    }
}

//! World simulation engine.
//!
//! This module implements the toroidal ocean where fish and sharks live, the
//! per-species rules, and the partitioned step engine that advances the world
//! one chronon at a time.

pub mod grid;
pub mod world;
pub mod rules;
pub mod board;
pub mod step;
pub mod simulation;

pub use board::ClaimBoard;
pub use grid::Grid;
pub use rules::Outcome;
pub use simulation::{Observer, Simulation, SimulationResult, StopReason};
pub use step::{partition_rows, step, StepStats};
pub use world::World;

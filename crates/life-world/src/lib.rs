//! Grid simulation engine.
//!
//! A toroidal, double-buffered cellular automaton plus the pieces a host
//! needs to drive it: built-in patterns, seeded fills, a perturbation
//! source and a batch simulation loop.

pub mod grid;
pub mod patterns;
pub mod perturbation;
pub mod seed;
pub mod simulation;

pub use grid::Grid;
pub use patterns::Pattern;
pub use perturbation::{decode_flip, encode_flip, FlipSource};
pub use simulation::{Simulation, SimulationResult};

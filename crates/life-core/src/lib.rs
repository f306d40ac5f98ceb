//! Core types and utilities for the Torus Life cellular-automaton engine.

pub mod types;
pub mod config;
pub mod error;
pub mod rule;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
pub use rule::{Rule, TransitionRule};

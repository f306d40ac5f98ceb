//! Core type definitions for the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Encoded state of a single cell. Always `DEAD` or `ALIVE`.
pub type Cell = u8;

pub const DEAD: Cell = 0;
pub const ALIVE: Cell = 1;

/// Unique identifier for a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 2D position on the grid. May lie outside the grid; callers wrap it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }

    /// Apply toroidal wrapping for given grid dimensions
    pub fn wrap(&self, width: i32, height: i32) -> Self {
        Self {
            x: self.x.rem_euclid(width),
            y: self.y.rem_euclid(height),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the eight cells surrounding a cell (Moore neighborhood)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Neighbor {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Neighbor {
    pub const ALL: [Neighbor; 8] = [
        Neighbor::North,
        Neighbor::South,
        Neighbor::East,
        Neighbor::West,
        Neighbor::NorthEast,
        Neighbor::NorthWest,
        Neighbor::SouthEast,
        Neighbor::SouthWest,
    ];

    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Neighbor::North => (0, -1),
            Neighbor::South => (0, 1),
            Neighbor::East => (1, 0),
            Neighbor::West => (-1, 0),
            Neighbor::NorthEast => (1, -1),
            Neighbor::NorthWest => (-1, -1),
            Neighbor::SouthEast => (1, 1),
            Neighbor::SouthWest => (-1, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_wrap() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.wrap(10, 10), Position::new(5, 5));

        let pos = Position::new(-1, -1);
        assert_eq!(pos.wrap(10, 10), Position::new(9, 9));

        let pos = Position::new(10, 10);
        assert_eq!(pos.wrap(10, 10), Position::new(0, 0));

        let pos = Position::new(-21, 33);
        assert_eq!(pos.wrap(10, 10), Position::new(9, 3));
    }

    #[test]
    fn test_neighbor_deltas_are_distinct() {
        let mut deltas: Vec<(i32, i32)> = Neighbor::ALL.iter().map(|n| n.to_delta()).collect();
        deltas.sort();
        deltas.dedup();
        assert_eq!(deltas.len(), 8);
        assert!(!deltas.contains(&(0, 0)));
    }

    #[test]
    fn test_neighbor_delta() {
        assert_eq!(Neighbor::North.to_delta(), (0, -1));
        assert_eq!(Neighbor::South.to_delta(), (0, 1));
        assert_eq!(Neighbor::East.to_delta(), (1, 0));
        assert_eq!(Neighbor::West.to_delta(), (-1, 0));
    }
}

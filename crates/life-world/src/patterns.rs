//! Built-in patterns.

use crate::grid::cell_count;
use life_core::{Cell, Error, Position, Result, ALIVE, DEAD};

/// A named set of live cells, as (x, y) offsets from the pattern's origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(i32, i32)],
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "block",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
    },
    Pattern {
        name: "blinker",
        cells: &[(0, 0), (1, 0), (2, 0)],
    },
    Pattern {
        name: "toad",
        cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
    },
    Pattern {
        name: "beacon",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
    },
    // Travels one cell right and one cell down every four generations.
    Pattern {
        name: "glider",
        cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
    },
    Pattern {
        name: "r-pentomino",
        cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
    },
];

impl Pattern {
    /// Look up a built-in pattern, ignoring case
    pub fn find(name: &str) -> Result<&'static Pattern> {
        PATTERNS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::NotFound(format!("pattern '{}'", name)))
    }

    /// Width and height of the pattern's bounding box
    pub fn bounds(&self) -> (i32, i32) {
        let max_x = self.cells.iter().map(|&(x, _)| x).max().unwrap_or(-1);
        let max_y = self.cells.iter().map(|&(_, y)| y).max().unwrap_or(-1);
        (max_x + 1, max_y + 1)
    }

    /// Row-major cells of a `width` x `height` grid with this pattern placed
    /// at `origin`. Cells past an edge wrap around.
    pub fn stamp(&self, width: i32, height: i32, origin: Position) -> Result<Vec<Cell>> {
        let mut cells = vec![DEAD; cell_count(width, height)?];
        for &(dx, dy) in self.cells {
            let pos = origin.add(dx, dy).wrap(width, height);
            cells[(pos.y * width + pos.x) as usize] = ALIVE;
        }
        Ok(cells)
    }
}

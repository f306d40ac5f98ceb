//! Double-buffered toroidal grid.
//!
//! The grid owns two cell buffers of `width * height` cells. One is the
//! current generation and is the only one readers can see; the other is the
//! write target of the next step. A step reads only the current buffer,
//! writes every cell of the next one, applies the optional perturbation and
//! then swaps the two roles.

use crate::seed;
use life_core::{
    Cell, Error, GridConfig, Neighbor, Position, Result, Rule, TransitionRule, ALIVE, DEAD,
};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    buffers: [Vec<Cell>; 2],
    current: usize,
    step_count: u64,
    rule: Rule,
}

/// Check grid dimensions and return the cell count
pub(crate) fn cell_count(width: i32, height: i32) -> Result<usize> {
    if width <= 0 || height <= 0 {
        return Err(Error::InvalidDimension {
            width: width as i64,
            height: height as i64,
        });
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(Error::InvalidDimension {
            width: width as i64,
            height: height as i64,
        })
}

impl Grid {
    /// Create a grid. `None` means every cell starts dead; otherwise the
    /// row-major initial state must hold exactly `width * height` cells and
    /// any non-zero entry is taken as alive.
    pub fn new(width: i32, height: i32, initial: Option<Vec<Cell>>) -> Result<Self> {
        let len = cell_count(width, height)?;

        let front = match initial {
            None => vec![DEAD; len],
            Some(cells) => {
                if cells.len() != len {
                    return Err(Error::SizeMismatch {
                        expected: len,
                        actual: cells.len(),
                    });
                }
                cells
                    .into_iter()
                    .map(|c| if c == DEAD { DEAD } else { ALIVE })
                    .collect()
            }
        };

        Ok(Self {
            width: width as usize,
            height: height as usize,
            buffers: [front, vec![DEAD; len]],
            current: 0,
            step_count: 0,
            rule: Rule::CONWAY,
        })
    }

    pub fn empty(width: i32, height: i32) -> Result<Self> {
        Self::new(width, height, None)
    }

    pub fn from_bools(width: i32, height: i32, cells: &[bool]) -> Result<Self> {
        let cells = cells.iter().map(|&alive| alive as Cell).collect();
        Self::new(width, height, Some(cells))
    }

    /// Create a grid from configuration, drawing any randomness from `rng`
    pub fn from_config(config: &GridConfig, rng: &mut ChaCha8Rng) -> Result<Self> {
        config.validate()?;
        let cells = seed::initial_cells(config, rng)?;
        Ok(Self::new(config.width, config.height, Some(cells))?.with_rule(config.rule))
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rule = rule;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells in one buffer
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    /// Row-major index of a (possibly out-of-range) coordinate, wrapped
    /// toroidally
    pub fn index(&self, x: i32, y: i32) -> usize {
        let pos = Position::new(x, y).wrap(self.width as i32, self.height as i32);
        pos.y as usize * self.width + pos.x as usize
    }

    pub fn index_to_pos(&self, index: usize) -> Position {
        Position::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// The committed generation, row-major
    pub fn current_state(&self) -> &[Cell] {
        &self.buffers[self.current]
    }

    /// Current state widened to 32-bit cells for buffer-oriented consumers
    pub fn to_u32_cells(&self) -> Vec<u32> {
        self.current_state().iter().map(|&c| c as u32).collect()
    }

    pub fn get(&self, pos: Position) -> Cell {
        self.current_state()[self.index(pos.x, pos.y)]
    }

    pub fn is_alive(&self, pos: Position) -> bool {
        self.get(pos) == ALIVE
    }

    /// Live cells among the eight wrapped neighbors of `pos`
    pub fn live_neighbors(&self, pos: Position) -> u8 {
        Neighbor::ALL
            .iter()
            .map(|n| {
                let (dx, dy) = n.to_delta();
                self.get(pos.add(dx, dy))
            })
            .sum()
    }

    pub fn population(&self) -> usize {
        self.current_state().iter().filter(|&&c| c == ALIVE).count()
    }

    /// Positions of all live cells
    pub fn iter_alive(&self) -> impl Iterator<Item = Position> + '_ {
        self.current_state()
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == ALIVE)
            .map(move |(i, _)| self.index_to_pos(i))
    }

    /// Advance one generation with the grid's own rule
    pub fn step(&mut self, flip: Option<usize>) -> Result<()> {
        let rule = self.rule;
        self.step_with(&rule, flip)
    }

    /// Advance one generation with a caller-provided rule.
    ///
    /// An out-of-range `flip` is rejected before anything is written.
    pub fn step_with<R: TransitionRule + ?Sized>(
        &mut self,
        rule: &R,
        flip: Option<usize>,
    ) -> Result<()> {
        self.check_flip(flip)?;

        let (width, height) = (self.width, self.height);
        let (current, next) = self.split_buffers();
        for (y, row) in next.chunks_mut(width).enumerate() {
            next_row(rule, current, width, height, y, row);
        }

        self.commit(flip);
        Ok(())
    }

    /// Same as [`Grid::step`], with rows written by rayon workers
    pub fn step_parallel(&mut self, flip: Option<usize>) -> Result<()> {
        let rule = self.rule;
        self.step_parallel_with(&rule, flip)
    }

    pub fn step_parallel_with<R: TransitionRule + ?Sized>(
        &mut self,
        rule: &R,
        flip: Option<usize>,
    ) -> Result<()> {
        self.check_flip(flip)?;

        let (width, height) = (self.width, self.height);
        let (current, next) = self.split_buffers();
        // Each worker owns one row of the next buffer. The iterator returns
        // only after every row is written.
        next.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| next_row(rule, current, width, height, y, row));

        self.commit(flip);
        Ok(())
    }

    /// Serialize the grid, both buffers included
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize a grid and check that it is well-formed
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let grid: Grid = bincode::deserialize(bytes)?;
        grid.validate()?;
        Ok(grid)
    }

    fn validate(&self) -> Result<()> {
        let len = cell_count(
            i32::try_from(self.width).unwrap_or(0),
            i32::try_from(self.height).unwrap_or(0),
        )?;
        for buffer in &self.buffers {
            if buffer.len() != len {
                return Err(Error::SizeMismatch {
                    expected: len,
                    actual: buffer.len(),
                });
            }
            if let Some(bad) = buffer.iter().find(|&&c| c != DEAD && c != ALIVE) {
                return Err(Error::InvalidState(format!("cell value {} is not 0 or 1", bad)));
            }
        }
        if self.current > 1 {
            return Err(Error::InvalidState(format!(
                "buffer parity {} is not 0 or 1",
                self.current
            )));
        }
        Ok(())
    }

    fn check_flip(&self, flip: Option<usize>) -> Result<()> {
        match flip {
            Some(index) if index >= self.len() => Err(Error::IndexOutOfRange {
                index,
                len: self.len(),
            }),
            _ => Ok(()),
        }
    }

    /// Current buffer for reading, next buffer for writing
    fn split_buffers(&mut self) -> (&[Cell], &mut [Cell]) {
        let [first, second] = &mut self.buffers;
        if self.current == 0 {
            (first.as_slice(), second.as_mut_slice())
        } else {
            (second.as_slice(), first.as_mut_slice())
        }
    }

    /// Apply the perturbation to the fully written next buffer, then swap
    fn commit(&mut self, flip: Option<usize>) {
        if let Some(index) = flip {
            let next = &mut self.buffers[1 - self.current];
            next[index] ^= ALIVE;
        }
        self.current = 1 - self.current;
        self.step_count += 1;
        trace!(step = self.step_count, flip = ?flip, "Grid stepped");
    }
}

/// Write row `y` of the next generation into `out`
fn next_row<R: TransitionRule + ?Sized>(
    rule: &R,
    current: &[Cell],
    width: usize,
    height: usize,
    y: usize,
    out: &mut [Cell],
) {
    let up = ((y + height - 1) % height) * width;
    let mid = y * width;
    let down = ((y + 1) % height) * width;

    for x in 0..width {
        let left = (x + width - 1) % width;
        let right = (x + 1) % width;

        let live = current[up + left]
            + current[up + x]
            + current[up + right]
            + current[mid + left]
            + current[mid + right]
            + current[down + left]
            + current[down + x]
            + current[down + right];

        let alive = current[mid + x] == ALIVE;
        out[x] = if rule.next_state(alive, live) { ALIVE } else { DEAD };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn grid_with(width: i32, height: i32, alive: &[(i32, i32)]) -> Grid {
        let mut cells = vec![DEAD; (width * height) as usize];
        for &(x, y) in alive {
            cells[(y * width + x) as usize] = ALIVE;
        }
        Grid::new(width, height, Some(cells)).unwrap()
    }

    fn alive_set(grid: &Grid) -> Vec<(i32, i32)> {
        let mut cells: Vec<_> = grid.iter_alive().map(|p| (p.x, p.y)).collect();
        cells.sort();
        cells
    }

    #[test]
    fn test_grid_creation() {
        let grid = Grid::empty(10, 4).unwrap();
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.current_state().len(), 40);
        assert_eq!(grid.step_count(), 0);
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(Grid::empty(0, 5), Err(Error::InvalidDimension { .. })));
        assert!(matches!(Grid::empty(5, 0), Err(Error::InvalidDimension { .. })));
        assert!(matches!(Grid::empty(-3, 5), Err(Error::InvalidDimension { .. })));
    }

    #[test]
    fn test_size_mismatch() {
        let err = Grid::new(3, 3, Some(vec![0; 8])).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 9, actual: 8 }));
    }

    #[test]
    fn test_initial_state_is_normalized() {
        let grid = Grid::new(2, 1, Some(vec![0, 7])).unwrap();
        assert_eq!(grid.current_state(), &[0, 1]);
    }

    #[test]
    fn test_toroidal_index() {
        let grid = Grid::empty(5, 4).unwrap();
        assert_eq!(grid.index(0, 0), 0);
        assert_eq!(grid.index(4, 3), 19);
        assert_eq!(grid.index(-1, -1), 19);
        assert_eq!(grid.index(5, 4), 0);
        assert_eq!(grid.index(7, 1), 7);
    }

    #[test]
    fn test_live_neighbors_wrap() {
        let grid = grid_with(5, 5, &[(4, 4), (0, 4), (4, 0)]);
        assert_eq!(grid.live_neighbors(Position::new(0, 0)), 3);
        assert_eq!(grid.live_neighbors(Position::new(2, 2)), 0);
    }

    #[test]
    fn test_all_dead_is_fixed_point() {
        let mut grid = Grid::empty(6, 6).unwrap();
        for _ in 0..10 {
            grid.step(None).unwrap();
        }
        assert_eq!(grid.population(), 0);
        assert_eq!(grid.step_count(), 10);
    }

    #[test]
    fn test_isolated_cell_dies() {
        let mut grid = grid_with(3, 3, &[(1, 1)]);
        grid.step(None).unwrap();
        assert_eq!(grid.current_state(), &[0; 9]);
    }

    #[test]
    fn test_block_is_still_life() {
        let mut grid = grid_with(6, 6, &[(2, 2), (3, 2), (2, 3), (3, 3)]);
        let before = grid.current_state().to_vec();
        grid.step(None).unwrap();
        assert_eq!(grid.current_state(), before.as_slice());
    }

    #[test]
    fn test_blinker_oscillates() {
        let mut grid = grid_with(7, 7, &[(2, 3), (3, 3), (4, 3)]);
        let before = grid.current_state().to_vec();

        grid.step(None).unwrap();
        assert_eq!(alive_set(&grid), vec![(3, 2), (3, 3), (3, 4)]);

        grid.step(None).unwrap();
        assert_eq!(grid.current_state(), before.as_slice());
    }

    #[test]
    fn test_birth_and_survival() {
        // Three cells in an L: the corner of the L is born.
        let mut grid = grid_with(6, 6, &[(1, 1), (2, 1), (1, 2)]);
        grid.step(None).unwrap();
        assert_eq!(alive_set(&grid), vec![(1, 1), (1, 2), (2, 1), (2, 2)]);
    }

    #[test]
    fn test_step_reads_only_pre_step_state() {
        // A horizontal blinker would collapse if updated cells were visible
        // to later cells in the same pass.
        let mut grid = grid_with(5, 5, &[(1, 2), (2, 2), (3, 2)]);
        grid.step(None).unwrap();
        assert_eq!(grid.population(), 3);
    }

    #[test]
    fn test_perturbation_flips_one_cell() {
        let mut plain = grid_with(6, 6, &[(1, 1), (2, 1), (1, 2)]);
        let mut flipped = plain.clone();

        plain.step(None).unwrap();
        let target = flipped.index(4, 4);
        flipped.step(Some(target)).unwrap();

        let diffs: Vec<usize> = plain
            .current_state()
            .iter()
            .zip(flipped.current_state())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(diffs, vec![target]);
        assert_eq!(flipped.current_state()[target], ALIVE);
    }

    #[test]
    fn test_perturbation_applies_after_rule() {
        // The flipped cell is inverted relative to its post-rule value, and
        // its neighbors still see the pre-step state.
        let mut grid = grid_with(6, 6, &[(2, 2), (3, 2), (2, 3), (3, 3)]);
        let target = grid.index(2, 2);
        grid.step(Some(target)).unwrap();
        assert!(!grid.is_alive(Position::new(2, 2)));
        assert!(grid.is_alive(Position::new(3, 2)));
        assert!(grid.is_alive(Position::new(2, 3)));
        assert!(grid.is_alive(Position::new(3, 3)));
    }

    #[test]
    fn test_out_of_range_flip_is_rejected() {
        let mut grid = grid_with(3, 3, &[(0, 0), (1, 0), (2, 0)]);
        let before = grid.clone();

        let err = grid.step(Some(9)).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 9, len: 9 }));
        assert_eq!(grid, before);

        let err = grid.step_parallel(Some(100)).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { .. }));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let config = GridConfig {
            width: 40,
            height: 23,
            ..Default::default()
        };
        let mut sequential = Grid::from_config(&config, &mut rng).unwrap();
        let mut parallel = sequential.clone();

        for i in 0..20 {
            let flip = if i % 3 == 0 { Some(i * 17) } else { None };
            sequential.step(flip).unwrap();
            parallel.step_parallel(flip).unwrap();
            assert_eq!(sequential.current_state(), parallel.current_state());
        }
        assert_eq!(parallel.step_count(), 20);
    }

    #[test]
    fn test_custom_rule() {
        struct Always;
        impl TransitionRule for Always {
            fn next_state(&self, _alive: bool, _live_neighbors: u8) -> bool {
                true
            }
        }

        let mut grid = Grid::empty(4, 4).unwrap();
        grid.step_with(&Always, None).unwrap();
        assert_eq!(grid.population(), 16);
        assert_eq!(grid.step_count(), 1);
    }

    #[test]
    fn test_highlife_rule() {
        // Under B36/S23 a dead cell with six live neighbors is born.
        let alive = [(0, 0), (1, 0), (2, 0), (0, 2), (1, 2), (2, 2)];
        let mut grid = grid_with(7, 7, &alive).with_rule("B36/S23".parse().unwrap());
        grid.step(None).unwrap();
        assert!(grid.is_alive(Position::new(1, 1)));

        let mut conway = grid_with(7, 7, &alive);
        conway.step(None).unwrap();
        assert!(!conway.is_alive(Position::new(1, 1)));
    }

    #[test]
    fn test_single_cell_grid() {
        // On a 1x1 torus every neighbor offset lands on the cell itself.
        let mut grid = Grid::new(1, 1, Some(vec![1])).unwrap();
        assert_eq!(grid.live_neighbors(Position::new(0, 0)), 8);
        grid.step(None).unwrap();
        assert_eq!(grid.current_state(), &[0]);
    }

    #[test]
    fn test_u32_cells() {
        let grid = grid_with(2, 2, &[(1, 0)]);
        assert_eq!(grid.to_u32_cells(), vec![0u32, 1, 0, 0]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut grid = grid_with(5, 5, &[(1, 2), (2, 2), (3, 2)]);
        grid.step(None).unwrap();

        let bytes = grid.to_bytes().unwrap();
        let restored = Grid::from_bytes(&bytes).unwrap();
        assert_eq!(restored, grid);
        assert_eq!(restored.step_count(), 1);
    }

    #[test]
    fn test_corrupt_snapshot_is_rejected() {
        let mut grid = grid_with(3, 3, &[(1, 1)]);
        grid.buffers[0][4] = 2;
        let bytes = bincode::serialize(&grid).unwrap();
        assert!(matches!(Grid::from_bytes(&bytes), Err(Error::InvalidState(_))));

        let mut grid = grid_with(3, 3, &[(1, 1)]);
        grid.buffers[1].pop();
        let bytes = bincode::serialize(&grid).unwrap();
        assert!(matches!(Grid::from_bytes(&bytes), Err(Error::SizeMismatch { .. })));

        assert!(matches!(Grid::from_bytes(&[1, 2, 3]), Err(Error::Serialization(_))));
    }
}

//! Initial generation builders.

use crate::grid::cell_count;
use crate::patterns::Pattern;
use life_core::{Cell, Error, GridConfig, InitialState, Position, Result, ALIVE, DEAD};
use rand::Rng;

/// Fill a grid's cells at random, each alive with probability `density`
pub fn random_cells<R: Rng>(
    width: i32,
    height: i32,
    density: f64,
    rng: &mut R,
) -> Result<Vec<Cell>> {
    if !(0.0..=1.0).contains(&density) {
        return Err(Error::Config(format!(
            "density must be within [0, 1], got {}",
            density
        )));
    }

    let len = cell_count(width, height)?;
    Ok((0..len)
        .map(|_| if rng.gen::<f64>() < density { ALIVE } else { DEAD })
        .collect())
}

/// Build the first generation described by `config`
pub fn initial_cells<R: Rng>(config: &GridConfig, rng: &mut R) -> Result<Vec<Cell>> {
    match &config.initial_state {
        InitialState::Empty => Ok(vec![DEAD; cell_count(config.width, config.height)?]),
        InitialState::Random { density } => {
            random_cells(config.width, config.height, *density, rng)
        }
        InitialState::Pattern { name, x, y } => {
            Pattern::find(name)?.stamp(config.width, config.height, Position::new(*x, *y))
        }
    }
}

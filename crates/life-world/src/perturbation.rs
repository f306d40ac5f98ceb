//! Host-side perturbation.
//!
//! The engine only ever takes an explicit `Option<usize>` flip target.
//! Randomness lives here, on the caller's side of [`crate::Grid::step`].

use life_core::{Error, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Stream used for flips so they never share draws with the initial fill
const FLIP_STREAM: u64 = 1;

/// Decode the single-integer flip encoding used by GPU uniforms:
/// `0` means no flip, `i` means flip cell `i - 1`.
pub fn decode_flip(raw: u32) -> Option<usize> {
    raw.checked_sub(1).map(|i| i as usize)
}

/// Inverse of [`decode_flip`]
pub fn encode_flip(flip: Option<usize>) -> Result<u32> {
    match flip {
        None => Ok(0),
        Some(index) => index
            .checked_add(1)
            .and_then(|raw| u32::try_from(raw).ok())
            .ok_or(Error::IndexOutOfRange {
                index,
                len: u32::MAX as usize,
            }),
    }
}

/// Seeded source of random single-cell flips
#[derive(Debug, Clone)]
pub struct FlipSource {
    rng: ChaCha8Rng,
    probability: f64,
}

impl FlipSource {
    pub fn new(seed: u64, probability: f64) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(FLIP_STREAM);
        Self::from_rng(rng, probability)
    }

    pub fn from_rng(rng: ChaCha8Rng, probability: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(Error::Config(format!(
                "flip probability must be within [0, 1], got {}",
                probability
            )));
        }
        Ok(Self { rng, probability })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Draw the flip for the next step of a grid with `cell_count` cells
    pub fn next_flip(&mut self, cell_count: usize) -> Option<usize> {
        if cell_count == 0 || self.probability <= 0.0 {
            return None;
        }
        if self.rng.gen::<f64>() < self.probability {
            Some(self.rng.gen_range(0..cell_count))
        } else {
            None
        }
    }
}

//! Configuration types for the engine and its runner.

use crate::error::{Error, Result};
use crate::rule::Rule;
use serde::{Deserialize, Serialize};

/// How the grid's first generation is populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialState {
    /// Every cell dead
    Empty,
    /// Each cell alive with probability `density`
    Random { density: f64 },
    /// A named built-in pattern stamped at (x, y)
    Pattern { name: String, x: i32, y: i32 },
}

impl Default for InitialState {
    fn default() -> Self {
        InitialState::Random { density: 0.4 }
    }
}

/// Grid configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Width of the grid
    pub width: i32,
    /// Height of the grid
    pub height: i32,
    /// Transition rule in B/S notation
    pub rule: Rule,
    /// First generation
    pub initial_state: InitialState,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            rule: Rule::CONWAY,
            initial_state: InitialState::default(),
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::InvalidDimension {
                width: self.width as i64,
                height: self.height as i64,
            });
        }
        if let InitialState::Random { density } = self.initial_state {
            if !(0.0..=1.0).contains(&density) {
                return Err(Error::Config(format!(
                    "density must be within [0, 1], got {}",
                    density
                )));
            }
        }
        Ok(())
    }
}

/// Batch simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of steps to run
    pub num_ticks: u64,
    /// Random seed for the initial fill and perturbations
    pub seed: u64,
    /// Grid configuration
    pub grid: GridConfig,
    /// Chance (0.0 to 1.0) that one random cell is flipped on a step
    pub flip_probability: f64,
    /// Ticks between population metric samples
    pub metrics_interval: u64,
    /// Grids with at least this many cells step in parallel
    pub parallel_threshold: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_ticks: 1_000,
            seed: 0,
            grid: GridConfig::default(),
            flip_probability: 0.0,
            metrics_interval: 100,
            parallel_threshold: 256 * 256,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        if !(0.0..=1.0).contains(&self.flip_probability) {
            return Err(Error::Config(format!(
                "flip_probability must be within [0, 1], got {}",
                self.flip_probability
            )));
        }
        if self.metrics_interval == 0 {
            return Err(Error::Config("metrics_interval must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Headless runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Simulation to execute
    pub run: RunConfig,
    /// Where to write the JSON report (stdout when unset)
    pub report_path: Option<String>,
    /// Where to write the final grid snapshot (skipped when unset)
    pub snapshot_path: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            run: RunConfig::default(),
            report_path: None,
            snapshot_path: None,
        }
    }
}

impl RunnerConfig {
    /// Parse a runner configuration from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.run.validate()?;
        Ok(config)
    }
}

//! Batch simulation driver.

use crate::grid::Grid;
use crate::perturbation::FlipSource;
use chrono::{DateTime, Utc};
use life_core::{Cell, Result, RunConfig, RunId};
use parking_lot::RwLock;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, event, info, instrument, warn, Level};

/// Population recorded at the end of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationSample {
    pub tick: u64,
    pub population: usize,
}

pub struct Simulation {
    run_id: RunId,
    grid: Arc<RwLock<Grid>>,
    flips: FlipSource,
    config: RunConfig,
    tick: u64,
    flips_applied: u64,
    initial_population: usize,
    peak_population: usize,
    population_history: Vec<PopulationSample>,
}

impl Simulation {
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let grid = Grid::from_config(&config.grid, &mut rng)?;
        let flips = FlipSource::new(config.seed, config.flip_probability)?;
        let population = grid.population();

        let run_id = RunId::new();
        debug!(
            run_id = %run_id,
            width = grid.width(),
            height = grid.height(),
            rule = %grid.rule(),
            population,
            "Simulation created"
        );

        Ok(Self {
            run_id,
            grid: Arc::new(RwLock::new(grid)),
            flips,
            config,
            tick: 0,
            flips_applied: 0,
            initial_population: population,
            peak_population: population,
            population_history: vec![PopulationSample {
                tick: 0,
                population,
            }],
        })
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Shared handle for readers such as a renderer. A step holds the write
    /// lock for its whole duration, so a reader always sees a committed
    /// generation.
    pub fn grid_handle(&self) -> Arc<RwLock<Grid>> {
        self.grid.clone()
    }

    /// Run until `num_ticks` ticks have been executed
    pub fn run(&mut self) -> Result<SimulationResult> {
        self.run_until(&AtomicBool::new(false))
    }

    /// Run until `num_ticks` ticks have been executed or `stop` is set
    #[instrument(skip(self, stop), fields(run_id = %self.run_id, num_ticks = self.config.num_ticks))]
    pub fn run_until(&mut self, stop: &AtomicBool) -> Result<SimulationResult> {
        info!("Starting simulation for {} ticks", self.config.num_ticks);

        while self.tick < self.config.num_ticks {
            if stop.load(Ordering::Relaxed) {
                warn!(tick = self.tick, "Simulation stopped early");
                break;
            }
            self.tick()?;
        }

        self.emit_run_summary();
        Ok(self.collect_results())
    }

    /// Execute one step: draw a flip, advance the grid, record metrics
    pub fn tick(&mut self) -> Result<()> {
        let mut grid = self.grid.write();
        let flip = self.flips.next_flip(grid.len());

        if grid.len() >= self.config.parallel_threshold {
            grid.step_parallel(flip)?;
        } else {
            grid.step(flip)?;
        }
        let population = grid.population();
        drop(grid);

        self.tick += 1;
        if flip.is_some() {
            self.flips_applied += 1;
        }
        self.peak_population = self.peak_population.max(population);

        if self.tick % self.config.metrics_interval == 0 {
            self.population_history.push(PopulationSample {
                tick: self.tick,
                population,
            });
            self.emit_population_metrics(population);
        }

        Ok(())
    }

    fn emit_population_metrics(&self, population: usize) {
        let cells = self.grid.read().len();
        let density = population as f64 / cells as f64;

        info!(
            event = "population_metrics",
            tick = self.tick,
            population,
            density = format!("{:.4}", density),
            flips_applied = self.flips_applied,
            "Population metrics snapshot"
        );

        event!(
            Level::INFO,
            gauge_name = "population_total",
            gauge_value = population,
            tick = self.tick,
            "Population gauge"
        );
    }

    fn emit_run_summary(&self) {
        let final_population = self.grid.read().population();

        info!(
            event = "run_summary",
            total_ticks = self.tick,
            requested_ticks = self.config.num_ticks,
            initial_population = self.initial_population,
            final_population,
            peak_population = self.peak_population,
            flips_applied = self.flips_applied,
            "Simulation complete"
        );

        if final_population == 0 {
            info!(event = "extinction", tick = self.tick, "Population died out");
        }
    }

    fn collect_results(&self) -> SimulationResult {
        let grid = self.grid.read();

        SimulationResult {
            run_id: self.run_id,
            rule: grid.rule().to_string(),
            width: grid.width(),
            height: grid.height(),
            total_ticks: self.tick,
            initial_population: self.initial_population,
            final_population: grid.population(),
            peak_population: self.peak_population,
            flips_applied: self.flips_applied,
            population_history: self.population_history.clone(),
            final_state: grid.current_state().to_vec(),
            finished_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub run_id: RunId,
    pub rule: String,
    pub width: usize,
    pub height: usize,
    pub total_ticks: u64,
    pub initial_population: usize,
    pub final_population: usize,
    pub peak_population: usize,
    pub flips_applied: u64,
    pub population_history: Vec<PopulationSample>,
    pub final_state: Vec<Cell>,
    pub finished_at: DateTime<Utc>,
}

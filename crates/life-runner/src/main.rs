//! Headless runner: executes one simulation batch and writes its artifacts.
//!
//! Usage: `life-runner [config.json]`

mod output;
mod telemetry;

use anyhow::Result;
use life_world::{Simulation, SimulationResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let config_path = std::env::args().nth(1);
    let config = output::load_config(config_path.as_deref()).await?;

    let grid = &config.run.grid;
    info!(
        width = grid.width,
        height = grid.height,
        rule = %grid.rule,
        num_ticks = config.run.num_ticks,
        seed = config.run.seed,
        "Starting Torus Life runner"
    );

    let mut simulation = Simulation::new(config.run.clone())?;
    info!(run_id = %simulation.run_id(), "Simulation ready");

    // The step loop is CPU-bound; run it off the async workers and let the
    // signal handler flip the stop flag.
    let stop = Arc::new(AtomicBool::new(false));
    let worker_stop = stop.clone();
    let mut handle = tokio::task::spawn_blocking(
        move || -> life_core::Result<(SimulationResult, Vec<u8>)> {
            let result = simulation.run_until(&worker_stop)?;
            let snapshot = simulation.grid_handle().read().to_bytes()?;
            Ok((result, snapshot))
        },
    );

    let (result, snapshot) = tokio::select! {
        joined = &mut handle => joined??,
        _ = shutdown_signal() => {
            stop.store(true, Ordering::Relaxed);
            warn!("Stopping simulation after the current step");
            (&mut handle).await??
        }
    };

    output::write_report(&result, config.report_path.as_deref()).await?;
    if let Some(path) = config.snapshot_path.as_deref() {
        output::write_snapshot(&snapshot, path).await?;
    }

    info!(
        total_ticks = result.total_ticks,
        final_population = result.final_population,
        "Runner finished"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

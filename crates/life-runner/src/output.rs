//! Config loading and run artifacts.

use anyhow::{Context, Result};
use life_core::RunnerConfig;
use life_world::SimulationResult;
use std::path::Path;
use tokio::fs;
use tracing::info;

/// Load the runner configuration from `path`, or use defaults
pub async fn load_config(path: Option<&str>) -> Result<RunnerConfig> {
    let Some(path) = path else {
        info!("No config file given, using defaults");
        return Ok(RunnerConfig::default());
    };

    let json = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path))?;
    let config = RunnerConfig::from_json(&json)
        .with_context(|| format!("Invalid config file {}", path))?;

    info!("Loaded config from {}", path);
    Ok(config)
}

/// Write the run report as pretty JSON to `path`, or to stdout
pub async fn write_report(result: &SimulationResult, path: Option<&str>) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;

    match path {
        Some(path) => {
            write_file(Path::new(path), json.as_bytes()).await?;
            info!("Report written to {}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Write a grid snapshot produced by `Grid::to_bytes`
pub async fn write_snapshot(bytes: &[u8], path: &str) -> Result<()> {
    write_file(Path::new(path), bytes).await?;
    info!(bytes = bytes.len(), "Snapshot written to {}", path);
    Ok(())
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

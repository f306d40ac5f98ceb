//! Log subscriber setup for the runner.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,life_world=debug,life_runner=debug";

/// Install the global subscriber. Logs go to stderr so a report written to
/// stdout stays machine-readable. `LIFE_LOG_FORMAT=json` switches to JSON
/// lines.
pub fn init_telemetry() -> Result<()> {
    let json = std::env::var("LIFE_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()?;
    }

    info!(json, "Telemetry initialized");
    Ok(())
}

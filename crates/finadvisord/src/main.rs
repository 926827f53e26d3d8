//! Finadvisor Daemon - serves the advice form, the advice endpoint and
//! WebSocket advice sessions.

use anyhow::Result;
use finadvisord::config::{Config, ConfigOrigin};
use finadvisord::logging::init_logging;
use finadvisord::AdvisorServer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let (config, origin) = Config::load();

    if !init_logging(&config.logging) {
        warn!("Invalid log level '{}', using info", config.logging.level);
    }

    info!("Finadvisor Daemon v{} starting", env!("CARGO_PKG_VERSION"));
    match origin {
        ConfigOrigin::File(path) => info!("Loaded config from {}", path),
        ConfigOrigin::Defaults(reason) => warn!("Config not found, using defaults: {}", reason),
    }

    let server = AdvisorServer::bind(config).await?.start()?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down gracefully");

    server.stop().await
}

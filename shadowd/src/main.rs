//! Shadow Daemon
//!
//! Runs the configured trading robots against the simulated venue.
//!
//! # Usage
//!
//! ```bash
//! # Start with default configuration (robots.json in the working directory)
//! cargo run -p shadowd
//!
//! # Start with a custom robots file and balance
//! SHADOW_ROBOTS_FILE=config/robots.json SHADOW_VIRTUAL_BALANCE=5000 cargo run -p shadowd
//! ```
//!
//! # Environment Variables
//!
//! - `SHADOW_ENV`: Environment (test, development, production)
//! - `SHADOW_ROBOTS_FILE`: Robot definitions (default: robots.json)
//! - `SHADOW_VIRTUAL_BALANCE`: Starting virtual balance (default: 10000)
//! - `SHADOW_SHUTDOWN_TIMEOUT_SECS`: Shutdown wait bound (default: 10)

use shadowd::{Config, Daemon};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("shadowd=info".parse()?))
        .init();

    // Load configuration
    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        robots_file = %config.robots_file.display(),
        robots = config.robots.len(),
        virtual_balance = %config.virtual_balance,
        "Shadow Daemon"
    );

    // Create and run daemon
    let daemon = Daemon::new(config)?;
    daemon.run().await?;

    Ok(())
}

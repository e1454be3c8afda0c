//! Shadow Daemon Library
//!
//! Runtime for single-position trading robots.
//!
//! # Architecture
//!
//! ```text
//! RobotManager → RobotScheduler → TaskScheduler (one tokio task per robot)
//!                      ↓ tick
//!                SinglePositionRobot
//!                 ├── BarSource    → BarBuffer → VotingStrategy
//!                 └── OrderGateway → VirtualAccount (shared)
//! ```
//!
//! # Components
//!
//! - **Robot**: EXPLORING / IN_POSITION state machine, one cycle per tick
//! - **Scheduler**: boundary-aligned fixed-rate ticking with graceful stop
//! - **Manager**: starts and stops all robot schedulers
//! - **Factory**: builds robots from configuration on the simulated venue
//! - **Config**: environment variables plus a JSON robots file
//!
//! # Example
//!
//! ```rust,ignore
//! use shadowd::{Config, Daemon};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let daemon = Daemon::new(Config::from_env()?)?;
//!     daemon.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod daemon;
pub mod error;
pub mod factory;
pub mod manager;
pub mod robot;
pub mod scheduler;

// Re-exports for convenience
pub use config::{load_robots, parse_robots, Config, Environment, OrderConfig, RobotConfig};
pub use daemon::Daemon;
pub use error::{DaemonError, DaemonResult};
pub use factory::{RobotFactory, SimulatedRobot};
pub use manager::RobotManager;
pub use robot::{CycleOutcome, Robot, RobotSettings, RobotState, SinglePositionRobot};
pub use scheduler::{RobotScheduler, TaskScheduler};

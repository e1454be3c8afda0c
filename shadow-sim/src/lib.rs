//! Shadow Simulated Venue
//!
//! Paper-trading building blocks: an in-memory account ledger, an order
//! gateway on top of it, and a bar source that replays historical data.
//!
//! # Architecture
//!
//! ```text
//! historical-data/*.json → load_historical_bars → ReplayBarSource ─┐ current price
//!                                                                  ↓
//!                               Robot → SimulatedGateway → VirtualAccount
//! ```

#![warn(clippy::all)]

pub mod account;
pub mod error;
pub mod gateway;
pub mod historical;
pub mod replay;

// Re-exports for convenience
pub use account::VirtualAccount;
pub use error::{SimError, SimResult};
pub use gateway::{PriceFeed, SimulatedGateway};
pub use historical::{load_historical_bars, Candlestick, HISTORICAL_DATA_DIR};
pub use replay::ReplayBarSource;

//! Shadow Engine
//!
//! Pure decision logic with no I/O: technical indicators, explorers that
//! grade directional momentum, blockers that veto trading, and the
//! severity-voting strategy that combines them.
//!
//! # Architecture
//!
//! ```text
//! Bars → Indicators → Explorers (severity × tier multiplier) ┐
//!                   → Blockers (veto)                         ├→ VotingStrategy → PositionMomentum
//! ```
//!
//! The engine never touches the network or the clock; the robot in
//! `shadowd` feeds it bar windows and acts on its decisions.

#![warn(clippy::all)]

pub mod blocker;
pub mod buffer;
pub mod error;
pub mod explorer;
pub mod indicators;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testutil;

// Re-exports for convenience
pub use blocker::{AtrBlocker, Blocker, BlockerConfig};
pub use buffer::BarBuffer;
pub use error::{EngineError, EngineResult};
pub use explorer::{
    BollingerExplorer, Explorer, ExplorerConfig, MacdExplorer, RsiExplorer, StochasticExplorer,
};
pub use indicators::{
    Atr, BollingerBands, BollingerResult, Indicator, Macd, MacdResult, Rsi, Stochastic,
    StochasticResult,
};
pub use strategy::{
    PositionAction, PositionMomentum, SeverityMultipliers, VotingPower, VotingStrategy,
};

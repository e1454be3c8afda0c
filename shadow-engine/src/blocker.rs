//! Blockers: veto trading when market conditions are unsuitable.
//!
//! A blocker answers one question for a bar window: should the strategy
//! stand aside? Any blocker returning `true` forces DO_NOTHING when
//! exploring and an early close when holding a position.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use shadow_domain::Bar;
use tracing::{debug, info, warn};

use crate::error::EngineResult;
use crate::indicators::{closes, highs, lows, Atr, Indicator};

/// Capability shared by all blockers.
pub trait Blocker: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> String;

    /// Minimum bars needed for a meaningful answer.
    fn required_period_threshold(&self) -> usize;

    /// `true` vetoes trading.
    fn is_blocking(&self, bars: &[Bar]) -> bool;
}

/// Blocker definition as found in robot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockerConfig {
    Atr(AtrBlockerConfig),
}

impl BlockerConfig {
    pub fn build(&self) -> EngineResult<Box<dyn Blocker>> {
        Ok(match self {
            BlockerConfig::Atr(c) => Box::new(AtrBlocker::new(c.clone())?),
        })
    }
}

impl Default for BlockerConfig {
    fn default() -> Self {
        BlockerConfig::Atr(AtrBlockerConfig::default())
    }
}

// =============================================================================
// ATR blocker
// =============================================================================

/// Volatility band, in percent of the latest close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtrBlockerConfig {
    pub period: usize,
    pub low_threshold_pct: f64,
    pub high_threshold_pct: f64,
}

impl Default for AtrBlockerConfig {
    fn default() -> Self {
        Self {
            period: 7,
            low_threshold_pct: 0.05,
            high_threshold_pct: 0.5,
        }
    }
}

/// Blocks when `ATR / close * 100` falls outside
/// `[low_threshold_pct, high_threshold_pct]`.
///
/// Too few bars to compute an ATR also blocks.
#[derive(Debug, Clone)]
pub struct AtrBlocker {
    config: AtrBlockerConfig,
    atr: Atr,
}

impl AtrBlocker {
    pub fn new(config: AtrBlockerConfig) -> EngineResult<Self> {
        let atr = Atr::new(config.period)?;
        Ok(Self { config, atr })
    }

    fn atr_pct(&self, bars: &[Bar]) -> Option<f64> {
        let latest_close = bars.last()?.close.to_f64()?;
        if latest_close <= 0.0 {
            return None;
        }

        match self.atr.latest(&highs(bars), &lows(bars), &closes(bars)) {
            Ok(atr) => Some(atr / latest_close * 100.0),
            Err(e) => {
                warn!(blocker = %self.name(), error = %e, "unable to compute ATR");
                None
            }
        }
    }
}

impl Blocker for AtrBlocker {
    fn name(&self) -> String {
        self.atr.name()
    }

    fn required_period_threshold(&self) -> usize {
        self.atr.required_period_threshold()
    }

    fn is_blocking(&self, bars: &[Bar]) -> bool {
        let Some(atr_pct) = self.atr_pct(bars) else {
            info!(blocker = %self.name(), bars = bars.len(), "not enough data, blocking");
            return true;
        };

        if atr_pct < self.config.low_threshold_pct {
            info!(blocker = %self.name(), atr_pct, "low volatility, blocking");
            return true;
        }
        if atr_pct > self.config.high_threshold_pct {
            info!(blocker = %self.name(), atr_pct, "high volatility, blocking");
            return true;
        }

        debug!(blocker = %self.name(), atr_pct, "volatility within range");
        false
    }
}

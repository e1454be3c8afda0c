//! Technical indicators.
//!
//! Indicators compute over `f64` series. Bars carry `Decimal` prices; the
//! conversion happens once at the boundary through [`closes`], [`highs`]
//! and [`lows`].
//!
//! Every indicator reports `required_period_threshold()`, the minimum
//! number of bars it needs. The robot sizes its bar history to the maximum
//! threshold across everything the strategy uses.

pub mod atr;
pub mod bollinger;
pub mod macd;
pub mod rsi;
pub mod stochastic;

pub use atr::Atr;
pub use bollinger::{BollingerBands, BollingerResult};
pub use macd::{Macd, MacdResult};
pub use rsi::Rsi;
pub use stochastic::{Stochastic, StochasticResult};

use rust_decimal::prelude::ToPrimitive;
use shadow_domain::Bar;

use crate::error::{EngineError, EngineResult};

/// Common indicator surface.
pub trait Indicator {
    /// Short identifier used in logs (e.g. "rsi_14").
    fn name(&self) -> String;

    /// Primary lookback period.
    fn period(&self) -> usize;

    /// Minimum number of bars needed for one value.
    fn required_period_threshold(&self) -> usize;
}

/// Close prices as `f64`.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close.to_f64().unwrap_or(f64::NAN)).collect()
}

/// High prices as `f64`.
pub fn highs(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.high.to_f64().unwrap_or(f64::NAN)).collect()
}

/// Low prices as `f64`.
pub fn lows(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.low.to_f64().unwrap_or(f64::NAN)).collect()
}

pub(crate) fn ensure_period(name: &str, period: usize) -> EngineResult<()> {
    if period == 0 {
        return Err(EngineError::InvalidConfig(format!("{} period must be positive", name)));
    }
    Ok(())
}

pub(crate) fn ensure_len(name: &str, actual: usize, required: usize) -> EngineResult<()> {
    if actual < required {
        return Err(EngineError::InsufficientData(format!(
            "{} needs at least {} values, got {}",
            name, required, actual
        )));
    }
    Ok(())
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

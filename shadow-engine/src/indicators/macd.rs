//! Moving Average Convergence Divergence (MACD).
//!
//! Both EMAs are seeded at index `long-1` with the SMA of the first `long`
//! prices and updated with alpha = 2/(period+1) afterwards. The signal line
//! is seeded with the SMA of the first `signal` MACD values and EMA-updated
//! from there. Histogram = MACD - signal.

use super::{ensure_len, ensure_period, mean, Indicator};
use crate::error::{EngineError, EngineResult};

/// Latest MACD reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdResult {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone)]
pub struct Macd {
    short: usize,
    long: usize,
    signal: usize,
}

fn alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

fn ema_step(value: f64, prev: f64, alpha: f64) -> f64 {
    value * alpha + prev * (1.0 - alpha)
}

impl Macd {
    pub fn new(short: usize, long: usize, signal: usize) -> EngineResult<Self> {
        ensure_period("MACD short", short)?;
        ensure_period("MACD long", long)?;
        ensure_period("MACD signal", signal)?;
        if short >= long {
            return Err(EngineError::InvalidConfig(format!(
                "MACD short period ({}) must be less than long period ({})",
                short, long
            )));
        }
        Ok(Self { short, long, signal })
    }

    pub fn calculate(&self, prices: &[f64]) -> EngineResult<MacdResult> {
        ensure_len("MACD", prices.len(), self.required_period_threshold())?;

        let (a_short, a_long, a_signal) = (alpha(self.short), alpha(self.long), alpha(self.signal));

        let seed = mean(&prices[..self.long]);
        let mut short_ema = seed;
        let mut long_ema = seed;

        let mut macd_values = Vec::with_capacity(prices.len() - self.long + 1);
        macd_values.push(short_ema - long_ema);

        for &price in &prices[self.long..] {
            short_ema = ema_step(price, short_ema, a_short);
            long_ema = ema_step(price, long_ema, a_long);
            macd_values.push(short_ema - long_ema);
        }

        let mut signal = mean(&macd_values[..self.signal]);
        for &m in &macd_values[self.signal..] {
            signal = ema_step(m, signal, a_signal);
        }

        // ensure_len guarantees at least signal+1 MACD values
        let macd = macd_values[macd_values.len() - 1];

        Ok(MacdResult {
            macd,
            signal,
            histogram: macd - signal,
        })
    }
}

impl Indicator for Macd {
    fn name(&self) -> String {
        format!("macd_{}_{}_{}", self.short, self.long, self.signal)
    }

    fn period(&self) -> usize {
        self.long
    }

    fn required_period_threshold(&self) -> usize {
        self.long + self.signal
    }
}

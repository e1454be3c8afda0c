//! Relative Strength Index (RSI) with Wilder smoothing.
//!
//! avgGain/avgLoss are seeded with the mean of the first `period` deltas
//! and Wilder-smoothed over the rest. RSI = 100 when avgLoss is zero.

use super::{ensure_len, ensure_period, Indicator};
use crate::error::EngineResult;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> EngineResult<Self> {
        ensure_period("RSI", period)?;
        Ok(Self { period })
    }

    /// RSI of the whole series, in [0, 100].
    pub fn calculate(&self, prices: &[f64]) -> EngineResult<f64> {
        ensure_len("RSI", prices.len(), self.required_period_threshold())?;

        let p = self.period as f64;
        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;

        for i in 1..=self.period {
            let delta = prices[i] - prices[i - 1];
            if delta > 0.0 {
                avg_gain += delta;
            } else {
                avg_loss -= delta;
            }
        }
        avg_gain /= p;
        avg_loss /= p;

        for i in (self.period + 1)..prices.len() {
            let delta = prices[i] - prices[i - 1];
            let (gain, loss) = if delta > 0.0 { (delta, 0.0) } else { (0.0, -delta) };
            avg_gain = (avg_gain * (p - 1.0) + gain) / p;
            avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        }

        if avg_loss == 0.0 {
            return Ok(100.0);
        }

        let rs = avg_gain / avg_loss;
        Ok(100.0 - 100.0 / (1.0 + rs))
    }
}

impl Indicator for Rsi {
    fn name(&self) -> String {
        format!("rsi_{}", self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn required_period_threshold(&self) -> usize {
        self.period + 1
    }
}

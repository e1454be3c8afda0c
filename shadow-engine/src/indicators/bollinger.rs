//! Bollinger Bands over the last `period` prices.
//!
//! middle = SMA, stddev = population standard deviation of the same
//! window, bands = middle ± k * stddev.

use super::{ensure_len, ensure_period, mean, Indicator};
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub std_dev: f64,
}

impl BollingerResult {
    /// Where `price` sits between the bands: 0.0 at lower, 1.0 at upper.
    /// `None` when the bands have zero width.
    pub fn position_of(&self, price: f64) -> Option<f64> {
        let width = self.upper - self.lower;
        if width <= 0.0 {
            return None;
        }
        Some((price - self.lower) / width)
    }
}

#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
    k: f64,
}

impl BollingerBands {
    pub fn new(period: usize, k: f64) -> EngineResult<Self> {
        ensure_period("Bollinger", period)?;
        if k.is_nan() || k <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "Bollinger multiplier must be positive, got {}",
                k
            )));
        }
        Ok(Self { period, k })
    }

    pub fn calculate(&self, prices: &[f64]) -> EngineResult<BollingerResult> {
        ensure_len("Bollinger", prices.len(), self.period)?;

        let window = &prices[prices.len() - self.period..];
        let middle = mean(window);
        let variance =
            window.iter().map(|p| (p - middle).powi(2)).sum::<f64>() / self.period as f64;
        let std_dev = variance.sqrt();

        Ok(BollingerResult {
            upper: middle + self.k * std_dev,
            middle,
            lower: middle - self.k * std_dev,
            std_dev,
        })
    }
}

impl Indicator for BollingerBands {
    fn name(&self) -> String {
        format!("bb_{}_{}", self.period, self.k)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn required_period_threshold(&self) -> usize {
        self.period
    }
}

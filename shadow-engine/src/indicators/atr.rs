//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|), with
//! TR[0] = high[0] - low[0].
//! Seed ATR[period-1] = mean of the first `period` TRs, then Wilder
//! smoothing: ATR[i] = (ATR[i-1] * (period-1) + TR[i]) / period.

use super::{ensure_len, ensure_period, mean, Indicator};
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    pub fn new(period: usize) -> EngineResult<Self> {
        ensure_period("ATR", period)?;
        Ok(Self { period })
    }

    /// ATR series aligned with the input; `None` before index `period-1`.
    pub fn calculate(
        &self,
        highs: &[f64],
        lows: &[f64],
        closes: &[f64],
    ) -> EngineResult<Vec<Option<f64>>> {
        let n = highs.len();
        if lows.len() != n || closes.len() != n {
            return Err(EngineError::InsufficientData(
                "Input arrays must have the same length".to_string(),
            ));
        }
        ensure_len("ATR", n, self.period)?;

        let tr = true_range(highs, lows, closes);
        let mut out = vec![None; n];

        let mut prev = mean(&tr[..self.period]);
        out[self.period - 1] = Some(prev);

        let p = self.period as f64;
        for i in self.period..n {
            prev = (prev * (p - 1.0) + tr[i]) / p;
            out[i] = Some(prev);
        }

        Ok(out)
    }

    /// Most recent ATR value.
    pub fn latest(&self, highs: &[f64], lows: &[f64], closes: &[f64]) -> EngineResult<f64> {
        self.calculate(highs, lows, closes)?
            .last()
            .copied()
            .flatten()
            .ok_or_else(|| EngineError::InsufficientData("ATR produced no value".to_string()))
    }
}

impl Indicator for Atr {
    fn name(&self) -> String {
        format!("atr_{}", self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn required_period_threshold(&self) -> usize {
        self.period
    }
}

/// True Range series. Inputs must have equal length.
pub fn true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    let n = highs.len();
    let mut tr = Vec::with_capacity(n);

    for i in 0..n {
        let (h, l) = (highs[i], lows[i]);
        if i == 0 {
            tr.push(h - l);
        } else {
            let pc = closes[i - 1];
            tr.push((h - l).max((h - pc).abs()).max((l - pc).abs()));
        }
    }

    tr
}

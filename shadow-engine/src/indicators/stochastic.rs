//! Stochastic Oscillator (%K / %D).
//!
//! %K for a window = (close - lowestLow) / (highestHigh - lowestLow) * 100.
//! %K is taken over each of the last `d_period` windows (offset by one bar)
//! and %D is their mean. The reported %K is the most recent one.

use super::{ensure_len, ensure_period, Indicator};
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticResult {
    pub percent_k: f64,
    pub percent_d: f64,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    period: usize,
    d_period: usize,
}

impl Stochastic {
    pub fn new(period: usize, d_period: usize) -> EngineResult<Self> {
        ensure_period("Stochastic", period)?;
        ensure_period("Stochastic %D", d_period)?;
        Ok(Self { period, d_period })
    }

    /// # Errors
    /// `InsufficientData` when fewer than `period + d_period - 1` bars are
    /// given or the arrays differ in length; `FlatRange` when any window has
    /// highest high equal to lowest low.
    pub fn calculate(
        &self,
        highs: &[f64],
        lows: &[f64],
        closes: &[f64],
    ) -> EngineResult<StochasticResult> {
        let n = closes.len();
        if highs.len() != n || lows.len() != n {
            return Err(EngineError::InsufficientData(
                "Input arrays must have the same length".to_string(),
            ));
        }
        ensure_len("Stochastic", n, self.required_period_threshold())?;

        let mut k_values = Vec::with_capacity(self.d_period);
        // oldest window first
        for offset in (0..self.d_period).rev() {
            let end = n - offset;
            let start = end - self.period;

            let highest = highs[start..end].iter().copied().fold(f64::MIN, f64::max);
            let lowest = lows[start..end].iter().copied().fold(f64::MAX, f64::min);
            let range = highest - lowest;
            if range <= 0.0 {
                return Err(EngineError::FlatRange(self.period));
            }

            k_values.push((closes[end - 1] - lowest) / range * 100.0);
        }

        let percent_d = k_values.iter().sum::<f64>() / self.d_period as f64;
        let percent_k = k_values[k_values.len() - 1];

        Ok(StochasticResult { percent_k, percent_d })
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> String {
        format!("stoch_{}_{}", self.period, self.d_period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn required_period_threshold(&self) -> usize {
        self.period + self.d_period - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn stochastic_hand_computed() {
        let highs = [10.0, 12.0, 14.0, 13.0];
        let lows = [8.0, 9.0, 11.0, 10.0];
        let closes = [9.0, 11.0, 13.0, 11.0];

        let r = Stochastic::new(3, 2).unwrap().calculate(&highs, &lows, &closes).unwrap();

        // window [0..3]: hh 14, ll 8, close 13 -> 5/6*100
        // window [1..4]: hh 14, ll 9, close 11 -> 2/5*100
        assert_approx(r.percent_k, 40.0, DEFAULT_EPSILON);
        assert_approx(r.percent_d, (500.0 / 6.0 + 40.0) / 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn stochastic_values_in_range() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.4).sin() * 4.0).collect();
        let highs: Vec<f64> = closes.iter().map(|c| c + 1.0).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 1.0).collect();

        let r = Stochastic::new(14, 3).unwrap().calculate(&highs, &lows, &closes).unwrap();
        assert!((0.0..=100.0).contains(&r.percent_k));
        assert!((0.0..=100.0).contains(&r.percent_d));
    }

    #[test]
    fn stochastic_flat_window() {
        let flat = [5.0; 6];
        let err = Stochastic::new(3, 2).unwrap().calculate(&flat, &flat, &flat).unwrap_err();
        assert_eq!(err, EngineError::FlatRange(3));
    }

    #[test]
    fn stochastic_required_length() {
        let s = Stochastic::new(14, 3).unwrap();
        assert_eq!(s.required_period_threshold(), 16);
        let data = [1.0; 15];
        assert!(matches!(
            s.calculate(&data, &data, &data),
            Err(EngineError::InsufficientData(_))
        ));
    }
}

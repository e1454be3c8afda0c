//! RSI explorer: oversold favours long, overbought favours short.

use serde::{Deserialize, Serialize};
use shadow_domain::{Bar, ExplorationState};
use tracing::debug;

use super::{grade_above, grade_below, unready, Explorer};
use crate::error::EngineResult;
use crate::indicators::{closes, Indicator, Rsi};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiExplorerConfig {
    pub severity: u32,
    pub period: usize,
    pub oversold_threshold: f64,
    pub overbought_threshold: f64,
    pub long_medium_threshold: f64,
    pub short_medium_threshold: f64,
    pub long_minor_threshold: f64,
    pub short_minor_threshold: f64,
}

impl Default for RsiExplorerConfig {
    fn default() -> Self {
        Self {
            severity: 1,
            period: 14,
            oversold_threshold: 30.0,
            overbought_threshold: 70.0,
            long_medium_threshold: 35.0,
            short_medium_threshold: 65.0,
            long_minor_threshold: 40.0,
            short_minor_threshold: 60.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RsiExplorer {
    config: RsiExplorerConfig,
    rsi: Rsi,
}

impl RsiExplorer {
    pub fn new(config: RsiExplorerConfig) -> EngineResult<Self> {
        let rsi = Rsi::new(config.period)?;
        Ok(Self { config, rsi })
    }

    fn grade(&self, bars: &[Bar], long: bool) -> ExplorationState {
        let value = match self.rsi.calculate(&closes(bars)) {
            Ok(v) => v,
            Err(e) => return unready(&self.name(), &e),
        };

        let c = &self.config;
        let state = if long {
            grade_below(
                value,
                c.oversold_threshold,
                c.long_medium_threshold,
                c.long_minor_threshold,
            )
        } else {
            grade_above(
                value,
                c.overbought_threshold,
                c.short_medium_threshold,
                c.short_minor_threshold,
            )
        };

        debug!(explorer = %self.name(), long, rsi = value, %state, "rsi graded");
        state
    }
}

impl Explorer for RsiExplorer {
    fn name(&self) -> String {
        self.rsi.name()
    }

    fn severity(&self) -> u32 {
        self.config.severity
    }

    fn required_period_threshold(&self) -> usize {
        self.rsi.required_period_threshold()
    }

    fn explore_long(&self, bars: &[Bar]) -> ExplorationState {
        self.grade(bars, true)
    }

    fn explore_short(&self, bars: &[Bar]) -> ExplorationState {
        self.grade(bars, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::bars_from_closes;

    fn explorer() -> RsiExplorer {
        RsiExplorer::new(RsiExplorerConfig { period: 5, ..Default::default() }).unwrap()
    }

    #[test]
    fn falling_prices_are_major_long() {
        let bars = bars_from_closes(&[110.0, 108.0, 106.0, 104.0, 102.0, 100.0], 0.1);
        let e = explorer();
        assert_eq!(e.explore_long(&bars), ExplorationState::Major);
        assert_eq!(e.explore_short(&bars), ExplorationState::NotReady);
    }

    #[test]
    fn rising_prices_are_major_short() {
        let bars = bars_from_closes(&[100.0, 102.0, 104.0, 106.0, 108.0, 110.0], 0.1);
        let e = explorer();
        assert_eq!(e.explore_short(&bars), ExplorationState::Major);
        assert_eq!(e.explore_long(&bars), ExplorationState::NotReady);
    }

    #[test]
    fn balanced_prices_have_no_opinion() {
        // seed gains == losses -> RSI 50
        let bars = bars_from_closes(&[100.0, 101.0, 100.0, 101.0, 100.0], 0.1);
        let e = RsiExplorer::new(RsiExplorerConfig { period: 4, ..Default::default() }).unwrap();
        assert_eq!(e.explore_long(&bars), ExplorationState::NotReady);
        assert_eq!(e.explore_short(&bars), ExplorationState::NotReady);
    }

    #[test]
    fn insufficient_bars_not_ready() {
        let bars = bars_from_closes(&[100.0, 99.0, 98.0], 0.1);
        assert_eq!(explorer().explore_long(&bars), ExplorationState::NotReady);
    }
}

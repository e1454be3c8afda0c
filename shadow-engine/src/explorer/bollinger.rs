//! Bollinger explorer: grades where the latest close sits between the bands.
//!
//! Position `p = (close - lower) / (upper - lower)`: near or under the
//! lower band favours long, near or over the upper band favours short.
//! Zero-width bands carry no information and grade `NotReady`.

use serde::{Deserialize, Serialize};
use shadow_domain::{Bar, ExplorationState};
use tracing::debug;

use super::{unready, Explorer};
use crate::error::EngineResult;
use crate::indicators::{closes, BollingerBands, Indicator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerExplorerConfig {
    pub severity: u32,
    pub period: usize,
    pub standard_deviation_multiplier: f64,
    pub lower_band_threshold: f64,
    pub upper_band_threshold: f64,
    pub long_medium_threshold: f64,
    pub short_medium_threshold: f64,
    pub long_minor_threshold: f64,
    pub short_minor_threshold: f64,
}

impl Default for BollingerExplorerConfig {
    fn default() -> Self {
        Self {
            severity: 1,
            period: 20,
            standard_deviation_multiplier: 2.0,
            lower_band_threshold: 0.0,
            upper_band_threshold: 1.0,
            long_medium_threshold: 0.2,
            short_medium_threshold: 0.8,
            long_minor_threshold: 0.4,
            short_minor_threshold: 0.6,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BollingerExplorer {
    config: BollingerExplorerConfig,
    bands: BollingerBands,
}

impl BollingerExplorer {
    pub fn new(config: BollingerExplorerConfig) -> EngineResult<Self> {
        let bands = BollingerBands::new(config.period, config.standard_deviation_multiplier)?;
        Ok(Self { config, bands })
    }

    fn position(&self, bars: &[Bar]) -> Option<f64> {
        let prices = closes(bars);
        let result = match self.bands.calculate(&prices) {
            Ok(r) => r,
            Err(e) => {
                unready(&self.name(), &e);
                return None;
            }
        };
        let latest = prices.last().copied()?;
        result.position_of(latest)
    }

    fn grade(&self, bars: &[Bar], long: bool) -> ExplorationState {
        let Some(p) = self.position(bars) else {
            return ExplorationState::NotReady;
        };

        let c = &self.config;
        let state = if long {
            if p <= c.lower_band_threshold {
                ExplorationState::Major
            } else if p <= c.long_medium_threshold {
                ExplorationState::Medium
            } else if p <= c.long_minor_threshold {
                ExplorationState::Minor
            } else {
                ExplorationState::NotReady
            }
        } else if p >= c.upper_band_threshold {
            ExplorationState::Major
        } else if p >= c.short_medium_threshold {
            ExplorationState::Medium
        } else if p >= c.short_minor_threshold {
            ExplorationState::Minor
        } else {
            ExplorationState::NotReady
        };

        debug!(explorer = %self.name(), long, position = p, %state, "bollinger graded");
        state
    }
}

impl Explorer for BollingerExplorer {
    fn name(&self) -> String {
        self.bands.name()
    }

    fn severity(&self) -> u32 {
        self.config.severity
    }

    fn required_period_threshold(&self) -> usize {
        self.bands.required_period_threshold()
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
    use crate::testutil::{bars_from_closes, flat_bars};

    fn explorer() -> BollingerExplorer {
        BollingerExplorer::new(BollingerExplorerConfig {
            period: 5,
            standard_deviation_multiplier: 1.0,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn close_below_lower_band_is_major_long() {
        // mean 100.8, population stddev ~0.98: lower band ~99.82
        let bars = bars_from_closes(&[101.0, 101.0, 101.0, 102.0, 99.0], 0.1);
        let e = explorer();
        assert_eq!(e.explore_long(&bars), ExplorationState::Major);
        assert_eq!(e.explore_short(&bars), ExplorationState::NotReady);
    }

    #[test]
    fn close_above_upper_band_is_major_short() {
        let bars = bars_from_closes(&[101.0, 101.0, 101.0, 100.0, 103.0], 0.1);
        let e = explorer();
        assert_eq!(e.explore_short(&bars), ExplorationState::Major);
        assert_eq!(e.explore_long(&bars), ExplorationState::NotReady);
    }

    #[test]
    fn close_at_middle_has_no_opinion() {
        let bars = bars_from_closes(&[98.0, 102.0, 98.0, 102.0, 100.0], 0.1);
        let e = explorer();
        assert_eq!(e.explore_long(&bars), ExplorationState::NotReady);
        assert_eq!(e.explore_short(&bars), ExplorationState::NotReady);
    }

    #[test]
    fn zero_width_bands_not_ready() {
        let bars = flat_bars(10, 100.0);
        let e = explorer();
        assert_eq!(e.explore_long(&bars), ExplorationState::NotReady);
        assert_eq!(e.explore_short(&bars), ExplorationState::NotReady);
    }
}

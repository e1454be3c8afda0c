//! MACD explorer: histogram magnitude above the tier thresholds.
//!
//! Thresholds are symmetric: long grades `histogram > t`, short grades
//! `histogram < -t`.

use serde::{Deserialize, Serialize};
use shadow_domain::{Bar, ExplorationState};
use tracing::debug;

use super::{grade_above, grade_below, unready, Explorer};
use crate::error::EngineResult;
use crate::indicators::{closes, Indicator, Macd};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdExplorerConfig {
    pub severity: u32,
    pub short_period: usize,
    pub long_period: usize,
    pub signal_period: usize,
    pub histogram_major_threshold: f64,
    pub histogram_medium_threshold: f64,
    pub histogram_minor_threshold: f64,
}

impl Default for MacdExplorerConfig {
    fn default() -> Self {
        Self {
            severity: 1,
            short_period: 12,
            long_period: 26,
            signal_period: 9,
            histogram_major_threshold: 0.5,
            histogram_medium_threshold: 0.2,
            histogram_minor_threshold: 0.05,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MacdExplorer {
    config: MacdExplorerConfig,
    macd: Macd,
}

impl MacdExplorer {
    pub fn new(config: MacdExplorerConfig) -> EngineResult<Self> {
        let macd = Macd::new(config.short_period, config.long_period, config.signal_period)?;
        Ok(Self { config, macd })
    }

    fn grade(&self, bars: &[Bar], long: bool) -> ExplorationState {
        let histogram = match self.macd.calculate(&closes(bars)) {
            Ok(r) => r.histogram,
            Err(e) => return unready(&self.name(), &e),
        };

        let c = &self.config;
        let state = if long {
            grade_above(
                histogram,
                c.histogram_major_threshold,
                c.histogram_medium_threshold,
                c.histogram_minor_threshold,
            )
        } else {
            grade_below(
                histogram,
                -c.histogram_major_threshold,
                -c.histogram_medium_threshold,
                -c.histogram_minor_threshold,
            )
        };

        debug!(explorer = %self.name(), long, histogram, %state, "macd graded");
        state
    }
}

impl Explorer for MacdExplorer {
    fn name(&self) -> String {
        self.macd.name()
    }

    fn severity(&self) -> u32 {
        self.config.severity
    }

    fn required_period_threshold(&self) -> usize {
        self.macd.required_period_threshold()
    }

    fn explore_long(&self, bars: &[Bar]) -> ExplorationState {
        self.grade(bars, true)
    }

    fn explore_short(&self, bars: &[Bar]) -> ExplorationState {
        self.grade(bars, false)
    }
}

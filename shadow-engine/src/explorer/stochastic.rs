//! Stochastic explorer.
//!
//! Long needs %K rising through %D (`%K > %D`) in oversold territory;
//! short needs `%K < %D` in overbought territory.

use serde::{Deserialize, Serialize};
use shadow_domain::{Bar, ExplorationState};
use tracing::debug;

use super::{grade_above, grade_below, unready, Explorer};
use crate::error::EngineResult;
use crate::indicators::{closes, highs, lows, Indicator, Stochastic};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticExplorerConfig {
    pub severity: u32,
    pub period: usize,
    pub d_period: usize,
    pub oversold_threshold: f64,
    pub overbought_threshold: f64,
    pub long_medium_threshold: f64,
    pub short_medium_threshold: f64,
    pub long_minor_threshold: f64,
    pub short_minor_threshold: f64,
}

impl Default for StochasticExplorerConfig {
    fn default() -> Self {
        Self {
            severity: 1,
            period: 14,
            d_period: 3,
            oversold_threshold: 20.0,
            overbought_threshold: 80.0,
            long_medium_threshold: 30.0,
            short_medium_threshold: 70.0,
            long_minor_threshold: 40.0,
            short_minor_threshold: 60.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StochasticExplorer {
    config: StochasticExplorerConfig,
    stochastic: Stochastic,
}

impl StochasticExplorer {
    pub fn new(config: StochasticExplorerConfig) -> EngineResult<Self> {
        let stochastic = Stochastic::new(config.period, config.d_period)?;
        Ok(Self { config, stochastic })
    }

    fn grade(&self, bars: &[Bar], long: bool) -> ExplorationState {
        let result = match self.stochastic.calculate(&highs(bars), &lows(bars), &closes(bars)) {
            Ok(r) => r,
            Err(e) => return unready(&self.name(), &e),
        };
        let (k, d) = (result.percent_k, result.percent_d);

        let c = &self.config;
        let state = if long && k > d {
            grade_below(k, c.oversold_threshold, c.long_medium_threshold, c.long_minor_threshold)
        } else if !long && k < d {
            grade_above(
                k,
                c.overbought_threshold,
                c.short_medium_threshold,
                c.short_minor_threshold,
            )
        } else {
            ExplorationState::NotReady
        };

        debug!(
            explorer = %self.name(),
            long,
            percent_k = k,
            percent_d = d,
            %state,
            "stochastic graded"
        );
        state
    }
}

impl Explorer for StochasticExplorer {
    fn name(&self) -> String {
        self.stochastic.name()
    }

    fn severity(&self) -> u32 {
        self.config.severity
    }

    fn required_period_threshold(&self) -> usize {
        self.stochastic.required_period_threshold()
    }

    fn explore_long(&self, bars: &[Bar]) -> ExplorationState {
        self.grade(bars, true)
    }

    fn explore_short(&self, bars: &[Bar]) -> ExplorationState {
        self.grade(bars, false)
    }
}

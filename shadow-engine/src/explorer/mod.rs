//! Explorers: grade directional momentum from a bar window.
//!
//! Each explorer wraps one indicator and maps its reading onto an
//! [`ExplorationState`] for the long side and the short side. Tiers are
//! checked strongest first (MAJOR, then MEDIUM, then MINOR); anything
//! weaker, and any indicator failure, is `NotReady`.
//!
//! The set of explorers is closed: [`ExplorerConfig`] lists every variant
//! and is what robot configuration files deserialize into.

pub mod bollinger;
pub mod macd;
pub mod rsi;
pub mod stochastic;

pub use bollinger::{BollingerExplorer, BollingerExplorerConfig};
pub use macd::{MacdExplorer, MacdExplorerConfig};
pub use rsi::{RsiExplorer, RsiExplorerConfig};
pub use stochastic::{StochasticExplorer, StochasticExplorerConfig};

use serde::{Deserialize, Serialize};
use shadow_domain::{Bar, ExplorationState};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};

/// Capability shared by all explorers.
pub trait Explorer: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> String;

    /// Voting weight of this explorer.
    fn severity(&self) -> u32;

    /// Minimum bars needed before the explorer can form an opinion.
    fn required_period_threshold(&self) -> usize;

    /// Strength of the case for going long.
    fn explore_long(&self, bars: &[Bar]) -> ExplorationState;

    /// Strength of the case for going short.
    fn explore_short(&self, bars: &[Bar]) -> ExplorationState;
}

/// Explorer definition as found in robot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExplorerConfig {
    Rsi(RsiExplorerConfig),
    Macd(MacdExplorerConfig),
    Bollinger(BollingerExplorerConfig),
    Stochastic(StochasticExplorerConfig),
}

impl ExplorerConfig {
    /// Build the explorer this configuration describes.
    pub fn build(&self) -> EngineResult<Box<dyn Explorer>> {
        Ok(match self {
            ExplorerConfig::Rsi(c) => Box::new(RsiExplorer::new(c.clone())?),
            ExplorerConfig::Macd(c) => Box::new(MacdExplorer::new(c.clone())?),
            ExplorerConfig::Bollinger(c) => Box::new(BollingerExplorer::new(c.clone())?),
            ExplorerConfig::Stochastic(c) => Box::new(StochasticExplorer::new(c.clone())?),
        })
    }

    /// Default set: one explorer of each kind.
    pub fn default_set() -> Vec<ExplorerConfig> {
        vec![
            ExplorerConfig::Rsi(RsiExplorerConfig::default()),
            ExplorerConfig::Macd(MacdExplorerConfig::default()),
            ExplorerConfig::Bollinger(BollingerExplorerConfig::default()),
            ExplorerConfig::Stochastic(StochasticExplorerConfig::default()),
        ]
    }
}

/// `value < major` → MAJOR, `< medium` → MEDIUM, `< minor` → MINOR.
pub(crate) fn grade_below(value: f64, major: f64, medium: f64, minor: f64) -> ExplorationState {
    if value < major {
        ExplorationState::Major
    } else if value < medium {
        ExplorationState::Medium
    } else if value < minor {
        ExplorationState::Minor
    } else {
        ExplorationState::NotReady
    }
}

/// `value > major` → MAJOR, `> medium` → MEDIUM, `> minor` → MINOR.
pub(crate) fn grade_above(value: f64, major: f64, medium: f64, minor: f64) -> ExplorationState {
    if value > major {
        ExplorationState::Major
    } else if value > medium {
        ExplorationState::Medium
    } else if value > minor {
        ExplorationState::Minor
    } else {
        ExplorationState::NotReady
    }
}

/// Log an indicator failure and fold it into "no opinion".
pub(crate) fn unready(explorer: &str, err: &EngineError) -> ExplorationState {
    match err {
        EngineError::InsufficientData(_) | EngineError::FlatRange(_) => {
            debug!(explorer, error = %err, "explorer not ready");
        }
        EngineError::InvalidConfig(_) => {
            warn!(explorer, error = %err, "explorer failed");
        }
    }
    ExplorationState::NotReady
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grading_checks_strongest_tier_first() {
        assert_eq!(grade_below(10.0, 30.0, 40.0, 50.0), ExplorationState::Major);
        assert_eq!(grade_below(35.0, 30.0, 40.0, 50.0), ExplorationState::Medium);
        assert_eq!(grade_below(45.0, 30.0, 40.0, 50.0), ExplorationState::Minor);
        assert_eq!(grade_below(50.0, 30.0, 40.0, 50.0), ExplorationState::NotReady);

        assert_eq!(grade_above(0.6, 0.5, 0.2, 0.1), ExplorationState::Major);
        assert_eq!(grade_above(0.15, 0.5, 0.2, 0.1), ExplorationState::Minor);
        assert_eq!(grade_above(0.1, 0.5, 0.2, 0.1), ExplorationState::NotReady);
    }

    #[test]
    fn explorer_config_from_json() {
        let json = r#"[
            {"type": "rsi", "severity": 3, "period": 14,
             "oversold_threshold": 30.0, "overbought_threshold": 70.0,
             "long_medium_threshold": 35.0, "short_medium_threshold": 65.0,
             "long_minor_threshold": 40.0, "short_minor_threshold": 60.0},
            {"type": "macd", "severity": 2}
        ]"#;

        let configs: Vec<ExplorerConfig> = serde_json::from_str(json).unwrap();
        assert_eq!(configs.len(), 2);
        assert!(matches!(&configs[0], ExplorerConfig::Rsi(c) if c.severity == 3));
        assert_eq!(
            configs[1],
            ExplorerConfig::Macd(MacdExplorerConfig {
                severity: 2,
                ..Default::default()
            })
        );

        let built: Vec<_> = configs.iter().map(|c| c.build().unwrap()).collect();
        assert_eq!(built[0].required_period_threshold(), 15);
        assert_eq!(built[1].required_period_threshold(), 35);
    }

    #[test]
    fn default_set_builds() {
        for config in ExplorerConfig::default_set() {
            let explorer = config.build().unwrap();
            assert!(explorer.severity() > 0);
        }
    }
}

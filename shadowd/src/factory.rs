//! Builds robots from their configuration.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use shadow_engine::VotingStrategy;
use shadow_exec::Clock;
use shadow_sim::{PriceFeed, ReplayBarSource, SimulatedGateway, VirtualAccount};

use crate::config::RobotConfig;
use crate::error::{DaemonError, DaemonResult};
use crate::robot::{RobotSettings, SinglePositionRobot};
use crate::scheduler::RobotScheduler;

/// Robot replaying historical bars against the shared virtual account.
pub type SimulatedRobot = SinglePositionRobot<ReplayBarSource, SimulatedGateway>;

/// Wires robots to the simulated venue.
///
/// Every robot gets its own replay source and gateway; all gateways share
/// one [`VirtualAccount`].
pub struct RobotFactory {
    account: Arc<VirtualAccount>,
    clock: Arc<dyn Clock>,
}

impl RobotFactory {
    pub fn new(account: Arc<VirtualAccount>, clock: Arc<dyn Clock>) -> Self {
        Self { account, clock }
    }

    /// Build the strategy a robot definition describes.
    pub fn create_strategy(config: &RobotConfig) -> DaemonResult<VotingStrategy> {
        let explorers = config
            .explorers
            .iter()
            .map(|e| e.build())
            .collect::<Result<Vec<_>, _>>()?;
        let blockers = config
            .blockers
            .iter()
            .map(|b| b.build())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VotingStrategy::new(
            explorers,
            blockers,
            config.order.stop_loss_pct,
            config.multipliers,
        )?)
    }

    pub fn create_robot(&self, config: &RobotConfig) -> DaemonResult<SimulatedRobot> {
        let file = config
            .historical_data_file
            .as_deref()
            .ok_or_else(|| {
                DaemonError::Config(format!("robot {} has no historical_data_file", config.symbol))
            })?;

        let strategy = Self::create_strategy(config)?;
        let required = strategy.required_period_threshold();

        let source = Arc::new(ReplayBarSource::new(config.symbol.as_str(), file));
        let feed: Arc<dyn PriceFeed> = source.clone();
        let gateway = Arc::new(SimulatedGateway::new(Arc::clone(&self.account), feed));

        let settings = RobotSettings {
            symbol: config.symbol.clone(),
            timeframe: config.timeframe,
            percentage_from_deposit: config.order.percentage_from_deposit,
            futures_multiplier: config.order.futures_multiplier,
        };

        info!(
            symbol = %config.symbol,
            timeframe = %config.timeframe,
            required,
            file,
            ?strategy,
            "Robot created"
        );

        Ok(SinglePositionRobot::new(
            settings,
            source,
            gateway,
            strategy,
            Arc::clone(&self.clock),
        ))
    }

    /// Build a robot and wrap it in its scheduler.
    pub fn create_scheduler(
        &self,
        config: &RobotConfig,
        shutdown_timeout: Duration,
    ) -> DaemonResult<RobotScheduler> {
        let robot = self.create_robot(config)?;
        Ok(RobotScheduler::new(robot, Arc::clone(&self.clock), shutdown_timeout))
    }
}

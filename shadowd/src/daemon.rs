//! Daemon runtime: builds the robots and runs them until shutdown.

use std::sync::Arc;

use tracing::{error, info};

use shadow_exec::{Clock, SystemClock};
use shadow_sim::VirtualAccount;

use crate::config::Config;
use crate::error::DaemonResult;
use crate::factory::RobotFactory;
use crate::manager::RobotManager;

/// Main daemon runtime.
pub struct Daemon {
    config: Config,
    account: Arc<VirtualAccount>,
    manager: RobotManager,
}

impl Daemon {
    /// Validate the configuration and build one scheduler per robot.
    pub fn new(config: Config) -> DaemonResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> DaemonResult<Self> {
        config.validate()?;

        let account = Arc::new(VirtualAccount::new(config.virtual_balance));
        let factory = RobotFactory::new(Arc::clone(&account), clock);

        let schedulers = config
            .robots
            .iter()
            .map(|robot| factory.create_scheduler(robot, config.shutdown_timeout))
            .collect::<DaemonResult<Vec<_>>>()?;

        let manager = RobotManager::new(schedulers, config.shutdown_timeout);
        info!(robots = manager.len(), "Daemon assembled");

        Ok(Self {
            config,
            account,
            manager,
        })
    }

    pub fn account(&self) -> &Arc<VirtualAccount> {
        &self.account
    }

    pub fn manager(&self) -> &RobotManager {
        &self.manager
    }

    /// Start every robot, wait for ctrl-c, then stop them.
    pub async fn run(mut self) -> DaemonResult<()> {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            environment = %self.config.environment,
            robots = self.manager.len(),
            "Starting Shadow daemon"
        );

        self.start();

        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Received shutdown signal");

        self.shutdown().await;
        Ok(())
    }

    /// Start every robot without waiting for a signal.
    pub fn start(&mut self) {
        self.manager.start();
    }

    /// Stop all robots and report the final account state.
    pub async fn shutdown(&mut self) {
        self.manager.stop().await;

        info!(
            balance = %self.account.balance(),
            open_orders = self.account.open_orders().len(),
            closed_orders = self.account.closed_orders().len(),
            "Daemon stopped"
        );
    }
}

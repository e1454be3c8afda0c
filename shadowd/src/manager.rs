//! Robot manager: starts and stops every robot scheduler.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::scheduler::RobotScheduler;

/// Owns the robot schedulers of the daemon.
///
/// `start()` submits each scheduler's start to a worker set and returns
/// without waiting; `stop()` stops every scheduler, then drains the worker
/// set within the shutdown timeout.
pub struct RobotManager {
    schedulers: Vec<Arc<Mutex<RobotScheduler>>>,
    workers: JoinSet<()>,
    shutdown_timeout: Duration,
    stopping: CancellationToken,
}

impl RobotManager {
    pub fn new(schedulers: Vec<RobotScheduler>, shutdown_timeout: Duration) -> Self {
        Self {
            schedulers: schedulers
                .into_iter()
                .map(|s| Arc::new(Mutex::new(s)))
                .collect(),
            workers: JoinSet::new(),
            shutdown_timeout,
            stopping: CancellationToken::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.schedulers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedulers.is_empty()
    }

    /// Shared handles to the managed schedulers.
    pub fn schedulers(&self) -> &[Arc<Mutex<RobotScheduler>>] {
        &self.schedulers
    }

    /// Submit one start per scheduler. Must be called within a tokio runtime.
    pub fn start(&mut self) {
        for scheduler in &self.schedulers {
            let scheduler = Arc::clone(scheduler);
            let stopping = self.stopping.clone();

            self.workers.spawn(async move {
                let mut scheduler = scheduler.lock().await;
                let symbol = scheduler.symbol().to_string();
                if stopping.is_cancelled() {
                    debug!(%symbol, "Manager stopping, start skipped");
                    return;
                }

                debug!(%symbol, "Starting robot scheduler");
                tokio::select! {
                    biased;
                    _ = stopping.cancelled() => {
                        warn!(%symbol, "Manager stopping, robot start abandoned");
                    }
                    result = scheduler.start() => {
                        if let Err(e) = result {
                            error!(%symbol, error = %e, "Failed to start robot scheduler");
                        }
                    }
                }
            });
        }

        info!(count = self.schedulers.len(), "All robot schedulers have been started");
    }

    /// Stop every scheduler, then wait for outstanding start jobs.
    ///
    /// Pending starts are abandoned. Returns `false` if a scheduler could not
    /// be stopped cleanly or the worker set had to be aborted.
    pub async fn stop(&mut self) -> bool {
        info!("Stopping robot schedulers...");
        self.stopping.cancel();

        let mut clean = true;
        for scheduler in &self.schedulers {
            match tokio::time::timeout(self.shutdown_timeout, scheduler.lock()).await {
                Ok(mut scheduler) => clean &= scheduler.stop().await,
                Err(_) => {
                    warn!(
                        timeout_secs = self.shutdown_timeout.as_secs(),
                        "Timeout waiting for robot scheduler lock, skipping its stop"
                    );
                    clean = false;
                }
            }
        }

        let workers = &mut self.workers;
        let drained = tokio::time::timeout(self.shutdown_timeout, async {
            while let Some(result) = workers.join_next().await {
                if let Err(e) = result {
                    warn!(error = %e, "Robot scheduler start job failed");
                }
            }
        })
        .await;

        match drained {
            Ok(()) if clean => {
                info!("All robot schedulers have been stopped successfully");
                true
            }
            Ok(()) => {
                warn!("Robot schedulers stopped, some not cleanly");
                false
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.shutdown_timeout.as_secs(),
                    "Timeout occurred while waiting for robot schedulers to stop"
                );
                self.workers.abort_all();
                false
            }
        }
    }
}

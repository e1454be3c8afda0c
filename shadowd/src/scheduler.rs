//! Periodic task scheduling.
//!
//! # Timing
//!
//! ```text
//! now ──delay──→ boundary ──period──→ boundary ──period──→ ...
//!                  run()               run()
//! ```
//!
//! The first cycle fires on the next whole-period boundary of the wall
//! clock, later cycles at a fixed rate. A cycle is awaited before the next
//! tick is taken, so cycles of one robot never overlap; ticks missed while a
//! slow cycle ran fire back to back afterwards.
//!
//! # Graceful Shutdown
//!
//! `stop()` cancels future ticks via `CancellationToken` and waits for the
//! in-flight cycle up to the shutdown timeout, then aborts the task.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use shadow_domain::Timeframe;
use shadow_exec::{initial_delay_millis, Clock};

use crate::error::{DaemonError, DaemonResult};
use crate::robot::Robot;

// =============================================================================
// Task scheduler
// =============================================================================

/// Runs one async task at a fixed rate on its own tokio task.
pub struct TaskScheduler {
    name: String,
    shutdown_timeout: Duration,
    cancel_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl TaskScheduler {
    pub fn new(name: impl Into<String>, shutdown_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            shutdown_timeout,
            cancel_token: CancellationToken::new(),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Schedule `task` to first run after `initial_delay`, then every `period`.
    ///
    /// # Errors
    /// - `Config` if `period` is zero
    /// - `InvalidState` if already started
    pub fn start<F, Fut>(
        &mut self,
        mut task: F,
        initial_delay: Duration,
        period: Duration,
    ) -> DaemonResult<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if period.is_zero() {
            return Err(DaemonError::Config(format!("{}: period must be positive", self.name)));
        }
        if self.handle.is_some() {
            return Err(DaemonError::InvalidState(format!("{}: already started", self.name)));
        }
        if self.cancel_token.is_cancelled() {
            self.cancel_token = CancellationToken::new();
        }

        let name = self.name.clone();
        let cancel_token = self.cancel_token.clone();
        let first_tick = Instant::now() + initial_delay;

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

            info!(
                task = %name,
                initial_delay_ms = initial_delay.as_millis() as u64,
                period_ms = period.as_millis() as u64,
                "Task scheduler started"
            );

            loop {
                tokio::select! {
                    biased;
                    _ = cancel_token.cancelled() => {
                        debug!(task = %name, "Task scheduler cancelled via token");
                        break;
                    }
                    _ = ticker.tick() => {
                        task().await;
                    }
                }
            }

            info!(task = %name, "Task scheduler stopped");
        }));

        Ok(())
    }

    /// Cancel future ticks and wait for the in-flight cycle.
    ///
    /// Returns `false` if the task had to be aborted.
    pub async fn stop(&mut self) -> bool {
        self.cancel_token.cancel();

        let Some(mut handle) = self.handle.take() else {
            return true;
        };

        match tokio::time::timeout(self.shutdown_timeout, &mut handle).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(task = %self.name, error = %e, "Scheduled task ended abnormally");
                true
            }
            Err(_) => {
                warn!(
                    task = %self.name,
                    timeout_secs = self.shutdown_timeout.as_secs(),
                    "Timeout waiting for scheduled task, aborting"
                );
                handle.abort();
                false
            }
        }
    }
}

impl Drop for TaskScheduler {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

// =============================================================================
// Robot scheduler
// =============================================================================

/// Drives one robot on its timeframe, aligned to wall-clock boundaries.
pub struct RobotScheduler {
    robot: Arc<Mutex<dyn Robot>>,
    symbol: String,
    timeframe: Timeframe,
    clock: Arc<dyn Clock>,
    scheduler: TaskScheduler,
}

impl RobotScheduler {
    pub fn new<R>(robot: R, clock: Arc<dyn Clock>, shutdown_timeout: Duration) -> Self
    where
        R: Robot + 'static,
    {
        let symbol = robot.symbol().to_string();
        let timeframe = robot.timeframe();
        let scheduler =
            TaskScheduler::new(format!("robot-{}-{}", symbol, timeframe), shutdown_timeout);

        Self {
            robot: Arc::new(Mutex::new(robot)),
            symbol,
            timeframe,
            clock,
            scheduler,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Shared handle to the robot, for inspection.
    pub fn robot(&self) -> Arc<Mutex<dyn Robot>> {
        Arc::clone(&self.robot)
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Initialise the robot and schedule its cycles.
    pub async fn start(&mut self) -> DaemonResult<()> {
        info!(symbol = %self.symbol, timeframe = %self.timeframe, "Starting scheduler for robot");

        self.robot.lock().await.init().await?;

        let delay_ms =
            initial_delay_millis(self.clock.now_millis(), self.timeframe.period_millis());
        let robot = Arc::clone(&self.robot);
        let symbol = self.symbol.clone();

        self.scheduler.start(
            move || {
                let robot = Arc::clone(&robot);
                let symbol = symbol.clone();
                async move {
                    debug!(%symbol, "Executing robot cycle");
                    robot.lock().await.run().await;
                }
            },
            Duration::from_millis(delay_ms),
            self.timeframe.period(),
        )?;

        info!(symbol = %self.symbol, delay_ms, "Scheduler started");
        Ok(())
    }

    /// Stop ticking, then run the robot's stop hook.
    ///
    /// Returns `false` if the in-flight cycle had to be aborted.
    pub async fn stop(&mut self) -> bool {
        info!(symbol = %self.symbol, "Stopping scheduler for robot");
        let graceful = self.scheduler.stop().await;
        self.robot.lock().await.stop().await;
        info!(symbol = %self.symbol, graceful, "Scheduler stopped");
        graceful
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Single-position trading robot.
//!
//! # State Machine
//!
//! ```text
//!              LONG/SHORT momentum
//!  EXPLORING ───────────────────────→ IN_POSITION
//!      ↑                                   │
//!      └─────── close in advance ──────────┘
//!        (blocked, or vote against position)
//! ```
//!
//! Each cycle collects new bars, and only evaluates once the buffer holds
//! as many bars as the strategy requires. A failing cycle is logged and
//! leaves the state untouched; the next tick retries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use shadow_domain::{Order, Position, PositionType, Timeframe};
use shadow_engine::{BarBuffer, PositionAction, VotingStrategy};
use shadow_exec::{
    millis_to_datetime, shift_back_to_previous_period, BarSource, Clock, OpenOrderRequest,
    OrderGateway,
};

use crate::error::DaemonResult;

// =============================================================================
// Robot
// =============================================================================

/// A robot driven by a scheduler.
#[async_trait]
pub trait Robot: Send {
    /// Reset to EXPLORING, initialise collaborators and collect the first bars.
    async fn init(&mut self) -> DaemonResult<()>;

    /// Run one cycle. Failures are logged, never returned.
    async fn run(&mut self);

    /// Shutdown hook.
    async fn stop(&mut self);

    fn symbol(&self) -> &str;

    fn timeframe(&self) -> Timeframe;

    /// Currently held positions (at most one for a single-position robot).
    fn positions(&self) -> Vec<Position>;

    fn percentage_from_deposit(&self) -> Decimal;

    fn futures_multiplier(&self) -> u32;
}

/// Position state of a [`SinglePositionRobot`].
#[derive(Debug, Clone, PartialEq)]
pub enum RobotState {
    /// No position, looking for an entry
    Exploring,
    /// Holding exactly one position backed by one order
    InPosition { position: Position, order: Order },
}

impl RobotState {
    pub fn is_exploring(&self) -> bool {
        matches!(self, RobotState::Exploring)
    }
}

impl fmt::Display for RobotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RobotState::Exploring => write!(f, "EXPLORING"),
            RobotState::InPosition { .. } => write!(f, "IN_POSITION"),
        }
    }
}

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Not enough bars to evaluate
    Skipped { held: usize, required: usize },
    /// Exploring, no entry signal
    Idle,
    /// Entered a position
    Opened(PositionType),
    /// In position, kept it
    Holding,
    /// Closed the held position
    Closed(PositionType),
}

/// Static trading parameters of a robot.
#[derive(Debug, Clone)]
pub struct RobotSettings {
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Share of the deposit per order, in percent
    pub percentage_from_deposit: Decimal,
    pub futures_multiplier: u32,
}

// =============================================================================
// Single-position robot
// =============================================================================

/// Robot holding at most one position at a time.
pub struct SinglePositionRobot<B, G> {
    settings: RobotSettings,
    bar_source: Arc<B>,
    gateway: Arc<G>,
    strategy: VotingStrategy,
    clock: Arc<dyn Clock>,
    buffer: BarBuffer,
    /// Lower bound of the very first collection
    initial_from: DateTime<Utc>,
    state: RobotState,
}

impl<B, G> SinglePositionRobot<B, G>
where
    B: BarSource,
    G: OrderGateway,
{
    pub fn new(
        settings: RobotSettings,
        bar_source: Arc<B>,
        gateway: Arc<G>,
        strategy: VotingStrategy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let buffer = BarBuffer::new(strategy.required_period_threshold());
        let mut robot = Self {
            settings,
            bar_source,
            gateway,
            strategy,
            clock,
            buffer,
            initial_from: DateTime::<Utc>::default(),
            state: RobotState::Exploring,
        };
        robot.initial_from = robot.initial_instant();
        robot
    }

    pub fn state(&self) -> &RobotState {
        &self.state
    }

    /// Bars currently held.
    pub fn bar_count(&self) -> usize {
        self.buffer.len()
    }

    /// Start of the first collection: `required` whole periods before the
    /// previous period boundary.
    pub fn initial_instant(&self) -> DateTime<Utc> {
        let required = self.strategy.required_period_threshold() as u64;
        millis_to_datetime(shift_back_to_previous_period(
            self.clock.now_millis(),
            self.settings.timeframe.period_millis(),
            required,
        ))
    }

    /// Run one cycle, returning what it did.
    ///
    /// State changes only after the order call it depends on succeeded.
    pub async fn run_cycle(&mut self) -> DaemonResult<CycleOutcome> {
        self.collect().await?;

        let required = self.strategy.required_period_threshold();
        let held = self.buffer.len();
        if held < required {
            info!(
                symbol = %self.settings.symbol,
                held,
                required,
                "Not enough bars, skipping evaluation"
            );
            return Ok(CycleOutcome::Skipped { held, required });
        }

        let outcome = match self.state.clone() {
            RobotState::Exploring => self.explore().await?,
            RobotState::InPosition { position, order } => self.manage(position, order).await?,
        };

        info!(
            symbol = %self.settings.symbol,
            state = %self.state,
            ?outcome,
            "Position state after run"
        );
        Ok(outcome)
    }

    async fn collect(&mut self) -> DaemonResult<usize> {
        let from = self.buffer.last_time().unwrap_or(self.initial_from);
        let to = self.clock.now();

        let bars = self
            .bar_source
            .collect_bars(&self.settings.symbol, self.settings.timeframe, from, to)
            .await?;
        let received = bars.len();
        let added = self.buffer.extend(bars);

        debug!(
            symbol = %self.settings.symbol,
            %from,
            %to,
            received,
            added,
            held = self.buffer.len(),
            "Bars collected"
        );
        Ok(added)
    }

    async fn explore(&mut self) -> DaemonResult<CycleOutcome> {
        let momentum = self.strategy.calculate_position_momentum(self.buffer.as_slice());

        let position_type = match momentum.action {
            PositionAction::Long => PositionType::Long,
            PositionAction::Short => PositionType::Short,
            PositionAction::DoNothing => return Ok(CycleOutcome::Idle),
        };
        let Some(stop_loss) = momentum.stop_loss else {
            warn!(
                symbol = %self.settings.symbol,
                %position_type,
                "Momentum without stop loss, not opening"
            );
            return Ok(CycleOutcome::Idle);
        };

        let request = OpenOrderRequest {
            symbol: self.settings.symbol.clone(),
            entry: None,
            take_profits: Vec::new(),
            stop_loss,
            percentage_from_deposit: self.settings.percentage_from_deposit,
            futures_multiplier: self.settings.futures_multiplier,
        };

        let order = match position_type {
            PositionType::Long => self.gateway.open_long(request).await?,
            PositionType::Short => self.gateway.open_short(request).await?,
        };
        let position = Position::new(position_type, order.entry, Some(stop_loss));

        info!(
            symbol = %self.settings.symbol,
            order_id = order.id,
            %position_type,
            entry = %order.entry,
            %stop_loss,
            "Position opened"
        );

        self.state = RobotState::InPosition { position, order };
        Ok(CycleOutcome::Opened(position_type))
    }

    async fn manage(&mut self, position: Position, order: Order) -> DaemonResult<CycleOutcome> {
        if !self
            .strategy
            .is_time_to_close_position_in_advance(self.buffer.as_slice(), &position)
        {
            return Ok(CycleOutcome::Holding);
        }

        self.gateway.close_order(&order).await?;
        info!(
            symbol = %self.settings.symbol,
            order_id = order.id,
            position_type = %position.position_type,
            "Position closed in advance"
        );

        self.state = RobotState::Exploring;
        Ok(CycleOutcome::Closed(position.position_type))
    }
}

#[async_trait]
impl<B, G> Robot for SinglePositionRobot<B, G>
where
    B: BarSource + 'static,
    G: OrderGateway + 'static,
{
    async fn init(&mut self) -> DaemonResult<()> {
        self.state = RobotState::Exploring;
        self.buffer.clear();

        self.bar_source.init().await?;
        self.gateway.init().await?;

        self.initial_from = self.initial_instant();
        self.collect().await?;

        info!(
            symbol = %self.settings.symbol,
            timeframe = %self.settings.timeframe,
            from = %self.initial_from,
            held = self.buffer.len(),
            state = %self.state,
            "Robot initialized"
        );
        Ok(())
    }

    async fn run(&mut self) {
        if let Err(e) = self.run_cycle().await {
            error!(
                symbol = %self.settings.symbol,
                state = %self.state,
                error = %e,
                "Robot cycle failed"
            );
        }
    }

    async fn stop(&mut self) {
        info!(symbol = %self.settings.symbol, state = %self.state, "Stopping robot");
    }

    fn symbol(&self) -> &str {
        &self.settings.symbol
    }

    fn timeframe(&self) -> Timeframe {
        self.settings.timeframe
    }

    fn positions(&self) -> Vec<Position> {
        match &self.state {
            RobotState::InPosition { position, .. } => vec![position.clone()],
            RobotState::Exploring => Vec::new(),
        }
    }

    fn percentage_from_deposit(&self) -> Decimal {
        self.settings.percentage_from_deposit
    }

    fn futures_multiplier(&self) -> u32 {
        self.settings.futures_multiplier
    }
}

// =============================================================================
// Tests
// =============================================================================

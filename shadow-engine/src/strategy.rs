//! Severity voting strategy.
//!
//! Every explorer votes on both sides. A vote weighs
//! `explorer.severity × multiplier[state]`; `NotReady` never votes.
//! The side with more voting power wins, a tie does nothing, and any
//! blocker vetoes the whole round.
//!
//! # Decision table
//!
//! ```text
//! blocked            → DO_NOTHING          (close in advance if holding)
//! long > short       → LONG,  SL = close - close × pct
//! long < short       → SHORT, SL = close + close × pct
//! long == short      → DO_NOTHING          (never forces a close)
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shadow_domain::{Bar, ExplorationState, Position, PositionType};
use std::fmt;
use tracing::{debug, info, warn};

use crate::blocker::Blocker;
use crate::error::{EngineError, EngineResult};
use crate::explorer::Explorer;

// =============================================================================
// Severity multipliers
// =============================================================================

/// Weight applied per exploration tier.
///
/// # Invariants
/// - Every tier has a weight
/// - Every weight is non-negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMultipliers", into = "RawMultipliers")]
pub struct SeverityMultipliers {
    not_ready: u32,
    minor: u32,
    medium: u32,
    major: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawMultipliers {
    not_ready: i64,
    minor: i64,
    medium: i64,
    major: i64,
}

impl TryFrom<RawMultipliers> for SeverityMultipliers {
    type Error = EngineError;

    fn try_from(raw: RawMultipliers) -> Result<Self, Self::Error> {
        SeverityMultipliers::new(raw.not_ready, raw.minor, raw.medium, raw.major)
    }
}

impl From<SeverityMultipliers> for RawMultipliers {
    fn from(m: SeverityMultipliers) -> Self {
        Self {
            not_ready: m.not_ready.into(),
            minor: m.minor.into(),
            medium: m.medium.into(),
            major: m.major.into(),
        }
    }
}

impl SeverityMultipliers {
    /// # Errors
    /// `InvalidConfig` if any weight is negative or does not fit in `u32`.
    pub fn new(not_ready: i64, minor: i64, medium: i64, major: i64) -> EngineResult<Self> {
        let check = |tier: &str, v: i64| -> EngineResult<u32> {
            u32::try_from(v).map_err(|_| {
                EngineError::InvalidConfig(format!(
                    "{} multiplier must be a non-negative integer, got {}",
                    tier, v
                ))
            })
        };

        let multipliers = Self {
            not_ready: check("not_ready", not_ready)?,
            minor: check("minor", minor)?,
            medium: check("medium", medium)?,
            major: check("major", major)?,
        };

        if !(multipliers.minor <= multipliers.medium && multipliers.medium <= multipliers.major) {
            warn!(?multipliers, "severity multipliers are not non-decreasing across tiers");
        }

        Ok(multipliers)
    }

    /// Weight for a tier.
    pub fn get(&self, state: ExplorationState) -> u32 {
        match state {
            ExplorationState::NotReady => self.not_ready,
            ExplorationState::Minor => self.minor,
            ExplorationState::Medium => self.medium,
            ExplorationState::Major => self.major,
        }
    }
}

impl Default for SeverityMultipliers {
    fn default() -> Self {
        Self {
            not_ready: 0,
            minor: 1,
            medium: 2,
            major: 3,
        }
    }
}

// =============================================================================
// Momentum
// =============================================================================

/// What the strategy wants the robot to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionAction {
    Long,
    Short,
    DoNothing,
}

impl fmt::Display for PositionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionAction::Long => write!(f, "LONG"),
            PositionAction::Short => write!(f, "SHORT"),
            PositionAction::DoNothing => write!(f, "DO_NOTHING"),
        }
    }
}

/// Strategy decision. `stop_loss` is present for LONG/SHORT only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionMomentum {
    pub action: PositionAction,
    pub stop_loss: Option<Decimal>,
}

impl PositionMomentum {
    pub fn do_nothing() -> Self {
        Self {
            action: PositionAction::DoNothing,
            stop_loss: None,
        }
    }
}

/// Voting power tally for one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VotingPower {
    pub long: u64,
    pub short: u64,
}

impl VotingPower {
    /// `long - short`.
    pub fn difference(&self) -> i64 {
        self.long as i64 - self.short as i64
    }
}

// =============================================================================
// Voting strategy
// =============================================================================

pub struct VotingStrategy {
    explorers: Vec<Box<dyn Explorer>>,
    blockers: Vec<Box<dyn Blocker>>,
    /// Stop-loss distance as a fraction of the close (0.02 = 2%)
    stop_loss_percent: Decimal,
    multipliers: SeverityMultipliers,
}

impl VotingStrategy {
    /// # Errors
    /// `InvalidConfig` if `stop_loss_percent` is negative.
    pub fn new(
        explorers: Vec<Box<dyn Explorer>>,
        blockers: Vec<Box<dyn Blocker>>,
        stop_loss_percent: Decimal,
        multipliers: SeverityMultipliers,
    ) -> EngineResult<Self> {
        if stop_loss_percent < Decimal::ZERO {
            return Err(EngineError::InvalidConfig(format!(
                "stop loss percent must be non-negative, got {}",
                stop_loss_percent
            )));
        }

        Ok(Self {
            explorers,
            blockers,
            stop_loss_percent,
            multipliers,
        })
    }

    /// Largest bar requirement across explorers and blockers.
    pub fn required_period_threshold(&self) -> usize {
        self.explorers
            .iter()
            .map(|e| e.required_period_threshold())
            .chain(self.blockers.iter().map(|b| b.required_period_threshold()))
            .max()
            .unwrap_or(0)
    }

    pub fn multipliers(&self) -> SeverityMultipliers {
        self.multipliers
    }

    /// Whether any blocker vetoes trading on this window.
    pub fn is_blocked(&self, bars: &[Bar]) -> bool {
        self.blockers.iter().any(|b| b.is_blocking(bars))
    }

    /// Tally long and short voting power.
    pub fn votes(&self, bars: &[Bar]) -> VotingPower {
        let mut power = VotingPower::default();

        for explorer in &self.explorers {
            let severity = u64::from(explorer.severity());

            let long_state = explorer.explore_long(bars);
            if long_state.is_ready() {
                power.long += severity * u64::from(self.multipliers.get(long_state));
            }

            let short_state = explorer.explore_short(bars);
            if short_state.is_ready() {
                power.short += severity * u64::from(self.multipliers.get(short_state));
            }

            debug!(explorer = %explorer.name(), %long_state, %short_state, "explorer voted");
        }

        debug!(long = power.long, short = power.short, "voting power");
        power
    }

    pub fn calculate_position_momentum(&self, bars: &[Bar]) -> PositionMomentum {
        let Some(latest) = bars.last() else {
            return PositionMomentum::do_nothing();
        };

        if self.is_blocked(bars) {
            info!("blocked, doing nothing");
            return PositionMomentum::do_nothing();
        }

        let power = self.votes(bars);
        let action = match power.difference() {
            d if d > 0 => PositionAction::Long,
            d if d < 0 => PositionAction::Short,
            _ => return PositionMomentum::do_nothing(),
        };

        let stop_loss = self.stop_loss(action, latest.close);
        info!(%action, long = power.long, short = power.short, ?stop_loss, "momentum detected");

        PositionMomentum { action, stop_loss }
    }

    /// Whether a held position should be closed before its stop.
    ///
    /// True when blocked or when the vote points against the position.
    /// A tie keeps the position.
    pub fn is_time_to_close_position_in_advance(&self, bars: &[Bar], position: &Position) -> bool {
        if self.is_blocked(bars) {
            info!(position_type = %position.position_type, "blocked, closing in advance");
            return true;
        }

        let diff = self.votes(bars).difference();
        let against = match position.position_type {
            PositionType::Long => diff < 0,
            PositionType::Short => diff > 0,
        };

        if against {
            info!(position_type = %position.position_type, diff, "vote turned against position");
        }
        against
    }

    fn stop_loss(&self, action: PositionAction, close: Decimal) -> Option<Decimal> {
        let adjustment = close * self.stop_loss_percent;
        match action {
            PositionAction::Long => Some(close - adjustment),
            PositionAction::Short => Some(close + adjustment),
            PositionAction::DoNothing => None,
        }
    }
}

impl fmt::Debug for VotingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VotingStrategy")
            .field("explorers", &self.explorers.iter().map(|e| e.name()).collect::<Vec<_>>())
            .field("blockers", &self.blockers.iter().map(|b| b.name()).collect::<Vec<_>>())
            .field("stop_loss_percent", &self.stop_loss_percent)
            .field("multipliers", &self.multipliers)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

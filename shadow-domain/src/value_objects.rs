//! Value Objects for the Shadow domain
//!
//! Immutable, validated domain primitives.
//! All value objects enforce invariants at construction time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain errors for value object validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Bar prices are inconsistent (e.g. low above high)
    #[error("Invalid bar: {0}")]
    InvalidBar(String),

    /// Timeframe interval must be positive
    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    /// Order values are inconsistent
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
}

// =============================================================================
// PositionType
// =============================================================================

/// Direction of a position or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionType {
    /// Profit when price rises
    Long,
    /// Profit when price falls
    Short,
}

impl fmt::Display for PositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionType::Long => write!(f, "LONG"),
            PositionType::Short => write!(f, "SHORT"),
        }
    }
}

// =============================================================================
// Timeframe
// =============================================================================

/// Granularity of a timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// 1 ms
    Millisecond,
    /// 1 000 ms
    Second,
    /// 60 000 ms
    Minute,
    /// 3 600 000 ms
    Hour,
    /// 86 400 000 ms
    Day,
}

impl TimeUnit {
    /// Length of one unit in milliseconds.
    pub fn millis(&self) -> u64 {
        match self {
            TimeUnit::Millisecond => 1,
            TimeUnit::Second => 1_000,
            TimeUnit::Minute => 60_000,
            TimeUnit::Hour => 3_600_000,
            TimeUnit::Day => 86_400_000,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeUnit::Millisecond => "ms",
            TimeUnit::Second => "s",
            TimeUnit::Minute => "m",
            TimeUnit::Hour => "h",
            TimeUnit::Day => "d",
        };
        write!(f, "{}", s)
    }
}

/// Robot timeframe: `interval` units of `unit` per bar.
///
/// # Invariants
/// - `interval` > 0, so the period is never zero
/// - the period in milliseconds fits in an `i64`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeframe")]
pub struct Timeframe {
    unit: TimeUnit,
    interval: u64,
}

#[derive(Deserialize)]
struct RawTimeframe {
    unit: TimeUnit,
    interval: u64,
}

impl TryFrom<RawTimeframe> for Timeframe {
    type Error = DomainError;

    fn try_from(raw: RawTimeframe) -> Result<Self, Self::Error> {
        Timeframe::new(raw.unit, raw.interval)
    }
}

impl Timeframe {
    /// One bar per minute.
    pub const ONE_MINUTE: Timeframe = Timeframe {
        unit: TimeUnit::Minute,
        interval: 1,
    };

    /// Create a new Timeframe with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidTimeframe` if interval == 0 or the
    /// period overflows epoch milliseconds
    pub fn new(unit: TimeUnit, interval: u64) -> Result<Self, DomainError> {
        if interval == 0 {
            return Err(DomainError::InvalidTimeframe(
                "Interval must be positive".to_string(),
            ));
        }
        match unit.millis().checked_mul(interval) {
            Some(period) if period <= i64::MAX as u64 => Ok(Self { unit, interval }),
            _ => Err(DomainError::InvalidTimeframe(format!(
                "Period of {} {:?} units overflows milliseconds",
                interval, unit
            ))),
        }
    }

    /// Unit of the timeframe.
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Number of units per bar.
    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Bar period in milliseconds.
    pub fn period_millis(&self) -> u64 {
        self.unit.millis() * self.interval
    }

    /// Bar period as a std duration.
    pub fn period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.period_millis())
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.interval, self.unit)
    }
}

// =============================================================================
// ExplorationState
// =============================================================================

/// Strength of a directional signal reported by an explorer.
///
/// `NotReady` means "no opinion" and never contributes a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorationState {
    /// Not enough data or no signal
    NotReady,
    /// Weak signal
    Minor,
    /// Moderate signal
    Medium,
    /// Strong signal
    Major,
}

impl ExplorationState {
    /// Whether this state casts a vote.
    pub fn is_ready(&self) -> bool {
        !matches!(self, ExplorationState::NotReady)
    }
}

impl fmt::Display for ExplorationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplorationState::NotReady => write!(f, "NOT_READY"),
            ExplorationState::Minor => write!(f, "MINOR"),
            ExplorationState::Medium => write!(f, "MEDIUM"),
            ExplorationState::Major => write!(f, "MAJOR"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_period() {
        let tf = Timeframe::new(TimeUnit::Minute, 5).unwrap();
        assert_eq!(tf.period_millis(), 300_000);
        assert_eq!(tf.period(), std::time::Duration::from_secs(300));
        assert_eq!(tf.to_string(), "5m");
    }

    #[test]
    fn test_timeframe_zero_interval_rejected() {
        assert!(matches!(
            Timeframe::new(TimeUnit::Second, 0),
            Err(DomainError::InvalidTimeframe(_))
        ));
    }

    #[test]
    fn test_timeframe_deserialize_validates() {
        let tf: Timeframe = serde_json::from_str(r#"{"unit":"second","interval":1}"#).unwrap();
        assert_eq!(tf.period_millis(), 1_000);

        let bad = serde_json::from_str::<Timeframe>(r#"{"unit":"hour","interval":0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_timeframe_period_overflow_rejected() {
        assert!(matches!(
            Timeframe::new(TimeUnit::Day, u64::MAX / 1_000),
            Err(DomainError::InvalidTimeframe(_))
        ));
        assert!(Timeframe::new(TimeUnit::Millisecond, i64::MAX as u64).is_ok());
        assert!(Timeframe::new(TimeUnit::Millisecond, i64::MAX as u64 + 1).is_err());

        let json = format!(r#"{{"unit":"day","interval":{}}}"#, u64::MAX);
        assert!(serde_json::from_str::<Timeframe>(&json).is_err());
    }

    #[test]
    fn test_position_type() {
        assert_eq!(PositionType::Long.to_string(), "LONG");
        assert_eq!(PositionType::Short.to_string(), "SHORT");
    }

    #[test]
    fn test_exploration_state_readiness() {
        assert!(!ExplorationState::NotReady.is_ready());
        assert!(ExplorationState::Minor.is_ready());
        assert_eq!(ExplorationState::Major.to_string(), "MAJOR");
    }
}

//! Wall clock port and period-alignment arithmetic.
//!
//! All alignment math is done on integer epoch milliseconds so that
//! boundaries are exact regardless of timezone or calendar.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Mutex;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Clock reading `millis` since the Unix epoch.
    pub fn at_millis(millis: i64) -> Self {
        Self::new(millis_to_datetime(millis))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: std::time::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += chrono::Duration::milliseconds(by.as_millis() as i64);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Epoch milliseconds to a UTC instant (clamped to the epoch if out of range).
pub fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
}

/// Distance from `now_ms` to the next multiple of `period_ms`.
///
/// `((now / period) + 1) * period - now`; a time sitting exactly on a
/// boundary waits a full period. Result is in `(0, period]`.
pub fn initial_delay_millis(now_ms: i64, period_ms: u64) -> u64 {
    let period = period_as_i64(period_ms);
    let next_boundary = now_ms.div_euclid(period).saturating_add(1).saturating_mul(period);
    next_boundary.saturating_sub(now_ms).unsigned_abs()
}

/// Start of the previous whole period, moved back another `shift`
/// periods: `((now / period) - 1) * period - shift * period`.
///
/// Used as the first bar-collection instant so that the robot's initial
/// fetch covers `shift` full bars before the last closed one.
pub fn shift_back_to_previous_period(now_ms: i64, period_ms: u64, shift: u64) -> i64 {
    let period = period_as_i64(period_ms);
    let shift = i64::try_from(shift).unwrap_or(i64::MAX);
    (now_ms.div_euclid(period) - 1)
        .saturating_mul(period)
        .saturating_sub(shift.saturating_mul(period))
}

fn period_as_i64(period_ms: u64) -> i64 {
    i64::try_from(period_ms).unwrap_or(i64::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_delay_one_second() {
        assert_eq!(initial_delay_millis(5_500, 1_000), 500);
    }

    #[test]
    fn test_initial_delay_on_boundary_waits_full_period() {
        assert_eq!(initial_delay_millis(4_000_000_000, 5_000), 5_000);
        assert_eq!(initial_delay_millis(3_600_000_000_000, 3_600_000), 3_600_000);
        assert_eq!(initial_delay_millis(43_200_000_000_000, 43_200_000), 43_200_000);
    }

    #[test]
    fn test_initial_delay_one_minute() {
        assert_eq!(initial_delay_millis(55_000_000_000, 60_000), 20_000);
    }

    #[test]
    fn test_shift_back_to_previous_period() {
        assert_eq!(shift_back_to_previous_period(5_500, 1_000, 2), 2_000);
        assert_eq!(shift_back_to_previous_period(120_001, 60_000, 0), 60_000);
    }

    #[test]
    fn test_huge_periods_saturate() {
        let now = 1_700_000_000_000;
        assert_eq!(initial_delay_millis(now, u64::MAX), (i64::MAX - now) as u64);
        assert_eq!(
            shift_back_to_previous_period(now, 86_400_000, u64::MAX),
            1_699_833_600_000 - i64::MAX
        );
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::at_millis(5_500);
        assert_eq!(clock.now_millis(), 5_500);

        clock.advance(std::time::Duration::from_millis(1_500));
        assert_eq!(clock.now_millis(), 7_000);

        clock.set(millis_to_datetime(0));
        assert_eq!(clock.now_millis(), 0);
    }
}

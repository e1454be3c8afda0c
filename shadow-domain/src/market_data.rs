//! Market Data Types
//!
//! Exchange-agnostic candle data shared by live and replayed sources.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::DomainError;

// =============================================================================
// Bar
// =============================================================================

/// OHLCV bar for one timeframe period.
///
/// # Invariants
/// - `low <= open, close <= high`
/// - `volume >= 0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Period open time
    pub time: DateTime<Utc>,
    /// Open price
    pub open: Decimal,
    /// High price
    pub high: Decimal,
    /// Low price
    pub low: Decimal,
    /// Close price
    pub close: Decimal,
    /// Traded volume
    pub volume: Decimal,
}

impl Bar {
    /// Create a new bar with validation.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidBar` if the prices are inconsistent
    /// or the volume is negative.
    pub fn new(
        time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Result<Self, DomainError> {
        if low > high {
            return Err(DomainError::InvalidBar(format!(
                "low {} above high {} at {}",
                low, high, time
            )));
        }
        if open < low || open > high || close < low || close > high {
            return Err(DomainError::InvalidBar(format!(
                "open/close outside [{}, {}] at {}",
                low, high, time
            )));
        }
        if volume < Decimal::ZERO {
            return Err(DomainError::InvalidBar(format!("negative volume at {}", time)));
        }

        Ok(Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

//! Domain Entities
//!
//! Positions held by a robot and the orders backing them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{DomainError, PositionType};

/// Unique, monotonically increasing order identifier.
pub type OrderId = u64;

// =============================================================================
// Position
// =============================================================================

/// An open directional position of a single-position robot.
///
/// Created when the strategy emits a LONG/SHORT signal and dropped when
/// the robot closes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Direction
    pub position_type: PositionType,
    /// Entry price
    pub entry: Decimal,
    /// Take-profit levels, ordered
    pub take_profits: Vec<Decimal>,
    /// Protective stop loss
    pub stop_loss: Option<Decimal>,
}

impl Position {
    /// Create a position without take-profit levels.
    pub fn new(position_type: PositionType, entry: Decimal, stop_loss: Option<Decimal>) -> Self {
        Self {
            position_type,
            entry,
            take_profits: Vec::new(),
            stop_loss,
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// How an order was filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Filled at the prevailing market price
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
        }
    }
}

/// A filled order. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Venue-assigned identifier
    pub id: OrderId,
    /// Fill price
    pub entry: Decimal,
    /// Fill time
    pub filled_at: DateTime<Utc>,
    /// Fill type
    pub order_type: OrderType,
    /// Cost debited from the deposit
    pub amount: Decimal,
    /// Direction
    pub position_type: PositionType,
    /// Units bought or sold (`amount / entry`)
    pub quantity: Decimal,
}

impl Order {
    /// Create a market order.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidOrder` if entry is not positive or
    /// amount/quantity are negative.
    pub fn market(
        id: OrderId,
        position_type: PositionType,
        entry: Decimal,
        amount: Decimal,
        quantity: Decimal,
        filled_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if entry <= Decimal::ZERO {
            return Err(DomainError::InvalidOrder(format!("entry must be positive, got {}", entry)));
        }
        if amount < Decimal::ZERO || quantity < Decimal::ZERO {
            return Err(DomainError::InvalidOrder(
                "amount and quantity must be non-negative".to_string(),
            ));
        }

        Ok(Self {
            id,
            entry,
            filled_at,
            order_type: OrderType::Market,
            amount,
            position_type,
            quantity,
        })
    }

    /// Profit or loss of this order when exited at `exit`.
    ///
    /// Long: `(exit - entry) * quantity`; Short: `(entry - exit) * quantity`.
    pub fn pnl_at(&self, exit: Decimal) -> Decimal {
        match self.position_type {
            PositionType::Long => (exit - self.entry) * self.quantity,
            PositionType::Short => (self.entry - exit) * self.quantity,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_market_order() {
        let order = Order::market(1, PositionType::Long, dec!(100), dec!(100), dec!(1), Utc::now())
            .unwrap();
        assert_eq!(order.order_type, OrderType::Market);
        assert_eq!(order.pnl_at(dec!(110)), dec!(10));
    }

    #[test]
    fn test_short_pnl() {
        let order =
            Order::market(2, PositionType::Short, dec!(100), dec!(50), dec!(0.5), Utc::now())
                .unwrap();
        assert_eq!(order.pnl_at(dec!(90)), dec!(5));
        assert_eq!(order.pnl_at(dec!(110)), dec!(-5));
    }

    #[test]
    fn test_order_rejects_non_positive_entry() {
        let result = Order::market(3, PositionType::Long, dec!(0), dec!(10), dec!(1), Utc::now());
        assert!(matches!(result, Err(DomainError::InvalidOrder(_))));
    }

    #[test]
    fn test_new_position() {
        let position = Position::new(PositionType::Long, dec!(100), Some(dec!(98)));
        assert_eq!(position.stop_loss, Some(dec!(98)));
        assert!(position.take_profits.is_empty());
    }
}

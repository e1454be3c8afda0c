//! In-memory virtual account ledger.

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use shadow_domain::{Order, OrderId, PositionType};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::error::{SimError, SimResult};

/// Decimal places kept for ratios, costs and quantities.
const SCALE: u32 = 10;
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug)]
struct Ledger {
    balance: Decimal,
    next_id: OrderId,
    open: BTreeMap<OrderId, Order>,
    closed: Vec<Order>,
}

/// Paper-trading account.
///
/// Opening an order debits `balance × pct / 100`; closing credits the cost
/// back plus the order's P&L. A loss larger than the cost credits nothing:
/// the order's margin is the most it can lose. Every operation runs under
/// one lock, so no caller ever observes a half-applied open or close.
///
/// # Invariants
/// - `balance >= 0`
/// - Order ids are unique and increasing per account, starting at 1
/// - An order is either open or closed, never both
#[derive(Debug)]
pub struct VirtualAccount {
    ledger: Mutex<Ledger>,
}

impl VirtualAccount {
    pub fn new(initial_balance: Decimal) -> Self {
        info!(%initial_balance, "virtual account initialized");
        Self {
            ledger: Mutex::new(Ledger {
                balance: initial_balance.max(Decimal::ZERO),
                next_id: 1,
                open: BTreeMap::new(),
                closed: Vec::new(),
            }),
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        // the ledger is never left half-updated, so a poisoned lock is still consistent
        self.ledger.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn balance(&self) -> Decimal {
        self.ledger().balance
    }

    /// Open orders ordered by id.
    pub fn open_orders(&self) -> Vec<Order> {
        self.ledger().open.values().cloned().collect()
    }

    /// Closed orders in closing order.
    pub fn closed_orders(&self) -> Vec<Order> {
        self.ledger().closed.clone()
    }

    /// Open an order committing `percentage_from_deposit` percent of the
    /// current balance.
    ///
    /// # Errors
    /// - `InvalidInput` if entry <= 0 or the percentage is negative
    /// - `InsufficientBalance` if the cost exceeds the balance
    pub fn open_order(
        &self,
        position_type: PositionType,
        entry: Decimal,
        percentage_from_deposit: Decimal,
    ) -> SimResult<Order> {
        if entry <= Decimal::ZERO {
            return Err(SimError::InvalidInput(format!("entry must be positive, got {}", entry)));
        }
        if percentage_from_deposit < Decimal::ZERO {
            return Err(SimError::InvalidInput(format!(
                "percentage from deposit must be non-negative, got {}",
                percentage_from_deposit
            )));
        }

        let mut ledger = self.ledger();

        let cost = round(ledger.balance * round(percentage_from_deposit / HUNDRED));
        if cost > ledger.balance {
            warn!(
                available = %ledger.balance,
                required = %cost,
                "insufficient balance to open order"
            );
            return Err(SimError::InsufficientBalance {
                required: cost,
                available: ledger.balance,
            });
        }

        let quantity = round(cost / entry);
        let order =
            Order::market(ledger.next_id, position_type, entry, cost, quantity, Utc::now())?;

        ledger.next_id += 1;
        ledger.balance -= cost;
        ledger.open.insert(order.id, order.clone());

        info!(
            order_id = order.id,
            %position_type,
            %entry,
            %cost,
            %quantity,
            balance = %ledger.balance,
            "order opened"
        );
        Ok(order)
    }

    /// Close an open order at `exit_price`, returning its P&L.
    ///
    /// # Errors
    /// `OrderNotFound` if the order is not open on this account.
    pub fn close_order(&self, order: &Order, exit_price: Decimal) -> SimResult<Decimal> {
        let mut ledger = self.ledger();

        let Some(open) = ledger.open.remove(&order.id) else {
            warn!(order_id = order.id, "attempted to close an order that is not open");
            return Err(SimError::OrderNotFound(order.id));
        };

        let pnl = open.pnl_at(exit_price);
        let settlement = open.amount + pnl;
        if settlement < Decimal::ZERO {
            warn!(
                order_id = open.id,
                %pnl,
                shortfall = %(-settlement),
                "loss exceeds order margin, crediting nothing"
            );
        }
        ledger.balance += settlement.max(Decimal::ZERO);
        debug!(order_id = open.id, "order moved to closed orders");
        ledger.closed.push(open);

        info!(order_id = order.id, %exit_price, %pnl, balance = %ledger.balance, "order closed");
        Ok(pnl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_open_and_close_long_with_profit() {
        let account = VirtualAccount::new(dec!(1000));

        let order = account.open_order(PositionType::Long, dec!(100), dec!(10)).unwrap();
        assert_eq!(order.amount, dec!(100));
        assert_eq!(order.quantity, dec!(1));
        assert_eq!(account.balance(), dec!(900));
        assert_eq!(account.open_orders().len(), 1);

        let pnl = account.close_order(&order, dec!(110)).unwrap();
        assert_eq!(pnl, dec!(10));
        assert_eq!(account.balance(), dec!(1010));
        assert!(account.open_orders().is_empty());
        assert_eq!(account.closed_orders(), vec![order]);
    }

    #[test]
    fn test_short_profits_when_price_falls() {
        let account = VirtualAccount::new(dec!(1000));
        let order = account.open_order(PositionType::Short, dec!(200), dec!(50)).unwrap();
        assert_eq!(order.quantity, dec!(2.5));

        let pnl = account.close_order(&order, dec!(180)).unwrap();
        assert_eq!(pnl, dec!(50));
        assert_eq!(account.balance(), dec!(1050));
    }

    #[test]
    fn test_close_at_entry_restores_balance() {
        let account = VirtualAccount::new(dec!(1234.56));
        let order = account.open_order(PositionType::Long, dec!(37.5), dec!(33)).unwrap();
        let pnl = account.close_order(&order, dec!(37.5)).unwrap();
        assert_eq!(pnl, Decimal::ZERO);
        assert_eq!(account.balance(), dec!(1234.56));
    }

    #[test]
    fn test_insufficient_balance() {
        let account = VirtualAccount::new(dec!(100));
        let result = account.open_order(PositionType::Long, dec!(10), dec!(150));
        assert!(matches!(result, Err(SimError::InsufficientBalance { .. })));
        assert_eq!(account.balance(), dec!(100));
        assert!(account.open_orders().is_empty());
    }

    #[test]
    fn test_losing_short_beyond_margin_floors_balance_at_zero() {
        let account = VirtualAccount::new(dec!(1000));
        let order = account.open_order(PositionType::Short, dec!(100), dec!(100)).unwrap();
        assert_eq!(account.balance(), Decimal::ZERO);

        // pnl = (100 - 250) * 10 = -1500, margin 1000
        let pnl = account.close_order(&order, dec!(250)).unwrap();
        assert_eq!(pnl, dec!(-1500));
        assert_eq!(account.balance(), Decimal::ZERO);
        assert_eq!(account.closed_orders().len(), 1);
    }

    #[test]
    fn test_losing_long_within_margin_credits_remainder() {
        let account = VirtualAccount::new(dec!(1000));
        let order = account.open_order(PositionType::Long, dec!(100), dec!(50)).unwrap();

        let pnl = account.close_order(&order, dec!(60)).unwrap();
        assert_eq!(pnl, dec!(-200));
        assert_eq!(account.balance(), dec!(800));
    }

    #[test]
    fn test_close_unknown_or_already_closed_order() {
        let account = VirtualAccount::new(dec!(1000));
        let order = account.open_order(PositionType::Long, dec!(100), dec!(10)).unwrap();
        account.close_order(&order, dec!(100)).unwrap();

        let result = account.close_order(&order, dec!(100));
        assert!(matches!(result, Err(SimError::OrderNotFound(1))));
        assert_eq!(account.closed_orders().len(), 1);
    }

    #[test]
    fn test_ids_are_monotonic() {
        let account = VirtualAccount::new(dec!(1000));
        let ids: Vec<_> = (0..3)
            .map(|_| account.open_order(PositionType::Long, dec!(10), dec!(1)).unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_invalid_input_rejected() {
        let account = VirtualAccount::new(dec!(1000));
        assert!(matches!(
            account.open_order(PositionType::Long, dec!(0), dec!(10)),
            Err(SimError::InvalidInput(_))
        ));
        assert!(matches!(
            account.open_order(PositionType::Long, dec!(10), dec!(-1)),
            Err(SimError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_concurrent_opens_never_overdraw() {
        use std::sync::Arc;

        let account = Arc::new(VirtualAccount::new(dec!(1000)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let account = Arc::clone(&account);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        let _ = account.open_order(PositionType::Long, dec!(10), dec!(5));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let committed: Decimal = account.open_orders().iter().map(|o| o.amount).sum();
        assert_eq!(account.open_orders().len(), 80);
        assert!(account.balance() >= Decimal::ZERO);
        assert_eq!(account.balance() + committed, dec!(1000));
    }
}

//! Execution layer port definitions.
//!
//! Ports define the interfaces for external services (bar feeds, order
//! venues). Adapters implement these ports for specific venues (simulated
//! account, stubs, a real exchange).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shadow_domain::{Bar, Order, Timeframe};

use crate::error::ExecError;

// =============================================================================
// Bar Source
// =============================================================================

/// Port for pulling historical/closed bars.
///
/// Implementations:
/// - `ReplayBarSource` (shadow-sim) - replays a historical data file
/// - `StubBarSource` - scripted batches for tests
#[async_trait]
pub trait BarSource: Send + Sync {
    /// Prepare the source (connect, load files).
    async fn init(&self) -> Result<(), ExecError>;

    /// Collect bars for `symbol` at `timeframe` granularity.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Trading pair
    /// * `timeframe` - Bar unit and interval
    /// * `from` - Inclusive lower bound on bar time
    /// * `to` - Upper bound on bar time
    ///
    /// # Returns
    ///
    /// Bars ordered by time. May be empty.
    async fn collect_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Bar>, ExecError>;
}

// =============================================================================
// Order Gateway
// =============================================================================

/// Parameters for opening a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenOrderRequest {
    /// Trading pair
    pub symbol: String,
    /// Entry price; `None` means fill at the current market price
    pub entry: Option<Decimal>,
    /// Take-profit levels, ordered
    pub take_profits: Vec<Decimal>,
    /// Protective stop loss
    pub stop_loss: Decimal,
    /// Share of the deposit to commit, in percent (10 = 10%)
    pub percentage_from_deposit: Decimal,
    /// Futures leverage multiplier
    pub futures_multiplier: u32,
}

/// Port for placing and closing orders.
///
/// Implementations:
/// - `SimulatedGateway` (shadow-sim) - virtual account ledger
/// - `StubGateway` - records calls, configurable failures
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Prepare the gateway.
    async fn init(&self) -> Result<(), ExecError>;

    /// Open a long position.
    ///
    /// # Returns
    ///
    /// The filled `Order`.
    async fn open_long(&self, request: OpenOrderRequest) -> Result<Order, ExecError>;

    /// Open a short position.
    async fn open_short(&self, request: OpenOrderRequest) -> Result<Order, ExecError>;

    /// Close a previously opened order at the current market price.
    async fn close_order(&self, order: &Order) -> Result<(), ExecError>;
}

//! Stub implementations for testing.
//!
//! These implementations script bar batches and fill orders at a
//! configured price without touching any venue.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::Mutex;

use shadow_domain::{Bar, Order, OrderId, PositionType, Timeframe};

use crate::error::ExecError;
use crate::ports::{BarSource, OpenOrderRequest, OrderGateway};

// =============================================================================
// Stub Bar Source
// =============================================================================

/// Stub bar source returning pre-scripted batches, one per call.
///
/// Once the script is exhausted every call returns an empty batch.
#[derive(Default)]
pub struct StubBarSource {
    batches: Mutex<VecDeque<Vec<Bar>>>,
    /// `(from, to)` of every collect call, in order
    requests: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
    fail_next: Mutex<bool>,
}

impl StubBarSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a batch for a future `collect_bars` call.
    pub fn push_batch(&self, bars: Vec<Bar>) {
        self.batches.lock().unwrap().push_back(bars);
    }

    /// Configure the next call to fail.
    pub fn set_fail_next(&self, fail: bool) {
        *self.fail_next.lock().unwrap() = fail;
    }

    /// Time ranges requested so far.
    pub fn requests(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.requests.lock().unwrap().clone()
    }

    fn should_fail(&self) -> bool {
        std::mem::take(&mut *self.fail_next.lock().unwrap())
    }
}

#[async_trait]
impl BarSource for StubBarSource {
    async fn init(&self) -> Result<(), ExecError> {
        Ok(())
    }

    async fn collect_bars(
        &self,
        _symbol: &str,
        _timeframe: Timeframe,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Bar>, ExecError> {
        self.requests.lock().unwrap().push((from, to));

        if self.should_fail() {
            return Err(ExecError::BarSource("Simulated bar source failure".to_string()));
        }

        Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
    }
}

// =============================================================================
// Stub Gateway
// =============================================================================

/// Stub gateway filling every order immediately at a configured price.
pub struct StubGateway {
    price: Mutex<Decimal>,
    order_counter: Mutex<OrderId>,
    opened: Mutex<Vec<Order>>,
    closed: Mutex<Vec<OrderId>>,
    fail_next: Mutex<bool>,
}

impl StubGateway {
    pub fn new(price: Decimal) -> Self {
        Self {
            price: Mutex::new(price),
            order_counter: Mutex::new(0),
            opened: Mutex::new(Vec::new()),
            closed: Mutex::new(Vec::new()),
            fail_next: Mutex::new(false),
        }
    }

    pub fn set_price(&self, price: Decimal) {
        *self.price.lock().unwrap() = price;
    }

    /// Configure the next order call to fail.
    pub fn set_fail_next(&self, fail: bool) {
        *self.fail_next.lock().unwrap() = fail;
    }

    /// Orders opened so far.
    pub fn opened(&self) -> Vec<Order> {
        self.opened.lock().unwrap().clone()
    }

    /// Ids of orders closed so far.
    pub fn closed(&self) -> Vec<OrderId> {
        self.closed.lock().unwrap().clone()
    }

    fn should_fail(&self) -> bool {
        std::mem::take(&mut *self.fail_next.lock().unwrap())
    }

    fn fill(
        &self,
        position_type: PositionType,
        request: OpenOrderRequest,
    ) -> Result<Order, ExecError> {
        if self.should_fail() {
            return Err(ExecError::Gateway("Simulated gateway failure".to_string()));
        }

        let entry = request.entry.unwrap_or(*self.price.lock().unwrap());
        let id = {
            let mut counter = self.order_counter.lock().unwrap();
            *counter += 1;
            *counter
        };

        let order =
            Order::market(id, position_type, entry, Decimal::ZERO, Decimal::ZERO, Utc::now())?;
        self.opened.lock().unwrap().push(order.clone());
        tracing::debug!(order_id = id, %position_type, %entry, "Stub: order filled");
        Ok(order)
    }
}

#[async_trait]
impl OrderGateway for StubGateway {
    async fn init(&self) -> Result<(), ExecError> {
        Ok(())
    }

    async fn open_long(&self, request: OpenOrderRequest) -> Result<Order, ExecError> {
        self.fill(PositionType::Long, request)
    }

    async fn open_short(&self, request: OpenOrderRequest) -> Result<Order, ExecError> {
        self.fill(PositionType::Short, request)
    }

    async fn close_order(&self, order: &Order) -> Result<(), ExecError> {
        if self.should_fail() {
            return Err(ExecError::Gateway("Simulated close failure".to_string()));
        }
        self.closed.lock().unwrap().push(order.id);
        tracing::debug!(order_id = order.id, "Stub: order closed");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Order gateway backed by the virtual account.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

use shadow_domain::{Order, PositionType};
use shadow_exec::{ExecError, OpenOrderRequest, OrderGateway};

use crate::account::VirtualAccount;

/// Source of the latest traded price.
pub trait PriceFeed: Send + Sync {
    /// `None` until the feed has seen at least one bar.
    fn current_price(&self) -> Option<Decimal>;
}

/// Gateway that fills orders on a [`VirtualAccount`].
///
/// Market orders (`entry = None`) fill at the feed's current price, and
/// closes always exit at the current price.
pub struct SimulatedGateway {
    account: Arc<VirtualAccount>,
    feed: Arc<dyn PriceFeed>,
}

impl SimulatedGateway {
    pub fn new(account: Arc<VirtualAccount>, feed: Arc<dyn PriceFeed>) -> Self {
        Self { account, feed }
    }

    fn current_price(&self) -> Result<Decimal, ExecError> {
        self.feed
            .current_price()
            .ok_or_else(|| ExecError::NotInitialized("no market price available yet".to_string()))
    }

    fn open(
        &self,
        position_type: PositionType,
        request: OpenOrderRequest,
    ) -> Result<Order, ExecError> {
        let entry = match request.entry {
            Some(entry) => entry,
            None => self.current_price()?,
        };

        debug!(
            symbol = %request.symbol,
            %position_type,
            %entry,
            stop_loss = %request.stop_loss,
            leverage = request.futures_multiplier,
            "Simulated: opening order"
        );

        let order = self
            .account
            .open_order(position_type, entry, request.percentage_from_deposit)?;
        Ok(order)
    }
}

#[async_trait]
impl OrderGateway for SimulatedGateway {
    async fn init(&self) -> Result<(), ExecError> {
        info!(balance = %self.account.balance(), "Simulated gateway ready");
        Ok(())
    }

    async fn open_long(&self, request: OpenOrderRequest) -> Result<Order, ExecError> {
        self.open(PositionType::Long, request)
    }

    async fn open_short(&self, request: OpenOrderRequest) -> Result<Order, ExecError> {
        self.open(PositionType::Short, request)
    }

    async fn close_order(&self, order: &Order) -> Result<(), ExecError> {
        let exit = self.current_price()?;
        self.account.close_order(order, exit)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct ManualFeed(Mutex<Option<Decimal>>);

    impl ManualFeed {
        fn new(price: Option<Decimal>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(price)))
        }

        fn set(&self, price: Decimal) {
            *self.0.lock().unwrap() = Some(price);
        }
    }

    impl PriceFeed for ManualFeed {
        fn current_price(&self) -> Option<Decimal> {
            *self.0.lock().unwrap()
        }
    }

    fn request(entry: Option<Decimal>) -> OpenOrderRequest {
        OpenOrderRequest {
            symbol: "BTCUSDT".to_string(),
            entry,
            take_profits: vec![],
            stop_loss: dec!(95),
            percentage_from_deposit: dec!(10),
            futures_multiplier: 1,
        }
    }

    #[tokio::test]
    async fn test_market_order_fills_at_feed_price_and_closes_at_exit() {
        let account = Arc::new(VirtualAccount::new(dec!(1000)));
        let feed = ManualFeed::new(Some(dec!(100)));
        let gateway = SimulatedGateway::new(Arc::clone(&account), feed.clone());

        let order = gateway.open_long(request(None)).await.unwrap();
        assert_eq!(order.entry, dec!(100));
        assert_eq!(account.balance(), dec!(900));

        feed.set(dec!(120));
        gateway.close_order(&order).await.unwrap();
        assert_eq!(account.balance(), dec!(1020));
    }

    #[tokio::test]
    async fn test_explicit_entry_overrides_feed() {
        let account = Arc::new(VirtualAccount::new(dec!(1000)));
        let gateway = SimulatedGateway::new(Arc::clone(&account), ManualFeed::new(Some(dec!(100))));

        let order = gateway.open_short(request(Some(dec!(50)))).await.unwrap();
        assert_eq!(order.entry, dec!(50));
        assert_eq!(order.quantity, dec!(2));
    }

    #[tokio::test]
    async fn test_no_price_is_an_error() {
        let account = Arc::new(VirtualAccount::new(dec!(1000)));
        let gateway = SimulatedGateway::new(account, ManualFeed::new(None));

        let result = gateway.open_long(request(None)).await;
        assert!(matches!(result, Err(ExecError::NotInitialized(_))));
    }

    #[tokio::test]
    async fn test_rejections_map_to_exec_errors() {
        let account = Arc::new(VirtualAccount::new(dec!(1000)));
        let gateway = SimulatedGateway::new(Arc::clone(&account), ManualFeed::new(Some(dec!(100))));

        let mut oversized = request(None);
        oversized.percentage_from_deposit = dec!(200);
        assert!(matches!(
            gateway.open_long(oversized).await,
            Err(ExecError::OrderRejected(_))
        ));

        let order = gateway.open_long(request(None)).await.unwrap();
        gateway.close_order(&order).await.unwrap();
        assert!(matches!(
            gateway.close_order(&order).await,
            Err(ExecError::OrderNotFound(1))
        ));
    }
}

use crate::error::ExecutorError;
use core_types::{Order, Trade};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Append-only record of executed trades.
#[derive(Debug, Default)]
pub struct TradeLedger {
    trades: Mutex<Vec<Trade>>,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the trade for an order that has just been marked executed.
    pub async fn record(&self, order: &Order) -> Result<Trade, ExecutorError> {
        let trade = Trade::from_executed(order)?;
        self.trades.lock().await.push(trade.clone());
        tracing::info!(
            trade_id = %trade.id,
            order_id = %trade.order_id,
            user_id = %trade.user_id,
            symbol = %trade.symbol,
            side = %trade.side,
            quantity = trade.quantity,
            price = %trade.price,
            "Trade recorded."
        );
        Ok(trade)
    }

    /// Every trade of `user_id`, oldest first.
    pub async fn list_by_user(&self, user_id: &str) -> Vec<Trade> {
        self.trades
            .lock()
            .await
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn get(&self, trade_id: Uuid) -> Result<Trade, ExecutorError> {
        self.trades
            .lock()
            .await
            .iter()
            .find(|t| t.id == trade_id)
            .cloned()
            .ok_or(ExecutorError::TradeNotFound(trade_id))
    }

    /// Trades recorded for a given order; at most one for any order.
    pub async fn find_by_order(&self, order_id: Uuid) -> Option<Trade> {
        self.trades
            .lock()
            .await
            .iter()
            .find(|t| t.order_id == order_id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_types::{OrderRequest, OrderSide};
    use rust_decimal_macros::dec;

    fn executed(user: &str, symbol: &str) -> Order {
        let request = OrderRequest::market(symbol, "NSE", OrderSide::Buy, 3);
        let mut order = Order::new(request.validate().unwrap(), user);
        order.place().unwrap();
        order.execute(dec!(42.5), Utc::now()).unwrap();
        order
    }

    #[tokio::test]
    async fn records_trade_mirroring_the_order() {
        let ledger = TradeLedger::new();
        let order = executed("alice", "TCS");
        let trade = ledger.record(&order).await.unwrap();

        assert_eq!(trade.order_id, order.id);
        assert_eq!(trade.quantity, 3);
        assert_eq!(trade.price, dec!(42.5));
        assert_eq!(Some(trade.executed_at), order.executed_at);
        assert_eq!(ledger.get(trade.id).await.unwrap(), trade);
        assert_eq!(ledger.find_by_order(order.id).await, Some(trade));
    }

    #[tokio::test]
    async fn list_by_user_preserves_insertion_order() {
        let ledger = TradeLedger::new();
        let first = ledger.record(&executed("alice", "TCS")).await.unwrap();
        ledger.record(&executed("bob", "TCS")).await.unwrap();
        let second = ledger.record(&executed("alice", "INFY")).await.unwrap();

        let ids: Vec<_> = ledger
            .list_by_user("alice")
            .await
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn refuses_unexecuted_orders_and_unknown_ids() {
        let ledger = TradeLedger::new();
        let request = OrderRequest::market("TCS", "NSE", OrderSide::Buy, 1);
        let pending = Order::new(request.validate().unwrap(), "alice");

        assert!(matches!(
            ledger.record(&pending).await,
            Err(ExecutorError::Core(_))
        ));
        let missing = Uuid::new_v4();
        assert_eq!(
            ledger.get(missing).await,
            Err(ExecutorError::TradeNotFound(missing))
        );
    }
}

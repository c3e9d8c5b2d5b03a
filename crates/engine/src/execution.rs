use crate::error::EngineError;
use crate::store::OrderStore;
use chrono::Utc;
use core_types::{OrderStatus, Trade};
use executor::{PortfolioLedger, SimulatedExchange, TradeLedger};
use instruments::InstrumentDirectory;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// What a single execution attempt did. Scheduled attempts discard this; it
/// exists for logging and for driving the engine directly.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// The order filled and this trade was recorded.
    Executed(Trade),
    /// A LIMIT order did not meet its band and stays `Placed`.
    Parked { market_price: Decimal },
    /// The order had already left `New` (normally: it was cancelled first).
    Skipped(OrderStatus),
    /// The fill could not be applied; the order stays `Placed` with no trade.
    Rejected(EngineError),
    /// The instrument vanished from the directory before pricing.
    InstrumentUnavailable,
    UnknownOrder,
}

/// Prices orders against the instrument directory and applies fills.
pub struct ExecutionEngine {
    orders: Arc<OrderStore>,
    instruments: Arc<dyn InstrumentDirectory>,
    exchange: SimulatedExchange,
    portfolio: Arc<PortfolioLedger>,
    trades: Arc<TradeLedger>,
}

impl ExecutionEngine {
    pub(crate) fn new(
        orders: Arc<OrderStore>,
        instruments: Arc<dyn InstrumentDirectory>,
        exchange: SimulatedExchange,
        portfolio: Arc<PortfolioLedger>,
        trades: Arc<TradeLedger>,
    ) -> Self {
        Self {
            orders,
            instruments,
            exchange,
            portfolio,
            trades,
        }
    }

    /// Runs one execution attempt for `order_id`.
    ///
    /// The order's lock is held from the status check to the final commit, so a
    /// concurrent cancel either lands before (and this attempt is skipped) or
    /// after (and sees a terminal order). The portfolio lock is only ever taken
    /// while already holding the order lock.
    pub async fn execute(&self, order_id: Uuid) -> ExecutionOutcome {
        let Some(handle) = self.orders.get(order_id).await else {
            tracing::warn!(%order_id, "Execution scheduled for an unknown order.");
            return ExecutionOutcome::UnknownOrder;
        };
        let mut order = handle.lock().await;

        if order.status != OrderStatus::New {
            tracing::debug!(%order_id, status = %order.status, "Order no longer new, skipping execution.");
            return ExecutionOutcome::Skipped(order.status);
        }
        if let Err(e) = order.place() {
            return ExecutionOutcome::Rejected(e.into());
        }

        let Some(instrument) = self.instruments.lookup(&order.symbol, &order.exchange).await else {
            tracing::warn!(
                %order_id,
                symbol = %order.symbol,
                exchange = %order.exchange,
                "Instrument disappeared before execution; order left placed."
            );
            return ExecutionOutcome::InstrumentUnavailable;
        };
        let market_price = instrument.last_traded_price;

        let Some(fill_price) = self.exchange.quote_fill(&order, market_price) else {
            tracing::debug!(
                %order_id,
                limit = ?order.limit_price,
                market = %market_price,
                "Limit not reached; order parked."
            );
            return ExecutionOutcome::Parked { market_price };
        };

        // Stage the executed order on a copy. Nothing is committed until the
        // portfolio has accepted the fill.
        let mut filled = order.clone();
        if let Err(e) = filled.execute(fill_price, Utc::now()) {
            return ExecutionOutcome::Rejected(e.into());
        }

        if let Err(e) = self.portfolio.apply_fill(&filled, fill_price).await {
            tracing::warn!(
                %order_id,
                user_id = %order.user_id,
                error = %e,
                "Fill rejected by portfolio; order left placed without a trade."
            );
            return ExecutionOutcome::Rejected(e.into());
        }

        *order = filled;
        match self.trades.record(&order).await {
            Ok(trade) => {
                tracing::info!(
                    %order_id,
                    user_id = %order.user_id,
                    symbol = %order.symbol,
                    side = %order.side,
                    quantity = order.quantity,
                    price = %fill_price,
                    "Order executed."
                );
                ExecutionOutcome::Executed(trade)
            }
            Err(e) => {
                // Unreachable for an order that was just marked executed.
                tracing::error!(%order_id, error = %e, "Trade ledger refused an executed order.");
                ExecutionOutcome::Rejected(e.into())
            }
        }
    }
}

use crate::error::ExecutorError;
use chrono::Utc;
use core_types::{Order, OrderSide, Position, PositionSnapshot};
use instruments::InstrumentDirectory;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PositionKey {
    user_id: String,
    symbol: String,
    exchange: String,
}

impl PositionKey {
    fn of(order: &Order) -> Self {
        Self {
            user_id: order.user_id.clone(),
            symbol: order.symbol.clone(),
            exchange: order.exchange.clone(),
        }
    }
}

/// Computes the position that results from filling `order` at `price` on top of `existing`.
///
/// `Ok(None)` means the position is fully closed and must be removed. Nothing is
/// mutated here, so a failed plan leaves the ledger exactly as it was.
fn plan_fill(
    existing: Option<&Position>,
    order: &Order,
    price: Decimal,
) -> Result<Option<Position>, ExecutorError> {
    let now = Utc::now();
    match order.side {
        OrderSide::Buy => {
            let Some(position) = existing else {
                return Ok(Some(Position {
                    user_id: order.user_id.clone(),
                    symbol: order.symbol.clone(),
                    exchange: order.exchange.clone(),
                    quantity: order.quantity,
                    average_cost: price,
                    last_updated: now,
                }));
            };

            let quantity = position.quantity.checked_add(order.quantity).ok_or_else(|| {
                ExecutorError::Calculation(format!(
                    "quantity overflow adding {} to {}",
                    order.quantity, position.quantity
                ))
            })?;

            // Weighted-average cost across the old and new lots.
            let existing_value = Decimal::from(position.quantity)
                .checked_mul(position.average_cost)
                .ok_or_else(|| ExecutorError::Calculation("existing cost overflow".to_string()))?;
            let new_value = Decimal::from(order.quantity)
                .checked_mul(price)
                .ok_or_else(|| ExecutorError::Calculation("fill cost overflow".to_string()))?;
            let average_cost = existing_value
                .checked_add(new_value)
                .and_then(|total| total.checked_div(Decimal::from(quantity)))
                .ok_or_else(|| ExecutorError::Calculation("average cost overflow".to_string()))?;

            Ok(Some(Position {
                quantity,
                average_cost,
                last_updated: now,
                ..position.clone()
            }))
        }
        OrderSide::Sell => {
            let available = existing.map(|p| p.quantity).unwrap_or(0);
            if available < order.quantity {
                return Err(ExecutorError::InsufficientHoldings {
                    requested: order.quantity,
                    available,
                });
            }
            // `available >= order.quantity > 0` so a position exists here.
            let Some(position) = existing else {
                return Ok(None);
            };

            let quantity = available - order.quantity;
            if quantity == 0 {
                return Ok(None);
            }
            // Selling does not change the cost basis of what remains.
            Ok(Some(Position {
                quantity,
                last_updated: now,
                ..position.clone()
            }))
        }
    }
}

/// Per-user holdings keyed by (user, symbol, exchange).
///
/// Mutated only through [`PortfolioLedger::apply_fill`]. A single lock serialises
/// every read-modify-write, so two fills for the same key can never interleave.
pub struct PortfolioLedger {
    holdings: Mutex<HashMap<PositionKey, Position>>,
    instruments: Arc<dyn InstrumentDirectory>,
}

impl PortfolioLedger {
    pub fn new(instruments: Arc<dyn InstrumentDirectory>) -> Self {
        Self {
            holdings: Mutex::new(HashMap::new()),
            instruments,
        }
    }

    /// Applies a fill to the owner's position.
    ///
    /// The new position is planned first and only then committed, under the same
    /// lock, so on error the ledger is untouched. Returns the resulting position,
    /// or `None` when the fill closed it.
    pub async fn apply_fill(
        &self,
        order: &Order,
        price: Decimal,
    ) -> Result<Option<Position>, ExecutorError> {
        let key = PositionKey::of(order);
        let mut holdings = self.holdings.lock().await;

        let planned = plan_fill(holdings.get(&key), order, price)?;
        match &planned {
            Some(position) => {
                holdings.insert(key, position.clone());
            }
            None => {
                holdings.remove(&key);
            }
        }

        tracing::debug!(
            order_id = %order.id,
            user_id = %order.user_id,
            symbol = %order.symbol,
            quantity = planned.as_ref().map(|p| p.quantity).unwrap_or(0),
            "Portfolio updated."
        );
        Ok(planned)
    }

    /// Raw position lookup. `None` when the user holds nothing of the instrument.
    pub async fn position(&self, user_id: &str, symbol: &str, exchange: &str) -> Option<Position> {
        let key = PositionKey {
            user_id: user_id.to_string(),
            symbol: symbol.to_string(),
            exchange: exchange.to_string(),
        };
        self.holdings.lock().await.get(&key).cloned()
    }

    /// Snapshots of every position the user holds, valued at the latest prices.
    ///
    /// Sorted by symbol then exchange. Positions whose instrument can no longer
    /// be priced, or whose value does not fit in a `Decimal`, are left out.
    pub async fn list_by_user(&self, user_id: &str) -> Vec<PositionSnapshot> {
        let mut positions: Vec<Position> = {
            let holdings = self.holdings.lock().await;
            holdings
                .values()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect()
        };
        positions.sort_by(|a, b| (&a.symbol, &a.exchange).cmp(&(&b.symbol, &b.exchange)));

        let mut snapshots = Vec::with_capacity(positions.len());
        for position in positions {
            let Some(instrument) = self.instruments.lookup(&position.symbol, &position.exchange).await
            else {
                tracing::warn!(
                    user_id,
                    symbol = %position.symbol,
                    exchange = %position.exchange,
                    "Skipping position with no instrument price."
                );
                continue;
            };
            let Some(current_value) =
                Decimal::from(position.quantity).checked_mul(instrument.last_traded_price)
            else {
                tracing::warn!(
                    user_id,
                    symbol = %position.symbol,
                    quantity = position.quantity,
                    price = %instrument.last_traded_price,
                    "Skipping position whose value overflows."
                );
                continue;
            };
            snapshots.push(PositionSnapshot {
                current_value,
                symbol: position.symbol,
                exchange: position.exchange,
                quantity: position.quantity,
                average_cost: position.average_cost,
            });
        }
        snapshots
    }
}

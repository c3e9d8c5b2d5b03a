use crate::enums::{OrderSide, OrderStatus, OrderType};
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tradable symbol on an exchange together with its last traded price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub symbol: String,
    pub exchange: String,
    pub instrument_type: String,
    pub last_traded_price: Decimal,
}

/// An order submission exactly as a caller sent it.
///
/// Every field is optional and the side/type are raw strings so that each
/// validation rule can be reported against the field that broke it. On the
/// wire the side is `orderType` (BUY/SELL) and the pricing style is
/// `orderStyle` (MARKET/LIMIT).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub symbol: Option<String>,
    pub exchange: Option<String>,
    #[serde(rename = "orderType")]
    pub side: Option<String>,
    #[serde(rename = "orderStyle")]
    pub order_type: Option<String>,
    pub quantity: Option<i64>,
    /// Limit price. Ignored for MARKET orders.
    pub price: Option<Decimal>,
}

/// The checked form of an [`OrderRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    pub symbol: String,
    pub exchange: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: u64,
    pub limit_price: Option<Decimal>,
}

fn required_text(value: &Option<String>, field: &str) -> Result<String, CoreError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(CoreError::InvalidInput(
            field.to_string(),
            "is required".to_string(),
        )),
    }
}

impl OrderRequest {
    pub fn market(symbol: &str, exchange: &str, side: OrderSide, quantity: i64) -> Self {
        Self {
            symbol: Some(symbol.to_string()),
            exchange: Some(exchange.to_string()),
            side: Some(side.to_string()),
            order_type: Some(OrderType::Market.to_string()),
            quantity: Some(quantity),
            price: None,
        }
    }

    pub fn limit(symbol: &str, exchange: &str, side: OrderSide, quantity: i64, price: Decimal) -> Self {
        Self {
            order_type: Some(OrderType::Limit.to_string()),
            price: Some(price),
            ..Self::market(symbol, exchange, side, quantity)
        }
    }

    /// Checks the submission field by field, stopping at the first violation.
    pub fn validate(&self) -> Result<ValidatedOrder, CoreError> {
        let symbol = required_text(&self.symbol, "symbol")?;
        let exchange = required_text(&self.exchange, "exchange")?;
        let side: OrderSide = required_text(&self.side, "orderType")?.parse()?;
        let order_type: OrderType = required_text(&self.order_type, "orderStyle")?.parse()?;

        let quantity = match self.quantity {
            Some(q) if q > 0 => q as u64,
            _ => {
                return Err(CoreError::InvalidInput(
                    "quantity".to_string(),
                    "must be a positive integer".to_string(),
                ));
            }
        };

        let limit_price = match order_type {
            OrderType::Market => None,
            OrderType::Limit => match self.price {
                Some(p) if p > Decimal::ZERO => Some(p),
                _ => {
                    return Err(CoreError::InvalidInput(
                        "price".to_string(),
                        "a positive price is required for LIMIT orders".to_string(),
                    ));
                }
            },
        };

        Ok(ValidatedOrder {
            symbol,
            exchange,
            side,
            order_type,
            quantity,
            limit_price,
        })
    }
}

/// A user's request to buy or sell, and everything that has happened to it since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "orderId")]
    pub id: Uuid,
    pub symbol: String,
    pub exchange: String,
    #[serde(rename = "orderType")]
    pub side: OrderSide,
    #[serde(rename = "orderStyle")]
    pub order_type: OrderType,
    pub quantity: u64,
    #[serde(rename = "price")]
    pub limit_price: Option<Decimal>,
    pub user_id: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    pub executed_price: Option<Decimal>,
}

impl Order {
    /// Creates a fresh order in `New` status.
    pub fn new(validated: ValidatedOrder, user_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: validated.symbol,
            exchange: validated.exchange,
            side: validated.side,
            order_type: validated.order_type,
            quantity: validated.quantity,
            limit_price: validated.limit_price,
            user_id: user_id.to_string(),
            status: OrderStatus::New,
            created_at: Utc::now(),
            executed_at: None,
            executed_price: None,
        }
    }

    fn transition(&mut self, next: OrderStatus) -> Result<(), CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Acknowledges the order ahead of pricing.
    pub fn place(&mut self) -> Result<(), CoreError> {
        self.transition(OrderStatus::Placed)
    }

    /// Marks the order as filled at `price`.
    pub fn execute(&mut self, price: Decimal, at: DateTime<Utc>) -> Result<(), CoreError> {
        self.transition(OrderStatus::Executed)?;
        self.executed_at = Some(at);
        self.executed_price = Some(price);
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), CoreError> {
        self.transition(OrderStatus::Cancelled)
    }
}

/// An immutable record of a filled order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    #[serde(rename = "tradeId")]
    pub id: Uuid,
    pub order_id: Uuid,
    pub symbol: String,
    pub exchange: String,
    #[serde(rename = "orderType")]
    pub side: OrderSide,
    pub quantity: u64,
    #[serde(rename = "executedPrice")]
    pub price: Decimal,
    pub user_id: String,
    pub executed_at: DateTime<Utc>,
}

impl Trade {
    /// Derives the trade from an order that has already been marked executed.
    pub fn from_executed(order: &Order) -> Result<Self, CoreError> {
        match (order.status, order.executed_price, order.executed_at) {
            (OrderStatus::Executed, Some(price), Some(executed_at)) => Ok(Self {
                id: Uuid::new_v4(),
                order_id: order.id,
                symbol: order.symbol.clone(),
                exchange: order.exchange.clone(),
                side: order.side,
                quantity: order.quantity,
                price,
                user_id: order.user_id.clone(),
                executed_at,
            }),
            _ => Err(CoreError::InvalidInput(
                "order".to_string(),
                format!("order {} has not been executed", order.id),
            )),
        }
    }
}

/// A user's holding of one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub user_id: String,
    pub symbol: String,
    pub exchange: String,
    pub quantity: u64,
    /// Weighted-average cost per unit, kept at full precision.
    pub average_cost: Decimal,
    pub last_updated: DateTime<Utc>,
}

/// Read-side view of a [`Position`] valued at the latest instrument price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSnapshot {
    pub symbol: String,
    pub exchange: String,
    pub quantity: u64,
    #[serde(rename = "averagePrice")]
    pub average_cost: Decimal,
    pub current_value: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn field_of(err: CoreError) -> String {
        match err {
            CoreError::InvalidInput(field, _) => field,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn market_order_drops_supplied_price() {
        let mut req = OrderRequest::market("TCS", "NSE", OrderSide::Buy, 5);
        req.price = Some(dec!(10));
        let validated = req.validate().unwrap();
        assert_eq!(validated.limit_price, None);
        assert_eq!(validated.quantity, 5);
    }

    #[test]
    fn validation_names_the_offending_field() {
        let mut req = OrderRequest::market("TCS", "NSE", OrderSide::Buy, 5);
        req.exchange = Some("  ".to_string());
        assert_eq!(field_of(req.validate().unwrap_err()), "exchange");

        let mut req = OrderRequest::market("TCS", "NSE", OrderSide::Buy, 5);
        req.side = Some("HOLD".to_string());
        assert_eq!(field_of(req.validate().unwrap_err()), "orderType");

        let mut req = OrderRequest::market("TCS", "NSE", OrderSide::Buy, 5);
        req.order_type = None;
        assert_eq!(field_of(req.validate().unwrap_err()), "orderStyle");

        let req = OrderRequest::market("TCS", "NSE", OrderSide::Sell, 0);
        assert_eq!(field_of(req.validate().unwrap_err()), "quantity");

        let req = OrderRequest::limit("TCS", "NSE", OrderSide::Buy, 1, dec!(-3));
        assert_eq!(field_of(req.validate().unwrap_err()), "price");
    }

    #[test]
    fn executed_order_is_frozen() {
        let validated = OrderRequest::market("INFY", "NSE", OrderSide::Buy, 2)
            .validate()
            .unwrap();
        let mut order = Order::new(validated, "alice");
        order.place().unwrap();
        let at = Utc::now();
        order.execute(dec!(1520.25), at).unwrap();

        assert!(order.cancel().is_err());
        assert!(order.execute(dec!(1), Utc::now()).is_err());
        assert_eq!(order.status, OrderStatus::Executed);
        assert_eq!(order.executed_price, Some(dec!(1520.25)));
        assert_eq!(order.executed_at, Some(at));
    }

    #[test]
    fn request_reads_side_and_style_from_their_wire_names() {
        let req: OrderRequest = serde_json::from_str(
            r#"{"symbol":"RELIANCE","exchange":"NSE","orderType":"SELL","orderStyle":"LIMIT","quantity":3,"price":"2400.5"}"#,
        )
        .unwrap();
        let validated = req.validate().unwrap();
        assert_eq!(validated.side, OrderSide::Sell);
        assert_eq!(validated.order_type, OrderType::Limit);
        assert_eq!(validated.limit_price, Some(dec!(2400.5)));
    }

    #[test]
    fn order_serializes_with_wire_names() {
        let validated = OrderRequest::limit("INFY", "NSE", OrderSide::Buy, 2, dec!(1500))
            .validate()
            .unwrap();
        let order = Order::new(validated, "alice");
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["orderId"], order.id.to_string());
        assert_eq!(json["orderType"], "BUY");
        assert_eq!(json["orderStyle"], "LIMIT");
        assert_eq!(json["price"], "1500");
        assert_eq!(json["status"], "NEW");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn trade_requires_an_executed_order() {
        let validated = OrderRequest::market("INFY", "NSE", OrderSide::Buy, 2)
            .validate()
            .unwrap();
        let order = Order::new(validated, "alice");
        assert!(Trade::from_executed(&order).is_err());
    }
}

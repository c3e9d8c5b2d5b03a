use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => f.write_str("BUY"),
            OrderSide::Sell => f.write_str("SELL"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            other => Err(CoreError::InvalidInput(
                "orderType".to_string(),
                format!("must be BUY or SELL, got '{}'", other),
            )),
        }
    }
}

/// How an order is priced: at whatever the market offers, or bounded by a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
    Limit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => f.write_str("MARKET"),
            OrderType::Limit => f.write_str("LIMIT"),
        }
    }
}

impl FromStr for OrderType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MARKET" => Ok(OrderType::Market),
            "LIMIT" => Ok(OrderType::Limit),
            other => Err(CoreError::InvalidInput(
                "orderStyle".to_string(),
                format!("must be MARKET or LIMIT, got '{}'", other),
            )),
        }
    }
}

/// Lifecycle state of an order.
///
/// `New -> Placed -> Executed`, with `Cancelled` reachable from `New` or `Placed`.
/// `Executed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    Placed,
    Executed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Executed | OrderStatus::Cancelled)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::New, OrderStatus::Placed)
                | (OrderStatus::New, OrderStatus::Cancelled)
                | (OrderStatus::Placed, OrderStatus::Executed)
                | (OrderStatus::Placed, OrderStatus::Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::New => "NEW",
            OrderStatus::Placed => "PLACED",
            OrderStatus::Executed => "EXECUTED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_labels() {
        assert_eq!("BUY".parse::<OrderSide>().unwrap(), OrderSide::Buy);
        assert_eq!("LIMIT".parse::<OrderType>().unwrap(), OrderType::Limit);
        assert!("buy".parse::<OrderSide>().is_err());
        assert!("STOP".parse::<OrderType>().is_err());
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for next in [
            OrderStatus::New,
            OrderStatus::Placed,
            OrderStatus::Executed,
            OrderStatus::Cancelled,
        ] {
            assert!(!OrderStatus::Executed.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
        assert!(!OrderStatus::New.can_transition_to(OrderStatus::Executed));
        assert!(OrderStatus::Placed.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn serializes_in_upper_case() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }
}

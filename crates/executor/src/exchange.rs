use core_types::{Order, OrderSide, OrderType};
use rust_decimal::Decimal;

/// The "virtual exchange" that decides whether an order fills, and at what price.
///
/// It is a pure calculator: it never touches order, trade or portfolio state.
/// The caller applies the returned fill price.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedExchange {
    /// Fraction by which the market may sit beyond a limit price and still fill.
    tolerance: Decimal,
}

impl SimulatedExchange {
    pub fn new(tolerance: Decimal) -> Self {
        Self { tolerance }
    }

    /// Returns the fill price for `order` at `market_price`, or `None` if it does not fill.
    ///
    /// MARKET orders always fill at the market. LIMIT orders fill inside the
    /// tolerance band and never at a price worse than their limit:
    /// a BUY fills when `market <= limit * (1 + tolerance)` at `min(limit, market)`,
    /// a SELL fills when `market >= limit * (1 - tolerance)` at `max(limit, market)`.
    ///
    /// A BUY ceiling too large to represent is treated as unbounded; a SELL
    /// floor that cannot be computed never fills.
    pub fn quote_fill(&self, order: &Order, market_price: Decimal) -> Option<Decimal> {
        match order.order_type {
            OrderType::Market => Some(market_price),
            OrderType::Limit => {
                let limit = order.limit_price?;
                match order.side {
                    OrderSide::Buy => {
                        let within = Decimal::ONE
                            .checked_add(self.tolerance)
                            .and_then(|factor| limit.checked_mul(factor))
                            .is_none_or(|ceiling| market_price <= ceiling);
                        within.then(|| limit.min(market_price))
                    }
                    OrderSide::Sell => {
                        let within = Decimal::ONE
                            .checked_sub(self.tolerance)
                            .and_then(|factor| limit.checked_mul(factor))
                            .is_some_and(|floor| market_price >= floor);
                        within.then(|| limit.max(market_price))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::OrderRequest;
    use rust_decimal_macros::dec;

    fn order(request: OrderRequest) -> Order {
        Order::new(request.validate().unwrap(), "trader")
    }

    fn exchange() -> SimulatedExchange {
        SimulatedExchange::new(dec!(0.05))
    }

    #[test]
    fn market_orders_take_the_market() {
        let buy = order(OrderRequest::market("TCS", "NSE", OrderSide::Buy, 1));
        assert_eq!(exchange().quote_fill(&buy, dec!(3420.75)), Some(dec!(3420.75)));
    }

    #[test]
    fn limit_buy_inside_band_fills_at_limit() {
        let buy = order(OrderRequest::limit("TCS", "NSE", OrderSide::Buy, 1, dec!(100)));
        assert_eq!(exchange().quote_fill(&buy, dec!(104)), Some(dec!(100)));
        assert_eq!(exchange().quote_fill(&buy, dec!(105)), Some(dec!(100)));
    }

    #[test]
    fn limit_buy_below_limit_fills_at_market() {
        let buy = order(OrderRequest::limit("TCS", "NSE", OrderSide::Buy, 1, dec!(100)));
        assert_eq!(exchange().quote_fill(&buy, dec!(97.5)), Some(dec!(97.5)));
    }

    #[test]
    fn limit_buy_outside_band_does_not_fill() {
        let buy = order(OrderRequest::limit("TCS", "NSE", OrderSide::Buy, 1, dec!(100)));
        assert_eq!(exchange().quote_fill(&buy, dec!(110)), None);
        assert_eq!(exchange().quote_fill(&buy, dec!(105.01)), None);
    }

    #[test]
    fn limit_sell_band_mirrors_buy() {
        let sell = order(OrderRequest::limit("TCS", "NSE", OrderSide::Sell, 1, dec!(200)));
        assert_eq!(exchange().quote_fill(&sell, dec!(192)), Some(dec!(200)));
        assert_eq!(exchange().quote_fill(&sell, dec!(210)), Some(dec!(210)));
        assert_eq!(exchange().quote_fill(&sell, dec!(189.99)), None);
    }

    #[test]
    fn huge_limit_buy_fills_at_market_instead_of_overflowing() {
        let buy = order(OrderRequest::limit("TCS", "NSE", OrderSide::Buy, 1, Decimal::MAX));
        assert_eq!(exchange().quote_fill(&buy, dec!(3420.75)), Some(dec!(3420.75)));
    }

    #[test]
    fn huge_limit_sell_keeps_its_limit() {
        let sell = order(OrderRequest::limit("TCS", "NSE", OrderSide::Sell, 1, Decimal::MAX));
        assert_eq!(exchange().quote_fill(&sell, dec!(3420.75)), None);
    }

    #[test]
    fn zero_tolerance_requires_the_limit_itself() {
        let strict = SimulatedExchange::new(Decimal::ZERO);
        let buy = order(OrderRequest::limit("TCS", "NSE", OrderSide::Buy, 1, dec!(100)));
        assert_eq!(strict.quote_fill(&buy, dec!(100)), Some(dec!(100)));
        assert_eq!(strict.quote_fill(&buy, dec!(100.01)), None);
    }
}

use crate::error::InstrumentError;
use async_trait::async_trait;
use core_types::Instrument;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Read access to instrument prices, as needed by order handling and valuation.
///
/// The engine never writes prices; it only looks them up. Implementations may
/// return a price that changes between two calls.
#[async_trait]
pub trait InstrumentDirectory: Send + Sync {
    /// Returns the instrument traded as `symbol` on `exchange`, if listed.
    async fn lookup(&self, symbol: &str, exchange: &str) -> Option<Instrument>;

    /// Returns the whole catalogue.
    async fn list(&self) -> Vec<Instrument>;
}

type InstrumentKey = (String, String);

#[derive(Debug, Default)]
struct Catalogue {
    by_key: HashMap<InstrumentKey, Instrument>,
    // Listing order, so `list` is stable across calls.
    order: Vec<InstrumentKey>,
}

/// The in-process price store backing the simulator.
#[derive(Debug, Default)]
pub struct InMemoryInstrumentDirectory {
    catalogue: RwLock<Catalogue>,
}

impl InMemoryInstrumentDirectory {
    pub fn new(instruments: impl IntoIterator<Item = Instrument>) -> Self {
        let mut catalogue = Catalogue::default();
        for instrument in instruments {
            let key = (instrument.symbol.clone(), instrument.exchange.clone());
            if catalogue.by_key.insert(key.clone(), instrument).is_none() {
                catalogue.order.push(key);
            }
        }
        Self {
            catalogue: RwLock::new(catalogue),
        }
    }

    /// Moves the last traded price of a listed instrument.
    pub async fn update_price(
        &self,
        symbol: &str,
        exchange: &str,
        price: Decimal,
    ) -> Result<Instrument, InstrumentError> {
        if price <= Decimal::ZERO {
            return Err(InstrumentError::InvalidPrice(price));
        }

        let mut catalogue = self.catalogue.write().await;
        let instrument = catalogue
            .by_key
            .get_mut(&(symbol.to_string(), exchange.to_string()))
            .ok_or_else(|| InstrumentError::NotFound {
                symbol: symbol.to_string(),
                exchange: exchange.to_string(),
            })?;

        tracing::debug!(
            symbol,
            exchange,
            from = %instrument.last_traded_price,
            to = %price,
            "Instrument price updated."
        );
        instrument.last_traded_price = price;
        Ok(instrument.clone())
    }
}

#[async_trait]
impl InstrumentDirectory for InMemoryInstrumentDirectory {
    async fn lookup(&self, symbol: &str, exchange: &str) -> Option<Instrument> {
        let catalogue = self.catalogue.read().await;
        catalogue
            .by_key
            .get(&(symbol.to_string(), exchange.to_string()))
            .cloned()
    }

    async fn list(&self) -> Vec<Instrument> {
        let catalogue = self.catalogue.read().await;
        catalogue
            .order
            .iter()
            .filter_map(|key| catalogue.by_key.get(key).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn equity(symbol: &str, price: Decimal) -> Instrument {
        Instrument {
            symbol: symbol.to_string(),
            exchange: "NSE".to_string(),
            instrument_type: "EQUITY".to_string(),
            last_traded_price: price,
        }
    }

    #[tokio::test]
    async fn lookup_is_keyed_by_symbol_and_exchange() {
        let directory = InMemoryInstrumentDirectory::new([equity("TCS", dec!(3420.75))]);

        assert!(directory.lookup("TCS", "NSE").await.is_some());
        assert!(directory.lookup("TCS", "BSE").await.is_none());
        assert!(directory.lookup("INFY", "NSE").await.is_none());
    }

    #[tokio::test]
    async fn list_keeps_listing_order() {
        let directory = InMemoryInstrumentDirectory::new([
            equity("WIPRO", dec!(485.50)),
            equity("LT", dec!(3425.75)),
            equity("SBIN", dec!(625.25)),
        ]);
        let symbols: Vec<_> = directory
            .list()
            .await
            .into_iter()
            .map(|i| i.symbol)
            .collect();
        assert_eq!(symbols, ["WIPRO", "LT", "SBIN"]);
    }

    #[tokio::test]
    async fn update_price_moves_the_quote() {
        let directory = InMemoryInstrumentDirectory::new([equity("SBIN", dec!(625.25))]);

        let updated = directory.update_price("SBIN", "NSE", dec!(630)).await.unwrap();
        assert_eq!(updated.last_traded_price, dec!(630));
        assert_eq!(
            directory.lookup("SBIN", "NSE").await.unwrap().last_traded_price,
            dec!(630)
        );

        assert_eq!(
            directory.update_price("SBIN", "NSE", dec!(0)).await,
            Err(InstrumentError::InvalidPrice(dec!(0)))
        );
        assert!(matches!(
            directory.update_price("NOPE", "NSE", dec!(1)).await,
            Err(InstrumentError::NotFound { .. })
        ));
    }
}

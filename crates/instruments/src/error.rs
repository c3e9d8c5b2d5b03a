use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstrumentError {
    #[error("Instrument {symbol} not found on {exchange}")]
    NotFound { symbol: String, exchange: String },

    #[error("Price must be positive, got {0}")]
    InvalidPrice(Decimal),
}

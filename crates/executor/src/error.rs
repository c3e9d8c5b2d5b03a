use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutorError {
    #[error("Insufficient holdings to sell. Requested: {requested}, Available: {available}")]
    InsufficientHoldings { requested: u64, available: u64 },

    #[error("Trade {0} not found")]
    TradeNotFound(Uuid),

    #[error("An unexpected portfolio calculation failure occurred: {0}")]
    Calculation(String),

    #[error(transparent)]
    Core(#[from] core_types::CoreError),
}

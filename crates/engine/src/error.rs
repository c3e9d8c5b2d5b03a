use core_types::CoreError;
use executor::ExecutorError;
use thiserror::Error;

/// Every failure the order lifecycle can report to a caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("Insufficient holdings to sell. Requested: {requested}, Available: {available}")]
    InsufficientHoldings { requested: u64, available: u64 },

    #[error("Internal engine error: {0}")]
    Internal(String),
}

impl EngineError {
    /// A stable, machine-readable name for the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation { .. } => "validation",
            EngineError::NotFound(_) => "not_found",
            EngineError::Unauthorized(_) => "unauthorized",
            EngineError::InvalidState(_) => "invalid_state",
            EngineError::InsufficientHoldings { .. } => "insufficient_holdings",
            EngineError::Internal(_) => "internal",
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::InvalidInput(field, message) => EngineError::Validation { field, message },
            CoreError::InvalidTransition { from, to } => {
                EngineError::InvalidState(format!("order cannot move from {} to {}", from, to))
            }
            CoreError::Calculation(message) => EngineError::Internal(message),
        }
    }
}

impl From<ExecutorError> for EngineError {
    fn from(error: ExecutorError) -> Self {
        match error {
            ExecutorError::InsufficientHoldings {
                requested,
                available,
            } => EngineError::InsufficientHoldings {
                requested,
                available,
            },
            ExecutorError::TradeNotFound(id) => EngineError::NotFound(format!("Trade {} not found", id)),
            ExecutorError::Calculation(message) => EngineError::Internal(message),
            ExecutorError::Core(core) => core.into(),
        }
    }
}

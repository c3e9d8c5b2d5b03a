use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use engine::EngineError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid request body: {0}")]
    BadRequest(String),
}

impl AppError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Engine(err) => {
                let status = match err {
                    EngineError::Validation { .. } => StatusCode::BAD_REQUEST,
                    EngineError::NotFound(_) => StatusCode::NOT_FOUND,
                    EngineError::Unauthorized(_) => StatusCode::FORBIDDEN,
                    EngineError::InvalidState(_) | EngineError::InsufficientHoldings { .. } => {
                        StatusCode::CONFLICT
                    }
                    EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.kind())
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "validation"),
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "Request failed with an internal error.");
            "An internal error occurred".to_string()
        } else {
            tracing::debug!(error = %self, kind, "Request rejected.");
            self.to_string()
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "error": kind,
        }));
        (status, body).into_response()
    }
}

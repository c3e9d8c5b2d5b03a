use crate::{auth::CurrentUser, error::AppError, AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use core_types::{Instrument, Order, OrderRequest, PositionSnapshot, Trade};
use engine::EngineError;
use instruments::InstrumentDirectory;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

/// The success envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            count: None,
            message: None,
        })
    }

    fn with_message(data: T, message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            count: None,
            message: Some(message.to_string()),
        })
    }
}

impl<T> ApiResponse<Vec<T>> {
    fn list(data: Vec<T>) -> Json<Self> {
        Json(Self {
            success: true,
            count: Some(data.len()),
            data,
            message: None,
        })
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

// A malformed id can never name a stored record, so it is reported as missing.
fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{} {} not found", what, raw)))
}

fn ensure_owner(owner: &str, user: &CurrentUser, what: &str) -> Result<(), AppError> {
    if owner != user.0 {
        return Err(EngineError::Unauthorized(format!("{} does not belong to user", what)).into());
    }
    Ok(())
}

/// # GET /
/// Entry points of the API.
pub async fn index() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Welcome to the Meridian trading API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "instruments": "/api/v1/instruments",
            "orders": "/api/v1/orders",
            "trades": "/api/v1/trades",
            "portfolio": "/api/v1/portfolio",
        },
    }))
}

/// # GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Trading API SDK is running",
        "status": "UP",
        "timestamp": Utc::now(),
    }))
}

/// # GET /api/v1/instruments
pub async fn list_instruments(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Instrument>> {
    let instruments = state.desk.instruments().list().await;
    Ok(ApiResponse::list(instruments))
}

/// # POST /api/v1/orders
/// Accepts the order and returns it in `NEW` status; execution follows later.
pub async fn place_order(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let order = state.desk.order_book().submit(&request, &user.0).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(order, "Order placed successfully"),
    ))
}

/// # GET /api/v1/orders
pub async fn list_orders(State(state): State<Arc<AppState>>, user: CurrentUser) -> ApiResult<Vec<Order>> {
    let orders = state.desk.order_book().list_by_user(&user.0).await;
    Ok(ApiResponse::list(orders))
}

/// # GET /api/v1/orders/:order_id
pub async fn get_order(
    Path(order_id): Path<String>,
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Order> {
    let order_id = parse_id(&order_id, "Order")?;
    let order = state.desk.order_book().get(order_id).await?;
    ensure_owner(&order.user_id, &user, "Order")?;
    Ok(ApiResponse::ok(order))
}

/// # DELETE /api/v1/orders/:order_id
pub async fn cancel_order(
    Path(order_id): Path<String>,
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Order> {
    let order_id = parse_id(&order_id, "Order")?;
    let order = state.desk.order_book().cancel(order_id, &user.0).await?;
    Ok(ApiResponse::with_message(order, "Order cancelled successfully"))
}

/// # GET /api/v1/trades
pub async fn list_trades(State(state): State<Arc<AppState>>, user: CurrentUser) -> ApiResult<Vec<Trade>> {
    let trades = state.desk.trades().list_by_user(&user.0).await;
    Ok(ApiResponse::list(trades))
}

/// # GET /api/v1/trades/:trade_id
pub async fn get_trade(
    Path(trade_id): Path<String>,
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Trade> {
    let trade_id = parse_id(&trade_id, "Trade")?;
    let trade = state
        .desk
        .trades()
        .get(trade_id)
        .await
        .map_err(EngineError::from)?;
    ensure_owner(&trade.user_id, &user, "Trade")?;
    Ok(ApiResponse::ok(trade))
}

/// # GET /api/v1/portfolio
/// Holdings valued at the current instrument prices.
pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Vec<PositionSnapshot>> {
    let positions = state.desk.portfolio().list_by_user(&user.0).await;
    Ok(ApiResponse::list(positions))
}

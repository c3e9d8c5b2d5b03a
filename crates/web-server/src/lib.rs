use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use engine::TradingDesk;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod auth;
pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub desk: Arc<TradingDesk>,
}

/// Builds the full HTTP surface around a trading desk.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    let api = Router::new()
        .route("/instruments", get(handlers::list_instruments))
        .route(
            "/orders",
            get(handlers::list_orders).post(handlers::place_order),
        )
        .route(
            "/orders/:order_id",
            get(handlers::get_order).delete(handlers::cancel_order),
        )
        .route("/trades", get(handlers::list_trades))
        .route("/trades/:trade_id", get(handlers::get_trade))
        .route("/portfolio", get(handlers::get_portfolio));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 64))
}

/// Serves the API on `addr` until Ctrl-C.
pub async fn run_server(addr: SocketAddr, desk: Arc<TradingDesk>) -> anyhow::Result<()> {
    let app = router(Arc::new(AppState { desk }));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
    }
}

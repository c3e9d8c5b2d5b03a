use crate::error::EngineError;
use crate::execution::ExecutionEngine;
use crate::scheduler::Scheduler;
use crate::store::OrderStore;
use core_types::{Order, OrderRequest, OrderStatus};
use instruments::InstrumentDirectory;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Owns every order: validates submissions, hands out snapshots, handles
/// cancellation and schedules the execution attempt for each new order.
pub struct OrderBook {
    orders: Arc<OrderStore>,
    instruments: Arc<dyn InstrumentDirectory>,
    engine: Arc<ExecutionEngine>,
    scheduler: Arc<dyn Scheduler>,
    execution_delay: Duration,
}

impl OrderBook {
    pub(crate) fn new(
        orders: Arc<OrderStore>,
        instruments: Arc<dyn InstrumentDirectory>,
        engine: Arc<ExecutionEngine>,
        scheduler: Arc<dyn Scheduler>,
        execution_delay: Duration,
    ) -> Self {
        Self {
            orders,
            instruments,
            engine,
            scheduler,
            execution_delay,
        }
    }

    /// Validates and stores a new order, then schedules its execution.
    ///
    /// Returns as soon as the order is stored; the returned snapshot is always `New`.
    pub async fn submit(&self, request: &OrderRequest, user_id: &str) -> Result<Order, EngineError> {
        let validated = request.validate()?;

        if self
            .instruments
            .lookup(&validated.symbol, &validated.exchange)
            .await
            .is_none()
        {
            return Err(EngineError::NotFound(format!(
                "Instrument {} not found on {}",
                validated.symbol, validated.exchange
            )));
        }

        let order = Order::new(validated, user_id);
        let snapshot = order.clone();
        self.orders.insert(order).await;

        let engine = Arc::clone(&self.engine);
        let order_id = snapshot.id;
        self.scheduler.schedule(
            self.execution_delay,
            Box::pin(async move {
                engine.execute(order_id).await;
            }),
        );

        tracing::info!(
            order_id = %snapshot.id,
            user_id,
            symbol = %snapshot.symbol,
            exchange = %snapshot.exchange,
            side = %snapshot.side,
            order_type = %snapshot.order_type,
            quantity = snapshot.quantity,
            "Order accepted."
        );
        Ok(snapshot)
    }

    pub async fn get(&self, order_id: Uuid) -> Result<Order, EngineError> {
        let handle = self.orders.get(order_id).await.ok_or_else(|| order_not_found(order_id))?;
        let order = handle.lock().await;
        Ok(order.clone())
    }

    /// Every order the user has submitted, oldest first.
    pub async fn list_by_user(&self, user_id: &str) -> Vec<Order> {
        let mut orders = Vec::new();
        for handle in self.orders.for_user(user_id).await {
            orders.push(handle.lock().await.clone());
        }
        orders
    }

    /// Cancels an order that has not yet executed.
    pub async fn cancel(&self, order_id: Uuid, user_id: &str) -> Result<Order, EngineError> {
        let handle = self.orders.get(order_id).await.ok_or_else(|| order_not_found(order_id))?;
        let mut order = handle.lock().await;

        if order.user_id != user_id {
            return Err(EngineError::Unauthorized(
                "Order does not belong to user".to_string(),
            ));
        }
        match order.status {
            OrderStatus::Executed => {
                return Err(EngineError::InvalidState(
                    "Cannot cancel an executed order".to_string(),
                ));
            }
            OrderStatus::Cancelled => {
                return Err(EngineError::InvalidState(
                    "Order is already cancelled".to_string(),
                ));
            }
            OrderStatus::New | OrderStatus::Placed => {}
        }

        let previous = order.status;
        order.cancel()?;
        tracing::info!(%order_id, user_id, from = %previous, "Order cancelled.");
        Ok(order.clone())
    }
}

fn order_not_found(order_id: Uuid) -> EngineError {
    EngineError::NotFound(format!("Order {} not found", order_id))
}

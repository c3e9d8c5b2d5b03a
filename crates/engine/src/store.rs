use core_types::Order;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Shared handle to one order. Holding its lock is what serialises a cancel
/// against an execution attempt on the same order.
pub(crate) type OrderHandle = Arc<Mutex<Order>>;

#[derive(Default)]
struct OrderIndex {
    by_id: HashMap<Uuid, OrderHandle>,
    // Submission order per user.
    by_user: HashMap<String, Vec<Uuid>>,
}

/// The registry of every order ever submitted. Orders are never removed.
#[derive(Default)]
pub(crate) struct OrderStore {
    index: RwLock<OrderIndex>,
}

impl OrderStore {
    pub(crate) async fn insert(&self, order: Order) -> OrderHandle {
        let id = order.id;
        let user_id = order.user_id.clone();
        let handle = Arc::new(Mutex::new(order));

        let mut index = self.index.write().await;
        index.by_id.insert(id, Arc::clone(&handle));
        index.by_user.entry(user_id).or_default().push(id);
        handle
    }

    pub(crate) async fn get(&self, id: Uuid) -> Option<OrderHandle> {
        self.index.read().await.by_id.get(&id).cloned()
    }

    /// Handles for the user's orders, oldest first.
    pub(crate) async fn for_user(&self, user_id: &str) -> Vec<OrderHandle> {
        let index = self.index.read().await;
        index
            .by_user
            .get(user_id)
            .map(|ids| ids.iter().filter_map(|id| index.by_id.get(id).cloned()).collect())
            .unwrap_or_default()
    }
}

//! The signed-in user's order history.

use std::sync::Arc;

use marketstall_core::{Order, OrderId};
use tokio::sync::RwLock;
use tracing::{instrument, warn};

use crate::http::ApiClient;
use crate::listing::{ListController, ListOptions, ListState, ORDERS_DEBOUNCE, Refresh};
use crate::services::OrderService;
use crate::services::orders::USER_ORDERS_PAGE_SIZE;

/// Detail-view state; the list lives in the controller.
#[derive(Debug, Clone, Default)]
pub struct OrdersState {
    pub current_order: Option<Order>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct OrdersStore {
    list: ListController<OrderService>,
    detail: Arc<RwLock<OrdersState>>,
}

impl OrdersStore {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            list: ListController::new(
                OrderService::new(client),
                ListOptions::new(USER_ORDERS_PAGE_SIZE, ORDERS_DEBOUNCE),
            ),
            detail: Arc::new(RwLock::new(OrdersState::default())),
        }
    }

    /// The paginated list controller.
    #[must_use]
    pub const fn list(&self) -> &ListController<OrderService> {
        &self.list
    }

    pub async fn orders(&self) -> ListState<Order, ()> {
        self.list.state().await
    }

    pub async fn detail(&self) -> OrdersState {
        self.detail.read().await.clone()
    }

    /// `GET /users/orders`. Failures land in the list's `error`.
    pub async fn fetch_user_orders(&self, page: u32, limit: u32) -> Refresh {
        self.list.load(page, limit).await
    }

    /// `GET /users/orders/:id` into `current_order`.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn fetch_user_order(&self, id: &OrderId) {
        {
            let mut detail = self.detail.write().await;
            detail.loading = true;
            detail.error = None;
        }

        let result = self.list.source().user_order(id).await;

        let mut detail = self.detail.write().await;
        detail.loading = false;
        match result {
            Ok(order) => detail.current_order = Some(order),
            Err(e) => {
                warn!(error = %e, "Failed to fetch order");
                detail.error = Some(e.user_message());
            }
        }
    }

    pub async fn reset(&self) {
        self.list.reset().await;
        *self.detail.write().await = OrdersState::default();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::session::StoredSession;
    use crate::storage::MemoryStorage;

    fn offline_client() -> ApiClient {
        let config = ClientConfig::new("http://127.0.0.1:9/api").unwrap();
        let session = StoredSession::new(Arc::new(MemoryStorage::new()), chrono::Duration::days(7));
        ApiClient::new(&config, Arc::new(session)).unwrap()
    }

    #[tokio::test]
    async fn test_read_failures_are_captured() {
        let store = OrdersStore::new(offline_client());
        assert_eq!(store.fetch_user_orders(1, 10).await, Refresh::Failed);
        assert!(store.orders().await.error.is_some());

        store.fetch_user_order(&OrderId::new("o1")).await;
        let detail = store.detail().await;
        assert!(detail.error.is_some());
        assert!(!detail.loading);

        store.reset().await;
        assert!(store.detail().await.error.is_none());
        assert!(store.orders().await.error.is_none());
    }
}

//! Admin order list, detail and status changes.

use std::sync::Arc;

use marketstall_core::{Money, Order, OrderId, OrderStatus};
use marketstall_storefront::Result;
use marketstall_storefront::http::ApiClient;
use marketstall_storefront::listing::{ListController, ListOptions, ORDERS_DEBOUNCE, Refresh};
use marketstall_storefront::notify::{Notice, NoticeLevel, Notifier};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::services::{AdminOrderFilter, AdminOrderService};

/// Admin order list page size.
pub const ADMIN_ORDERS_PAGE_SIZE: u32 = 20;

/// Detail-view state.
#[derive(Debug, Clone, Default)]
pub struct AdminOrderDetail {
    pub current_order: Option<Order>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Figures for the orders currently on screen (one page, not the whole
/// history).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub total_revenue: Money,
    pub pending: usize,
    pub delivered: usize,
    pub average_order_value: Money,
}

impl OrderSummary {
    #[must_use]
    pub fn from_orders(orders: &[Order]) -> Self {
        let total_revenue: Money = orders.iter().map(|o| o.total).sum();
        let count = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count();
        let average_order_value = if orders.is_empty() {
            Money::ZERO
        } else {
            Money::new(total_revenue.amount() / Decimal::from(orders.len())).round_to_cents()
        };
        Self {
            total_revenue,
            pending: count(OrderStatus::Pending),
            delivered: count(OrderStatus::Delivered),
            average_order_value,
        }
    }
}

#[derive(Clone)]
pub struct AdminOrderStore {
    list: ListController<AdminOrderService>,
    detail: Arc<RwLock<AdminOrderDetail>>,
    notifier: Arc<dyn Notifier>,
}

impl AdminOrderStore {
    #[must_use]
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            list: ListController::new(
                AdminOrderService::new(client),
                ListOptions::new(ADMIN_ORDERS_PAGE_SIZE, ORDERS_DEBOUNCE),
            ),
            detail: Arc::new(RwLock::new(AdminOrderDetail::default())),
            notifier,
        }
    }

    #[must_use]
    pub const fn list(&self) -> &ListController<AdminOrderService> {
        &self.list
    }

    /// Filter by status; `None` shows all.
    pub async fn filter_status(&self, status: Option<OrderStatus>) -> Refresh {
        self.list.set_filter(AdminOrderFilter { status }).await
    }

    pub async fn detail(&self) -> AdminOrderDetail {
        self.detail.read().await.clone()
    }

    pub async fn summary(&self) -> OrderSummary {
        OrderSummary::from_orders(&self.list.items().await)
    }

    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn fetch_order(&self, id: &OrderId) {
        {
            let mut detail = self.detail.write().await;
            detail.loading = true;
            detail.error = None;
        }

        let result = self.list.source().get(id).await;

        let mut detail = self.detail.write().await;
        detail.loading = false;
        match result {
            Ok(order) => detail.current_order = Some(order),
            Err(e) => {
                warn!(error = %e, "Failed to fetch order");
                detail.error = Some("Failed to fetch order".to_string());
            }
        }
    }

    /// Change an order's status.
    ///
    /// The list row and the open detail are replaced with the server's copy
    /// only after the API accepts the change. A rejected change leaves them
    /// as they were.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order> {
        match self.list.source().update_status(id, status).await {
            Ok(order) => {
                self.list.replace_item(|row| row.id == order.id, order.clone()).await;
                {
                    let mut detail = self.detail.write().await;
                    if detail.current_order.as_ref().is_some_and(|o| o.id == order.id) {
                        detail.current_order = Some(order.clone());
                    }
                    detail.error = None;
                }
                info!("Order status updated");
                self.notifier.notify(Notice::new(
                    NoticeLevel::Success,
                    "Order status updated successfully!",
                ));
                Ok(order)
            }
            Err(e) => {
                warn!(error = %e, "Failed to update order status");
                self.detail.write().await.error = Some("Failed to update order status".to_string());
                self.notifier.notify(
                    Notice::new(NoticeLevel::Error, "Failed to update order status")
                        .with_detail(e.user_message()),
                );
                Err(e)
            }
        }
    }

    /// Clear the open detail.
    pub async fn close_order(&self) {
        *self.detail.write().await = AdminOrderDetail::default();
    }

    pub async fn reset(&self) {
        self.list.reset().await;
        self.close_order().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marketstall_storefront::ClientConfig;
    use marketstall_storefront::notify::RecordingNotifier;
    use marketstall_storefront::session::StoredSession;
    use marketstall_storefront::storage::MemoryStorage;

    use super::*;

    fn order(id: &str, status: &str, total: f64) -> Order {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "userId": "u1",
            "items": [],
            "status": status,
            "total": total,
        }))
        .unwrap()
    }

    #[test]
    fn test_summary_of_current_page() {
        let orders = [
            order("o1", "pending", 10.0),
            order("o2", "delivered", 25.5),
            order("o3", "pending", 4.5),
        ];
        let summary = OrderSummary::from_orders(&orders);
        assert_eq!(summary.total_revenue, Money::from_cents(4000));
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.average_order_value, Money::from_cents(1333));
    }

    #[test]
    fn test_summary_of_empty_page() {
        let summary = OrderSummary::from_orders(&[]);
        assert_eq!(summary.total_revenue, Money::ZERO);
        assert_eq!(summary.average_order_value, Money::ZERO);
    }

    #[tokio::test]
    async fn test_rejected_status_change_keeps_state() {
        let config = ClientConfig::new("http://127.0.0.1:9/api").unwrap();
        let session = StoredSession::new(Arc::new(MemoryStorage::new()), chrono::Duration::days(7));
        let client = ApiClient::new(&config, Arc::new(session)).unwrap();
        let notifier = Arc::new(RecordingNotifier::new());
        let store = AdminOrderStore::new(client, notifier.clone());

        let result = store
            .update_order_status(&OrderId::new("o1"), OrderStatus::Delivered)
            .await;
        assert!(result.is_err());
        assert_eq!(
            store.detail().await.error.as_deref(),
            Some("Failed to update order status")
        );
        assert!(store.detail().await.current_order.is_none());
        assert_eq!(notifier.titles(), ["Failed to update order status"]);
    }
}

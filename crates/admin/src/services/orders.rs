//! Admin order management.

use marketstall_core::{Order, OrderId, OrderStatus, Page};
use marketstall_storefront::Result;
use marketstall_storefront::http::{ApiClient, segment};
use marketstall_storefront::listing::{ListQuery, ListSource};
use marketstall_storefront::services::OrderListResponse;
use marketstall_storefront::services::orders::OrderResponse;
use serde::Serialize;
use tracing::instrument;

/// Filters for the admin order list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminOrderFilter {
    /// `None` lists every status.
    pub status: Option<OrderStatus>,
}

#[derive(Serialize)]
struct StatusBody {
    status: OrderStatus,
}

/// `/admin/orders` endpoints.
#[derive(Clone)]
pub struct AdminOrderService {
    client: ApiClient,
}

impl AdminOrderService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /admin/orders`.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &ListQuery<AdminOrderFilter>) -> Result<Page<Order>> {
        let mut params = query.base_params();
        if let Some(status) = query.filter.status {
            params.push(("status", status.as_str().to_string()));
        }
        let response: OrderListResponse = self.client.get("/admin/orders", &params).await?;
        Ok(response.into_page())
    }

    /// `GET /admin/orders/:id`.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get(&self, id: &OrderId) -> Result<Order> {
        let response: OrderResponse = self.client.get(&order_path(id), &[]).await?;
        Ok(response.order)
    }

    /// `PATCH /admin/orders/:id/status`. Transition rules are enforced by the
    /// API only.
    ///
    /// # Errors
    ///
    /// Returns the API error, e.g. when the transition is rejected.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order> {
        let path = format!("{}/status", order_path(id));
        let response: OrderResponse = self.client.patch(&path, &StatusBody { status }).await?;
        Ok(response.order)
    }
}

fn order_path(id: &OrderId) -> String {
    format!("/admin/orders/{}", segment(id.as_str()))
}

impl ListSource for AdminOrderService {
    type Item = Order;
    type Filter = AdminOrderFilter;

    async fn fetch(&self, query: &ListQuery<AdminOrderFilter>) -> Result<Page<Order>> {
        self.list(query).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_body_uses_wire_value() {
        let body = serde_json::to_value(StatusBody {
            status: OrderStatus::OutForDelivery,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "status": "out_for_delivery" }));
    }

    #[test]
    fn test_order_path_encodes_id() {
        assert_eq!(order_path(&OrderId::new("a/b")), "/admin/orders/a%2Fb");
    }
}

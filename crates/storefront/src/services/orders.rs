//! The signed-in user's orders.

use marketstall_core::{Order, OrderId, Page};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::http::{ApiClient, segment};
use crate::listing::{ListQuery, ListSource};

/// Default page size for a user's order history.
pub const USER_ORDERS_PAGE_SIZE: u32 = 10;

/// Order listing shape shared by the user and admin endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
    #[serde(default)]
    pub orders: Vec<Order>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl OrderListResponse {
    #[must_use]
    pub fn into_page(self) -> Page<Order> {
        Page {
            items: self.orders,
            current_page: self.page,
            total_pages: self.total_pages,
            total: self.total,
            limit: self.limit,
        }
    }
}

/// `{order}` with an optional `success` flag.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub order: Order,
}

#[derive(Clone)]
pub struct OrderService {
    client: ApiClient,
}

impl OrderService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /users/orders`.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self))]
    pub async fn user_orders(&self, page: u32, limit: u32) -> Result<Page<Order>> {
        let params = [("page", page.to_string()), ("limit", limit.to_string())];
        let response: OrderListResponse = self.client.get("/users/orders", &params).await?;
        Ok(response.into_page())
    }

    /// `GET /users/orders/:id`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for orders that are not the user's.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn user_order(&self, id: &OrderId) -> Result<Order> {
        let path = format!("/users/orders/{}", segment(id.as_str()));
        let response: OrderResponse = self.client.get(&path, &[]).await?;
        Ok(response.order)
    }
}

impl ListSource for OrderService {
    type Item = Order;
    type Filter = ();

    async fn fetch(&self, query: &ListQuery<()>) -> Result<Page<Order>> {
        self.user_orders(query.page, query.limit).await
    }
}

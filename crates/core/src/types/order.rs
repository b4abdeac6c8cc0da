//! Orders and their line items.
//!
//! Order lines are a snapshot taken when the order was placed. They are
//! deliberately decoupled from live products so historical orders keep their
//! original names and prices after the catalog changes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId, UserId};
use super::money::Money;
use super::status::OrderStatus;
use super::user::Address;

/// A line of an order (denormalized snapshot of the product).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    pub quantity: u32,
    #[serde(default)]
    pub images: Vec<String>,
}

impl OrderItem {
    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

/// An order as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub address: Address,
    pub status: OrderStatus,
    pub total: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_session_id: Option<String>,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_order() {
        let json = r#"{
            "id": "o1",
            "userId": "u1",
            "items": [
                {"productId": "p1", "name": "Mug", "description": "", "price": 7.5, "quantity": 2, "images": []}
            ],
            "address": {"street": "1 High St", "city": "Leeds", "postCode": "LS1", "country": "UK"},
            "status": "out_for_delivery",
            "total": 15.0,
            "customerEmail": "a@b.co",
            "metadata": {"source": "web"},
            "createdAt": "2024-03-01T12:00:00Z",
            "updatedAt": "2024-03-01T12:00:00Z"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::OutForDelivery);
        assert_eq!(order.unit_count(), 2);
        assert_eq!(order.items[0].line_total(), Money::from_cents(1500));
        assert_eq!(order.metadata.get("source"), Some(&serde_json::json!("web")));
    }
}

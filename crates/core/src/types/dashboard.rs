//! Admin dashboard statistics.

use serde::{Deserialize, Serialize};

use super::money::Money;

/// Order counts per status as reported by the dashboard endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusBreakdown {
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub processing: u64,
    #[serde(default)]
    pub confirmed: u64,
    #[serde(default)]
    pub out_for_delivery: u64,
    #[serde(default)]
    pub cancelled: u64,
}

/// Published vs draft product counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStatusBreakdown {
    #[serde(default)]
    pub published: u64,
    #[serde(default)]
    pub draft: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_revenue: Money,
    pub total_orders: u64,
    pub total_products: u64,
    pub published_products: u64,
    pub pending_orders: u64,
    #[serde(default)]
    pub order_status: OrderStatusBreakdown,
    #[serde(default)]
    pub product_status: ProductStatusBreakdown,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_dashboard_payload() {
        let json = r#"{
            "totalRevenue": 1234.5,
            "totalOrders": 12,
            "totalProducts": 40,
            "publishedProducts": 31,
            "pendingOrders": 3,
            "orderStatus": {"completed": 5, "pending": 3, "processing": 2, "confirmed": 1, "out_for_delivery": 1, "cancelled": 0},
            "productStatus": {"published": 31, "draft": 9}
        }"#;
        let stats: DashboardStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_revenue, Money::from_cents(123_450));
        assert_eq!(stats.order_status.out_for_delivery, 1);
        assert_eq!(stats.product_status.draft, 9);
    }
}

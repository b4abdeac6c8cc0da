//! Hosted checkout session creation.

use marketstall_core::{Address, Money, OrderItem};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{ApiError, Result};
use crate::http::ApiClient;

/// Body of `POST /users/checkout`: a denormalized snapshot of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub cart_items: Vec<OrderItem>,
    pub customer_email: String,
    pub address: Address,
    pub total: Money,
}

#[derive(Deserialize)]
struct CheckoutResponse {
    #[serde(default)]
    success: bool,
    url: Option<String>,
}

#[derive(Clone)]
pub struct CheckoutService {
    client: ApiClient,
}

impl CheckoutService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a hosted payment session and return its redirect URL.
    ///
    /// # Errors
    ///
    /// Returns the API error, or `ApiError::Decode` if no URL came back.
    #[instrument(skip(self, request), fields(items = request.cart_items.len(), total = %request.total))]
    pub async fn create_session(&self, request: &CheckoutRequest) -> Result<String> {
        let response: CheckoutResponse = self.client.post("/users/checkout", request).await?;
        match response.url {
            Some(url) if response.success && !url.is_empty() => Ok(url),
            _ => Err(ApiError::Decode(
                "checkout response did not include a payment URL".to_string(),
            )),
        }
    }
}

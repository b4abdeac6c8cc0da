//! Handoff from the cart to the hosted payment page.

use std::sync::Arc;

use marketstall_core::{AddressForm, CartItem, OrderItem, ValidationError};
use tracing::{info, instrument, warn};

use crate::error::{ApiError, Result, add_breadcrumb};
use crate::http::ApiClient;
use crate::notify::{Notice, NoticeLevel, Notifier};
use crate::services::{CheckoutRequest, CheckoutService};
use crate::stores::{AuthStore, CartStore};

#[derive(Clone)]
pub struct CheckoutStore {
    service: CheckoutService,
    notifier: Arc<dyn Notifier>,
}

impl CheckoutStore {
    #[must_use]
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service: CheckoutService::new(client),
            notifier,
        }
    }

    /// Snapshot the cart and create a payment session. Returns the URL to
    /// send the shopper to. The cart is kept until payment completes.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without a signed-in user, `Validation` for an empty
    /// cart or an incomplete shipping form (all checked before any request),
    /// otherwise the API error.
    #[instrument(skip_all)]
    pub async fn begin_checkout(
        &self,
        cart: &CartStore,
        auth: &AuthStore,
        shipping: &AddressForm,
    ) -> Result<String> {
        let Some(user) = auth.user().await else {
            return Err(ApiError::Unauthorized(
                "Please sign in to check out".to_string(),
            ));
        };

        let snapshot = cart.snapshot().await;
        if snapshot.is_empty() {
            return Err(ValidationError::new("cart", "Your cart is empty").into());
        }
        let address = shipping.validate()?;

        let request = CheckoutRequest {
            cart_items: snapshot.items().iter().map(order_line).collect(),
            customer_email: user.email.clone(),
            address,
            total: snapshot.total(),
        };

        match self.service.create_session(&request).await {
            Ok(url) => {
                add_breadcrumb("checkout", "Payment session created", None);
                info!(items = request.cart_items.len(), total = %request.total, "Checkout started");
                Ok(url)
            }
            Err(e) => {
                warn!(error = %e, "Checkout failed");
                self.notifier.notify(
                    Notice::new(NoticeLevel::Error, "Failed to start checkout.")
                        .with_detail(e.user_message()),
                );
                Err(e)
            }
        }
    }
}

/// Denormalize a cart line into the order line the API stores.
fn order_line(item: &CartItem) -> OrderItem {
    OrderItem {
        product_id: item.product.id.clone(),
        name: item.product.name.clone(),
        description: item.product.description.clone(),
        price: item.product.price,
        quantity: item.quantity,
        images: item.product.images.clone(),
    }
}

impl std::fmt::Debug for CheckoutStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutStore").finish_non_exhaustive()
    }
}

//! Durable shopping cart.
//!
//! Wraps the [`Cart`] aggregate with persistence and notifications. The cart
//! is written to storage after every change and read back by
//! [`CartStore::load`]. Storage problems are logged and otherwise ignored:
//! cart actions never fail.

use std::sync::Arc;

use marketstall_core::{Cart, CartChange, CartItem, CartItemId, Money, Product, ProductId};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::error::add_breadcrumb;
use crate::notify::{Notice, NoticeLevel, Notifier};
use crate::storage::Storage;

/// Storage key the cart is persisted under.
pub const CART_STORAGE_KEY: &str = "cart-storage";

/// Shared handle to the shopper's cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    cart: RwLock<Cart>,
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
}

impl CartStore {
    /// Rehydrate the cart from storage, starting empty if nothing usable is
    /// stored.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>) -> Self {
        let cart = match storage.read(CART_STORAGE_KEY) {
            Ok(Some(json)) => serde_json::from_str::<Cart>(&json).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable stored cart");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored cart");
                Cart::new()
            }
        };
        debug!(lines = cart.items().len(), "Cart loaded");

        Self {
            inner: Arc::new(CartStoreInner {
                cart: RwLock::new(cart),
                storage,
                notifier,
            }),
        }
    }

    /// Add `quantity` units of `product`, merging with an existing line.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_item(&self, product: &Product, quantity: u32) -> CartChange {
        self.mutate(|cart| cart.add_item(product, quantity)).await
    }

    /// Set a line's quantity; zero or less removes the line.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn update_quantity(&self, item_id: &CartItemId, quantity: i64) -> CartChange {
        self.mutate(|cart| cart.update_quantity(item_id, quantity)).await
    }

    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_item(&self, item_id: &CartItemId) -> CartChange {
        self.mutate(|cart| cart.remove_item(item_id)).await
    }

    pub async fn clear_cart(&self) -> CartChange {
        self.mutate(Cart::clear).await
    }

    /// Copy of the whole cart.
    pub async fn snapshot(&self) -> Cart {
        self.inner.cart.read().await.clone()
    }

    pub async fn items(&self) -> Vec<CartItem> {
        self.inner.cart.read().await.items().to_vec()
    }

    pub async fn item_count(&self) -> u32 {
        self.inner.cart.read().await.item_count()
    }

    pub async fn total(&self) -> Money {
        self.inner.cart.read().await.total()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.cart.read().await.is_empty()
    }

    pub async fn find_by_product(&self, product_id: &ProductId) -> Option<CartItem> {
        self.inner.cart.read().await.find_by_product(product_id).cloned()
    }

    /// Run a mutation, persist while still holding the lock, then notify.
    ///
    /// Persisting under the guard keeps the stored cart in mutation order.
    /// `Storage` is synchronous, so a `FileStorage` write blocks this worker
    /// for one small file write.
    async fn mutate(&self, op: impl FnOnce(&mut Cart) -> CartChange) -> CartChange {
        let change = {
            let mut cart = self.inner.cart.write().await;
            let change = op(&mut cart);
            if change.is_mutation() {
                self.persist(&cart);
            }
            change
        };

        if let Some(message) = change.message() {
            add_breadcrumb("cart", &message, None);
            self.inner
                .notifier
                .notify(Notice::new(notice_level(&change), message));
        }
        change
    }

    fn persist(&self, cart: &Cart) {
        let result = serde_json::to_string(cart)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.inner
                    .storage
                    .write(CART_STORAGE_KEY, &json)
                    .map_err(|e| e.to_string())
            });
        if let Err(error) = result {
            warn!(%error, "Failed to persist cart");
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore").finish_non_exhaustive()
    }
}

const fn notice_level(change: &CartChange) -> NoticeLevel {
    match change {
        CartChange::Added { .. } | CartChange::Merged { .. } => NoticeLevel::Success,
        CartChange::QuantityChanged { .. } | CartChange::Cleared | CartChange::Unchanged => {
            NoticeLevel::Info
        }
        CartChange::Removed { .. } => NoticeLevel::Error,
        CartChange::Refused(_) => NoticeLevel::Warning,
    }
}

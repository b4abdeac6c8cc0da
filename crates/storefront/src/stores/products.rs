//! Local product cache with CRUD against the `/products` resource.
//!
//! Under [`MutationPolicy::Strict`] a failed mutation is returned to the
//! caller and the cache is left alone. [`MutationPolicy::OfflineFallback`]
//! applies the mutation locally instead and records the product id in
//! [`ProductStoreState::diverged`]; nothing is replayed later.
//!
//! Toggles read the cached flag and write its negation. Two clients toggling
//! the same product race, and the last write wins.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use marketstall_core::{NewProduct, Product, ProductId, ProductPatch, ProductStats};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::error::{ApiError, Result};
use crate::http::ApiClient;
use crate::services::{CatalogService, ProductService};

/// What to do when a mutation request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationPolicy {
    /// Return the error and leave the cache untouched.
    #[default]
    Strict,
    /// Apply the change locally and mark the product as diverged.
    OfflineFallback,
}

#[derive(Debug, Clone, Default)]
pub struct ProductStoreState {
    pub products: Vec<Product>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: Option<Product>,
    /// Products whose cached state was never confirmed by the server.
    pub diverged: BTreeSet<ProductId>,
    /// Diverged products that were created locally and never reached the
    /// server.
    local_only: BTreeSet<ProductId>,
}

#[derive(Clone)]
pub struct ProductStore {
    inner: Arc<ProductStoreInner>,
}

struct ProductStoreInner {
    service: ProductService,
    catalog: Option<CatalogService>,
    policy: MutationPolicy,
    state: RwLock<ProductStoreState>,
}

impl ProductStore {
    #[must_use]
    pub fn new(client: ApiClient, policy: MutationPolicy) -> Self {
        Self {
            inner: Arc::new(ProductStoreInner {
                service: ProductService::new(client),
                catalog: None,
                policy,
                state: RwLock::new(ProductStoreState::default()),
            }),
        }
    }

    /// Also invalidate `catalog`'s detail cache on every mutation.
    #[must_use]
    pub fn with_catalog(client: ApiClient, policy: MutationPolicy, catalog: CatalogService) -> Self {
        Self {
            inner: Arc::new(ProductStoreInner {
                service: ProductService::new(client),
                catalog: Some(catalog),
                policy,
                state: RwLock::new(ProductStoreState::default()),
            }),
        }
    }

    #[must_use]
    pub fn policy(&self) -> MutationPolicy {
        self.inner.policy
    }

    pub async fn state(&self) -> ProductStoreState {
        self.inner.state.read().await.clone()
    }

    /// Load every product. Failures land in `error`.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        self.begin().await;
        let result = self.inner.service.list_all().await;

        let mut state = self.inner.state.write().await;
        state.loading = false;
        match result {
            Ok(products) => {
                debug!(count = products.len(), "Products loaded");
                state.products = products;
                state.diverged.clear();
                state.local_only.clear();
            }
            Err(e) => {
                warn!(error = %e, "Failed to load products");
                state.error = Some("Failed to load products".to_string());
            }
        }
    }

    /// # Errors
    ///
    /// Under the strict policy, the API error.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn add_product(&self, product: NewProduct) -> Result<Product> {
        self.begin().await;
        let result = self.inner.service.create(&product).await;

        let mut state = self.inner.state.write().await;
        state.loading = false;
        let created = match result {
            Ok(created) => created,
            Err(e) if self.fallback() => {
                warn!(error = %e, "API add product failed, using local state");
                let local = product.into_product(ProductId::new(uuid::Uuid::new_v4().to_string()), Utc::now());
                state.diverged.insert(local.id.clone());
                state.local_only.insert(local.id.clone());
                local
            }
            Err(e) => return Err(self.fail(&mut state, e, "Failed to add product")),
        };
        state.products.push(created.clone());
        Ok(created)
    }

    /// # Errors
    ///
    /// Under the strict policy, the API error. With the fallback, `NotFound`
    /// if the product is not cached either.
    #[instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update_product(&self, id: &ProductId, patch: &ProductPatch) -> Result<Product> {
        self.begin().await;
        let result = self.inner.service.update(id, patch).await;

        let mut state = self.inner.state.write().await;
        state.loading = false;
        let updated = match result {
            Ok(updated) => {
                state.diverged.remove(id);
                updated
            }
            Err(e) if self.fallback() => {
                warn!(error = %e, "API update product failed, using local state");
                let Some(mut local) = state.products.iter().find(|p| &p.id == id).cloned() else {
                    return Err(self.fail(&mut state, e, "Failed to update product"));
                };
                local.apply_patch(patch);
                local.updated_at = Some(Utc::now());
                state.diverged.insert(id.clone());
                local
            }
            Err(e) => return Err(self.fail(&mut state, e, "Failed to update product")),
        };

        if let Some(slot) = state.products.iter_mut().find(|p| &p.id == id) {
            *slot = updated.clone();
        }
        if state.selected.as_ref().is_some_and(|p| &p.id == id) {
            state.selected = Some(updated.clone());
        }
        drop(state);
        self.invalidate(id).await;
        Ok(updated)
    }

    /// # Errors
    ///
    /// Under the strict policy, the API error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<()> {
        self.begin().await;
        let result = self.inner.service.delete(id).await;

        let mut state = self.inner.state.write().await;
        state.loading = false;
        match result {
            Ok(()) => {
                state.diverged.remove(id);
                state.local_only.remove(id);
            }
            Err(e) if self.fallback() => {
                warn!(error = %e, "API delete product failed, using local state");
                if state.local_only.remove(id) {
                    state.diverged.remove(id);
                } else {
                    state.diverged.insert(id.clone());
                }
            }
            Err(e) => return Err(self.fail(&mut state, e, "Failed to delete product")),
        }
        state.products.retain(|p| &p.id != id);
        if state.selected.as_ref().is_some_and(|p| &p.id == id) {
            state.selected = None;
        }
        drop(state);
        self.invalidate(id).await;
        Ok(())
    }

    /// Flip `published`. `Ok(None)` if the product is not cached.
    ///
    /// # Errors
    ///
    /// As [`Self::update_product`].
    pub async fn toggle_published(&self, id: &ProductId) -> Result<Option<Product>> {
        let Some(current) = self.by_id(id).await else {
            return Ok(None);
        };
        self.update_product(id, &ProductPatch::published(!current.published))
            .await
            .map(Some)
    }

    /// Flip `featured`. `Ok(None)` if the product is not cached.
    ///
    /// # Errors
    ///
    /// As [`Self::update_product`].
    pub async fn toggle_featured(&self, id: &ProductId) -> Result<Option<Product>> {
        let Some(current) = self.by_id(id).await else {
            return Ok(None);
        };
        self.update_product(id, &ProductPatch::featured(!current.featured))
            .await
            .map(Some)
    }

    pub async fn select(&self, product: Option<Product>) {
        self.inner.state.write().await.selected = product;
    }

    pub async fn selected(&self) -> Option<Product> {
        self.inner.state.read().await.selected.clone()
    }

    pub async fn by_id(&self, id: &ProductId) -> Option<Product> {
        self.inner
            .state
            .read()
            .await
            .products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
    }

    pub async fn published(&self) -> Vec<Product> {
        self.filtered(|p| p.published).await
    }

    /// Featured and published.
    pub async fn featured(&self) -> Vec<Product> {
        self.filtered(|p| p.featured && p.published).await
    }

    /// Published products in `category` (exact name match).
    pub async fn by_category(&self, category: &str) -> Vec<Product> {
        self.filtered(|p| p.published && p.category == category).await
    }

    /// Published products whose name or description contains `query`.
    pub async fn search(&self, query: &str) -> Vec<Product> {
        self.filtered(|p| p.published && p.matches_query(query)).await
    }

    pub async fn stats(&self) -> ProductStats {
        ProductStats::from_products(&self.inner.state.read().await.products)
    }

    pub async fn reset(&self) {
        *self.inner.state.write().await = ProductStoreState::default();
    }

    async fn filtered(&self, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        self.inner
            .state
            .read()
            .await
            .products
            .iter()
            .filter(|p| keep(p))
            .cloned()
            .collect()
    }

    async fn begin(&self) {
        let mut state = self.inner.state.write().await;
        state.loading = true;
        state.error = None;
    }

    fn fallback(&self) -> bool {
        self.inner.policy == MutationPolicy::OfflineFallback
    }

    fn fail(&self, state: &mut ProductStoreState, error: ApiError, summary: &str) -> ApiError {
        warn!(error = %error, policy = ?self.inner.policy, "{summary}");
        state.error = Some(summary.to_string());
        error
    }

    async fn invalidate(&self, id: &ProductId) {
        if let Some(catalog) = &self.inner.catalog {
            catalog.invalidate(id).await;
        }
    }
}

impl std::fmt::Debug for ProductStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductStore")
            .field("policy", &self.inner.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marketstall_core::Money;

    use super::*;
    use crate::config::ClientConfig;
    use crate::session::StoredSession;
    use crate::storage::MemoryStorage;

    fn offline_client() -> ApiClient {
        let config = ClientConfig::new("http://127.0.0.1:9/api").unwrap();
        let session = StoredSession::new(Arc::new(MemoryStorage::new()), chrono::Duration::days(7));
        ApiClient::new(&config, Arc::new(session)).unwrap()
    }

    fn new_product(name: &str, category: &str, published: bool) -> NewProduct {
        NewProduct {
            sku: String::new(),
            name: name.to_string(),
            description: format!("{name} description"),
            category: category.to_string(),
            images: vec![],
            price: Money::from_cents(1999),
            quantity: 4,
            is_active: true,
            published,
            featured: false,
        }
    }

    #[tokio::test]
    async fn test_strict_failure_leaves_cache_untouched() {
        let store = ProductStore::new(offline_client(), MutationPolicy::Strict);
        let result = store.add_product(new_product("Lamp", "Home & Garden", true)).await;

        assert!(result.is_err());
        let state = store.state().await;
        assert!(state.products.is_empty());
        assert_eq!(state.error.as_deref(), Some("Failed to add product"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_fallback_applies_locally_and_tracks_divergence() {
        let store = ProductStore::new(offline_client(), MutationPolicy::OfflineFallback);
        let lamp = store.add_product(new_product("Lamp", "Home & Garden", true)).await.unwrap();
        assert!(lamp.created_at.is_some());
        assert!(store.state().await.diverged.contains(&lamp.id));

        let toggled = store.toggle_featured(&lamp.id).await.unwrap().unwrap();
        assert!(toggled.featured);
        assert_eq!(store.featured().await.len(), 1);

        store.delete_product(&lamp.id).await.unwrap();
        assert!(store.by_id(&lamp.id).await.is_none());
        assert!(!store.state().await.diverged.contains(&lamp.id));
    }

    #[tokio::test]
    async fn test_fallback_delete_of_server_product_stays_diverged() {
        let store = ProductStore::new(offline_client(), MutationPolicy::OfflineFallback);
        let id = ProductId::new("665f1c2e9b1d4a0012ab34cd");

        store.delete_product(&id).await.unwrap();
        assert!(store.state().await.diverged.contains(&id));
    }

    #[tokio::test]
    async fn test_toggle_missing_product_is_noop() {
        let store = ProductStore::new(offline_client(), MutationPolicy::Strict);
        assert!(store.toggle_published(&ProductId::new("ghost")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_getters_only_return_published() {
        let store = ProductStore::new(offline_client(), MutationPolicy::OfflineFallback);
        store.add_product(new_product("Desk Lamp", "Home & Garden", true)).await.unwrap();
        store.add_product(new_product("Draft Lamp", "Home & Garden", false)).await.unwrap();
        store.add_product(new_product("Headphones", "Electronics", true)).await.unwrap();

        assert_eq!(store.published().await.len(), 2);
        assert_eq!(store.by_category("Home & Garden").await.len(), 1);
        assert_eq!(store.search("LAMP").await.len(), 1);
        assert_eq!(store.stats().await.drafts, 1);

        store.reset().await;
        assert!(store.state().await.products.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_failure_is_captured() {
        let store = ProductStore::new(offline_client(), MutationPolicy::Strict);
        store.initialize().await;
        assert_eq!(store.state().await.error.as_deref(), Some("Failed to load products"));
    }
}

//! Storefront state shared across views.

use std::sync::Arc;

use thiserror::Error;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::ApiClient;
use crate::listing::{CATALOG_DEBOUNCE, ListController, ListOptions};
use crate::notify::Notifier;
use crate::services::CatalogService;
use crate::services::catalog::CATALOG_PAGE_SIZE;
use crate::session::{SessionStore, StoredSession};
use crate::storage::{FileStorage, Storage, StorageError};
use crate::stores::{
    AuthStore, CartStore, CategoryStore, CheckoutStore, MutationPolicy, OrdersStore, ProductStore,
};

/// Error assembling the storefront.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("state directory unavailable: {0}")]
    Storage(#[from] StorageError),
    #[error("API client: {0}")]
    Client(#[from] ApiError),
}

/// Every store and service a storefront view needs, wired to one client.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: ClientConfig,
    client: ApiClient,
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    auth: AuthStore,
    cart: CartStore,
    catalog: ListController<CatalogService>,
    products: ProductStore,
    orders: OrdersStore,
    categories: CategoryStore,
    checkout: CheckoutStore,
}

impl Storefront {
    /// Build on file storage under `config.state_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory cannot be created or the HTTP
    /// client cannot be built.
    pub fn open(config: ClientConfig, notifier: Arc<dyn Notifier>) -> Result<Self, StateError> {
        let storage = Arc::new(FileStorage::open(config.state_dir.clone())?);
        Ok(Self::new(config, storage, notifier, MutationPolicy::Strict)?)
    }

    /// Build on the given storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: ClientConfig,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
        policy: MutationPolicy,
    ) -> Result<Self, ApiError> {
        let session: Arc<dyn SessionStore> =
            Arc::new(StoredSession::new(Arc::clone(&storage), config.session_ttl));
        let client = ApiClient::new(&config, session)?;

        let catalog_service = CatalogService::new(client.clone());
        let catalog = ListController::new(
            catalog_service.clone(),
            ListOptions::new(CATALOG_PAGE_SIZE, CATALOG_DEBOUNCE),
        );

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                auth: AuthStore::new(client.clone()),
                cart: CartStore::load(Arc::clone(&storage), Arc::clone(&notifier)),
                products: ProductStore::with_catalog(client.clone(), policy, catalog_service),
                orders: OrdersStore::new(client.clone()),
                categories: CategoryStore::seeded(),
                checkout: CheckoutStore::new(client.clone(), Arc::clone(&notifier)),
                catalog,
                config,
                client,
                storage,
                notifier,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.inner.storage
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.inner.notifier
    }

    #[must_use]
    pub fn auth(&self) -> &AuthStore {
        &self.inner.auth
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// The public catalog list view.
    #[must_use]
    pub fn catalog(&self) -> &ListController<CatalogService> {
        &self.inner.catalog
    }

    #[must_use]
    pub fn products(&self) -> &ProductStore {
        &self.inner.products
    }

    #[must_use]
    pub fn orders(&self) -> &OrdersStore {
        &self.inner.orders
    }

    #[must_use]
    pub fn categories(&self) -> &CategoryStore {
        &self.inner.categories
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutStore {
        &self.inner.checkout
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_stores_share_one_session() {
        let config = ClientConfig::new("http://127.0.0.1:9/api").unwrap();
        let storefront = Storefront::new(
            config,
            Arc::new(MemoryStorage::new()),
            Arc::new(RecordingNotifier::new()),
            MutationPolicy::Strict,
        )
        .unwrap();

        storefront
            .client()
            .session()
            .set_token(secrecy::SecretString::from("tok"));
        assert!(storefront.client().session().is_authenticated());
        assert!(storefront.cart().is_empty().await);
        assert_eq!(storefront.categories().for_user().len(), 4);
    }
}

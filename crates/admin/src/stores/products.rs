//! Admin product list and mutations.
//!
//! Mutations return their error to the caller and also record it in
//! [`MutationFlags`] for views that render a banner. Rows in the list are
//! reconciled from the server's copy after each successful mutation, and the
//! storefront's product-detail cache entry is dropped when one is attached.

use std::path::Path;
use std::sync::Arc;

use marketstall_core::{Product, ProductId};
use marketstall_storefront::http::ApiClient;
use marketstall_storefront::listing::{CATALOG_DEBOUNCE, ListController, ListOptions};
use marketstall_storefront::notify::{Notice, NoticeLevel, Notifier};
use marketstall_storefront::Result;
use marketstall_storefront::services::CatalogService;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::error::AdminError;
use crate::services::{AdminProductService, ImageUpload, ProductUpload};

/// Admin product list page size.
pub const ADMIN_PRODUCTS_PAGE_SIZE: u32 = 20;

/// State of the last mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationFlags {
    pub loading: bool,
    pub error: Option<String>,
    pub success: bool,
}

#[derive(Clone)]
pub struct AdminProductStore {
    inner: Arc<AdminProductStoreInner>,
}

struct AdminProductStoreInner {
    list: ListController<AdminProductService>,
    flags: RwLock<MutationFlags>,
    notifier: Arc<dyn Notifier>,
    catalog: Option<CatalogService>,
}

impl AdminProductStore {
    #[must_use]
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self::build(client, notifier, None)
    }

    /// Also evict `catalog`'s cached copy of every product this store
    /// changes.
    #[must_use]
    pub fn with_catalog(
        client: ApiClient,
        notifier: Arc<dyn Notifier>,
        catalog: CatalogService,
    ) -> Self {
        Self::build(client, notifier, Some(catalog))
    }

    fn build(client: ApiClient, notifier: Arc<dyn Notifier>, catalog: Option<CatalogService>) -> Self {
        Self {
            inner: Arc::new(AdminProductStoreInner {
                list: ListController::new(
                    AdminProductService::new(client),
                    ListOptions::new(ADMIN_PRODUCTS_PAGE_SIZE, CATALOG_DEBOUNCE),
                ),
                flags: RwLock::new(MutationFlags::default()),
                notifier,
                catalog,
            }),
        }
    }

    /// The product list (search, category filter, pagination).
    #[must_use]
    pub fn list(&self) -> &ListController<AdminProductService> {
        &self.inner.list
    }

    pub async fn flags(&self) -> MutationFlags {
        self.inner.flags.read().await.clone()
    }

    fn service(&self) -> &AdminProductService {
        self.inner.list.source()
    }

    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self, upload))]
    pub async fn create_product(&self, upload: ProductUpload) -> Result<Product> {
        self.begin().await;
        let result = self.service().create(upload).await;
        let product = self.finish(result, "Failed to create product").await?;
        self.success(format!("Product {} created successfully!", product.name));
        Ok(product)
    }

    /// Read `image_paths` from disk, then create the product.
    ///
    /// # Errors
    ///
    /// `AdminError::Upload` if an image cannot be read (nothing is sent),
    /// otherwise the API error.
    pub async fn create_product_with_images(
        &self,
        upload: ProductUpload,
        image_paths: &[impl AsRef<Path>],
    ) -> std::result::Result<Product, AdminError> {
        let images = read_images(image_paths).await?;
        Ok(self.create_product(upload.with_images(images)).await?)
    }

    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self, upload), fields(product_id = %id))]
    pub async fn update_product(&self, id: &ProductId, upload: ProductUpload) -> Result<Product> {
        self.begin().await;
        let result = self.service().update(id, upload).await;
        let product = self.finish(result, "Failed to update product").await?;
        self.reconcile(&product).await;
        self.invalidate(id).await;
        self.success("Product updated successfully!");
        Ok(product)
    }

    /// # Errors
    ///
    /// `AdminError::Upload` if an image cannot be read, otherwise the API
    /// error.
    pub async fn update_product_with_images(
        &self,
        id: &ProductId,
        upload: ProductUpload,
        image_paths: &[impl AsRef<Path>],
    ) -> std::result::Result<Product, AdminError> {
        let images = read_images(image_paths).await?;
        Ok(self.update_product(id, upload.with_images(images)).await?)
    }

    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<()> {
        self.begin().await;
        let result = self.service().delete(id).await;
        self.finish(result, "Failed to delete product").await?;
        self.inner.list.remove_items(|p| &p.id == id).await;
        self.invalidate(id).await;
        self.success("Product deleted successfully!");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_image(&self, id: &ProductId, image_url: &str) -> Result<Option<Product>> {
        self.begin().await;
        let result = self.service().delete_image(id, image_url).await;
        let product = self.finish(result, "Failed to delete image").await?;
        if let Some(product) = &product {
            self.reconcile(product).await;
        }
        self.invalidate(id).await;
        self.success("Image deleted successfully!");
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns the API error.
    pub async fn set_published(&self, id: &ProductId, published: bool) -> Result<Product> {
        let product = self
            .update_quiet(id, ProductUpload::published(published))
            .await?;
        self.success(if published {
            "Product published successfully!"
        } else {
            "Product unpublished successfully!"
        });
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns the API error.
    pub async fn set_featured(&self, id: &ProductId, featured: bool) -> Result<Product> {
        let product = self
            .update_quiet(id, ProductUpload::featured(featured))
            .await?;
        self.success(if featured {
            "Product featured successfully!"
        } else {
            "Product unfeatured successfully!"
        });
        Ok(product)
    }

    async fn update_quiet(&self, id: &ProductId, upload: ProductUpload) -> Result<Product> {
        self.begin().await;
        let result = self.service().update(id, upload).await;
        let product = self.finish(result, "Failed to update product").await?;
        self.reconcile(&product).await;
        self.invalidate(id).await;
        Ok(product)
    }

    async fn invalidate(&self, id: &ProductId) {
        if let Some(catalog) = &self.inner.catalog {
            catalog.invalidate(id).await;
        }
    }

    async fn reconcile(&self, product: &Product) {
        self.inner
            .list
            .replace_item(|row| row.id == product.id, product.clone())
            .await;
    }

    async fn begin(&self) {
        *self.inner.flags.write().await = MutationFlags {
            loading: true,
            error: None,
            success: false,
        };
    }

    async fn finish<T>(&self, result: Result<T>, fallback: &str) -> Result<T> {
        let mut flags = self.inner.flags.write().await;
        flags.loading = false;
        match result {
            Ok(value) => {
                flags.success = true;
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, "{fallback}");
                let message = e.user_message();
                flags.error = Some(if message.is_empty() {
                    fallback.to_string()
                } else {
                    message.clone()
                });
                self.inner
                    .notifier
                    .notify(Notice::new(NoticeLevel::Error, fallback).with_detail(message));
                Err(e)
            }
        }
    }

    fn success(&self, title: impl Into<String>) {
        let title = title.into();
        info!("{title}");
        self.inner.notifier.notify(Notice::new(NoticeLevel::Success, title));
    }
}

async fn read_images(paths: &[impl AsRef<Path>]) -> std::result::Result<Vec<ImageUpload>, AdminError> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let image = ImageUpload::from_path(path)
            .await
            .map_err(|source| AdminError::Upload {
                path: path.display().to_string(),
                source,
            })?;
        images.push(image);
    }
    Ok(images)
}

impl std::fmt::Debug for AdminProductStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminProductStore").finish_non_exhaustive()
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

    fn offline_client() -> ApiClient {
        let config = ClientConfig::new("http://127.0.0.1:9/api").unwrap();
        let session = StoredSession::new(Arc::new(MemoryStorage::new()), chrono::Duration::days(7));
        ApiClient::new(&config, Arc::new(session)).unwrap()
    }

    #[tokio::test]
    async fn test_failed_mutation_sets_flags_and_returns_error() {
        let notifier = Arc::new(RecordingNotifier::new());
        let store = AdminProductStore::new(offline_client(), notifier.clone());

        let result = store.set_published(&ProductId::new("p1"), true).await;
        assert!(result.is_err());

        let flags = store.flags().await;
        assert!(!flags.loading);
        assert!(!flags.success);
        assert!(flags.error.is_some());
        assert_eq!(notifier.notices()[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_unreadable_image_is_reported_before_upload() {
        let store = AdminProductStore::new(offline_client(), Arc::new(RecordingNotifier::new()));
        let err = store
            .create_product_with_images(ProductUpload::default(), &["/nonexistent/lamp.jpg"])
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Upload { .. }));
        assert!(!store.flags().await.loading);
    }
}

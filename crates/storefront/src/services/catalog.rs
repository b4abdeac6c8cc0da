//! Public product catalog.
//!
//! Listing goes straight to the API; product detail responses are cached
//! with `moka` for a minute and invalidated when the client mutates the
//! product.

use std::time::Duration;

use marketstall_core::{Money, Page, Product, ProductId};
use moka::future::Cache;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::http::{ApiClient, ApiEnvelope, segment};
use crate::listing::{ListQuery, ListSource};

/// Catalog page size.
pub const CATALOG_PAGE_SIZE: u32 = 24;

const DETAIL_CACHE_TTL: Duration = Duration::from_secs(60);

/// Filters beyond page/limit/search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Category slug.
    pub category: Option<String>,
    pub sort: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
}

impl CatalogFilter {
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(sort) = &self.sort {
            params.push(("sort", sort.clone()));
        }
        if let Some(min) = self.min_price {
            params.push(("minPrice", min.amount().to_string()));
        }
        if let Some(max) = self.max_price {
            params.push(("maxPrice", max.amount().to_string()));
        }
        params
    }
}

/// `data` of a product listing response.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductListData {
    pub products: Vec<Product>,
    pub pagination: ProductPagination,
    #[serde(default)]
    pub filters: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_products: u64,
    pub products_per_page: u32,
}

impl ProductListData {
    #[must_use]
    pub fn into_page(self) -> Page<Product> {
        Page {
            items: self.products,
            current_page: self.pagination.current_page,
            total_pages: self.pagination.total_pages,
            total: self.pagination.total_products,
            limit: self.pagination.products_per_page,
        }
    }
}

/// `data` of a single-product response.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductData {
    pub product: Product,
}

/// Read-only catalog endpoints.
#[derive(Clone)]
pub struct CatalogService {
    client: ApiClient,
    cache: Cache<ProductId, Product>,
}

impl CatalogService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(DETAIL_CACHE_TTL)
            .build();
        Self { client, cache }
    }

    /// `GET /products`.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ListQuery<CatalogFilter>) -> Result<Page<Product>> {
        let mut params = query.base_params();
        params.extend(query.filter.params());
        let response: ApiEnvelope<ProductListData> = self.client.get("/products", &params).await?;
        Ok(response.data.into_page())
    }

    /// `GET /products/:id`, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids, or the API error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product> {
        if let Some(product) = self.cache.get(id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let path = format!("/products/{}", segment(id.as_str()));
        let response: ApiEnvelope<ProductData> = self.client.get(&path, &[]).await?;
        let product = response.data.product;

        self.cache.insert(id.clone(), product.clone()).await;
        Ok(product)
    }

    /// Drop a cached product after a local mutation.
    pub async fn invalidate(&self, id: &ProductId) {
        self.cache.invalidate(id).await;
    }
}

impl ListSource for CatalogService {
    type Item = Product;
    type Filter = CatalogFilter;

    async fn fetch(&self, query: &ListQuery<CatalogFilter>) -> Result<Page<Product>> {
        self.list_products(query).await
    }
}

//! Product CRUD on the public `/products` resource.
//!
//! Used by the product store. Responses come either bare or wrapped in the
//! usual envelope; both are accepted.

use marketstall_core::{NewProduct, Product, ProductId, ProductPatch};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::http::{ApiClient, ApiEnvelope, segment};
use crate::services::catalog::{ProductData, ProductListData};

#[derive(Deserialize)]
#[serde(untagged)]
enum ProductsResponse {
    Bare(Vec<Product>),
    Listing(ApiEnvelope<ProductListData>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProductResponse {
    Bare(Product),
    Wrapped(ApiEnvelope<ProductData>),
}

impl ProductResponse {
    fn into_product(self) -> Product {
        match self {
            Self::Bare(product) => product,
            Self::Wrapped(envelope) => envelope.data.product,
        }
    }
}

#[derive(Clone)]
pub struct ProductService {
    client: ApiClient,
}

impl ProductService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /products` (first page, as returned by the API).
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Product>> {
        let response: ProductsResponse = self.client.get("/products", &[]).await?;
        Ok(match response {
            ProductsResponse::Bare(products) => products,
            ProductsResponse::Listing(envelope) => envelope.data.products,
        })
    }

    /// `POST /products`.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create(&self, product: &NewProduct) -> Result<Product> {
        let response: ProductResponse = self.client.post("/products", product).await?;
        Ok(response.into_product())
    }

    /// `PUT /products/:id` with a partial body.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update(&self, id: &ProductId, patch: &ProductPatch) -> Result<Product> {
        let path = format!("/products/{}", segment(id.as_str()));
        let response: ProductResponse = self.client.put(&path, patch).await?;
        Ok(response.into_product())
    }

    /// `DELETE /products/:id`.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: &ProductId) -> Result<()> {
        let path = format!("/products/{}", segment(id.as_str()));
        let _: serde_json::Value = self.client.delete(&path).await?;
        Ok(())
    }
}

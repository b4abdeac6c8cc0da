//! Admin product management.
//!
//! Create and update go out as `multipart/form-data`: new images under the
//! repeated `files` field (at most [`MAX_IMAGES_PER_REQUEST`]), every other
//! field as a text part. Fields left as `None` are not sent.

use std::path::Path;

use marketstall_core::{Money, Page, Product, ProductId, ValidProductForm};
use marketstall_storefront::http::{ApiClient, ApiEnvelope, segment};
use marketstall_storefront::listing::{ListQuery, ListSource};
use marketstall_storefront::services::{ProductData, ProductListData};
use marketstall_storefront::{ApiError, Result};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::{instrument, warn};

/// The API accepts at most this many images per create/update request.
pub const MAX_IMAGES_PER_REQUEST: usize = 5;

/// Filters for the admin product list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminProductFilter {
    /// Category slug; `None` means all.
    pub category: Option<String>,
}

/// An image file to upload.
#[derive(Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Read an image from disk, guessing the content type from the
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        let content_type = match path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            _ => "application/octet-stream",
        };
        Ok(Self {
            file_name,
            content_type: content_type.to_string(),
            bytes,
        })
    }

    fn into_part(self) -> Result<Part> {
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)
            .map_err(|e| ApiError::Decode(format!("invalid image content type: {e}")))
    }
}

/// Fields for a create or update request.
#[derive(Debug, Clone, Default)]
pub struct ProductUpload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Money>,
    pub quantity: Option<u32>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
    /// New images only; existing ones stay attached server-side.
    pub images: Vec<ImageUpload>,
}

impl ProductUpload {
    /// Everything from a validated form.
    #[must_use]
    pub fn from_form(form: ValidProductForm, published: bool, featured: bool) -> Self {
        Self {
            name: Some(form.name),
            description: Some(form.description),
            category: Some(form.category),
            price: Some(form.price),
            quantity: Some(form.quantity),
            published: Some(published),
            featured: Some(featured),
            images: Vec::new(),
        }
    }

    #[must_use]
    pub fn published(published: bool) -> Self {
        Self {
            published: Some(published),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn featured(featured: bool) -> Self {
        Self {
            featured: Some(featured),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_images(mut self, images: Vec<ImageUpload>) -> Self {
        self.images = images;
        self
    }

    /// Non-file fields as `(name, value)` text parts, in a stable order.
    #[must_use]
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(name) = &self.name {
            fields.push(("name", name.clone()));
        }
        if let Some(description) = &self.description {
            fields.push(("description", description.clone()));
        }
        if let Some(category) = &self.category {
            fields.push(("category", category.clone()));
        }
        if let Some(price) = self.price {
            fields.push(("price", price.amount().to_string()));
        }
        if let Some(quantity) = self.quantity {
            fields.push(("quantity", quantity.to_string()));
        }
        if let Some(published) = self.published {
            fields.push(("published", published.to_string()));
        }
        if let Some(featured) = self.featured {
            fields.push(("featured", featured.to_string()));
        }
        fields
    }

    fn into_form(self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in self.text_fields() {
            form = form.text(name, value);
        }
        if self.images.len() > MAX_IMAGES_PER_REQUEST {
            warn!(
                given = self.images.len(),
                max = MAX_IMAGES_PER_REQUEST,
                "Too many images, extra files dropped"
            );
        }
        for image in self.images.into_iter().take(MAX_IMAGES_PER_REQUEST) {
            form = form.part("files", image.into_part()?);
        }
        Ok(form)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteImageBody<'a> {
    image_url: &'a str,
}

/// `/admin/products` endpoints.
#[derive(Clone)]
pub struct AdminProductService {
    client: ApiClient,
}

impl AdminProductService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /admin/products`.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &ListQuery<AdminProductFilter>) -> Result<Page<Product>> {
        let mut params = query.base_params();
        if let Some(category) = &query.filter.category {
            params.push(("category", category.clone()));
        }
        let response: ApiEnvelope<ProductListData> =
            self.client.get("/admin/products", &params).await?;
        Ok(response.data.into_page())
    }

    /// `GET /admin/products/:id`.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: &ProductId) -> Result<Product> {
        let response: ApiEnvelope<ProductData> =
            self.client.get(&product_path(id), &[]).await?;
        Ok(response.data.product)
    }

    /// `POST /admin/products` (multipart).
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self, upload), fields(images = upload.images.len()))]
    pub async fn create(&self, upload: ProductUpload) -> Result<Product> {
        let response: ApiEnvelope<ProductData> = self
            .client
            .multipart(Method::POST, "/admin/products", upload.into_form()?)
            .await?;
        Ok(response.data.product)
    }

    /// `PUT /admin/products/:id` (multipart).
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self, upload), fields(product_id = %id, images = upload.images.len()))]
    pub async fn update(&self, id: &ProductId, upload: ProductUpload) -> Result<Product> {
        let response: ApiEnvelope<ProductData> = self
            .client
            .multipart(Method::PUT, &product_path(id), upload.into_form()?)
            .await?;
        Ok(response.data.product)
    }

    /// `DELETE /admin/products/:id`.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: &ProductId) -> Result<()> {
        let _: serde_json::Value = self.client.delete(&product_path(id)).await?;
        Ok(())
    }

    /// `DELETE /admin/products/:id/images` with `{imageUrl}`.
    ///
    /// Returns the updated product when the API includes it.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_image(&self, id: &ProductId, image_url: &str) -> Result<Option<Product>> {
        let path = format!("{}/images", product_path(id));
        let response: serde_json::Value = self
            .client
            .delete_with_body(&path, &DeleteImageBody { image_url })
            .await?;
        Ok(response
            .get("data")
            .and_then(|data| serde_json::from_value::<ProductData>(data.clone()).ok())
            .map(|data| data.product))
    }
}

fn product_path(id: &ProductId) -> String {
    format!("/admin/products/{}", segment(id.as_str()))
}

impl ListSource for AdminProductService {
    type Item = Product;
    type Filter = AdminProductFilter;

    async fn fetch(&self, query: &ListQuery<AdminProductFilter>) -> Result<Page<Product>> {
        self.list(query).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_text_fields_skip_unset() {
        let upload = ProductUpload::published(true);
        assert_eq!(upload.text_fields(), vec![("published", "true".to_string())]);
    }

    #[test]
    fn test_text_fields_from_form() {
        let form = ValidProductForm {
            name: "Desk Lamp".to_string(),
            description: "Warm light for late nights".to_string(),
            category: "Home & Garden".to_string(),
            price: Money::from_cents(4999),
            quantity: 12,
        };
        let fields = ProductUpload::from_form(form, false, true).text_fields();
        let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            ["name", "description", "category", "price", "quantity", "published", "featured"]
        );
        assert_eq!(fields[3].1, "49.99");
    }

    #[tokio::test]
    async fn test_image_from_path_guesses_type() {
        let dir = std::env::temp_dir().join(format!("mstall-img-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("lamp.PNG");
        tokio::fs::write(&path, b"\x89PNG").await.unwrap();

        let image = ImageUpload::from_path(&path).await.unwrap();
        assert_eq!(image.file_name, "lamp.PNG");
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.bytes.len(), 4);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[test]
    fn test_form_accepts_more_than_max_images() {
        let images = (0..7)
            .map(|i| ImageUpload {
                file_name: format!("{i}.jpg"),
                content_type: "image/jpeg".to_string(),
                bytes: vec![0],
            })
            .collect();
        assert!(ProductUpload::default().with_images(images).into_form().is_ok());
    }
}

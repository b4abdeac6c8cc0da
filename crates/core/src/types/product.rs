//! Catalog product types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::money::Money;

/// Stock level at or below which a product counts as "low stock".
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// A catalog product as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Ordered image URLs; the first is the primary image.
    #[serde(default)]
    pub images: Vec<String>,
    pub price: Money,
    /// Units in stock.
    pub quantity: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

const fn default_true() -> bool {
    true
}

impl Product {
    /// Whether the product can be added to a cart.
    ///
    /// Out-of-stock products are unavailable regardless of the
    /// published/featured flags.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.quantity > 0
    }

    /// Primary image URL, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Case-insensitive match against name and description.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }

    /// Apply a partial update in place.
    pub fn apply_patch(&mut self, patch: &ProductPatch) {
        if let Some(sku) = &patch.sku {
            self.sku.clone_from(sku);
        }
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(category) = &patch.category {
            self.category.clone_from(category);
        }
        if let Some(images) = &patch.images {
            self.images.clone_from(images);
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(published) = patch.published {
            self.published = published;
        }
        if let Some(featured) = patch.featured {
            self.featured = featured;
        }
    }
}

/// Fields for creating a product; the API assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub images: Vec<String>,
    pub price: Money,
    pub quantity: u32,
    pub is_active: bool,
    pub published: bool,
    pub featured: bool,
}

impl NewProduct {
    /// Materialize into a product with the given id and timestamps.
    #[must_use]
    pub fn into_product(self, id: ProductId, now: DateTime<Utc>) -> Product {
        Product {
            id,
            sku: self.sku,
            name: self.name,
            description: self.description,
            category: self.category,
            images: self.images,
            price: self.price,
            quantity: self.quantity,
            is_active: self.is_active,
            published: self.published,
            featured: self.featured,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// Partial product update. Absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

impl ProductPatch {
    /// Patch that only sets `published`.
    #[must_use]
    pub fn published(published: bool) -> Self {
        Self {
            published: Some(published),
            ..Self::default()
        }
    }

    /// Patch that only sets `featured`.
    #[must_use]
    pub fn featured(featured: bool) -> Self {
        Self {
            featured: Some(featured),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Aggregate counts over a set of products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total: usize,
    pub published: usize,
    pub drafts: usize,
    pub featured: usize,
    pub out_of_stock: usize,
    pub low_stock: usize,
}

impl ProductStats {
    /// Compute stats over a slice of products.
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        products.iter().fold(Self::default(), |mut stats, product| {
            stats.total += 1;
            if product.published {
                stats.published += 1;
            } else {
                stats.drafts += 1;
            }
            if product.featured {
                stats.featured += 1;
            }
            if product.quantity == 0 {
                stats.out_of_stock += 1;
            } else if product.quantity <= LOW_STOCK_THRESHOLD {
                stats.low_stock += 1;
            }
            stats
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, quantity: u32, published: bool) -> Product {
        Product {
            id: ProductId::new(id),
            sku: format!("SKU-{id}"),
            name: format!("Product {id}"),
            description: "A thing".to_string(),
            category: "Electronics".to_string(),
            images: vec![],
            price: Money::from_cents(1000),
            quantity,
            is_active: true,
            published,
            featured: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_deserialize_api_product() {
        let json = r#"{
            "id": "p1",
            "sku": "HP-01",
            "name": "Wireless Headphones",
            "description": "Noise cancelling",
            "price": 25,
            "quantity": 3,
            "isActive": true,
            "published": true,
            "featured": false,
            "category": "Electronics",
            "images": ["https://cdn.example/a.jpg"],
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-02T10:00:00Z"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, Money::from_cents(2500));
        assert_eq!(product.primary_image(), Some("https://cdn.example/a.jpg"));
        assert!(product.is_available());
    }

    #[test]
    fn test_zero_stock_is_unavailable_even_if_featured() {
        let mut p = product("p1", 0, true);
        p.featured = true;
        assert!(!p.is_available());
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let json = serde_json::to_value(ProductPatch::published(false)).unwrap();
        assert_eq!(json, serde_json::json!({ "published": false }));
    }

    #[test]
    fn test_apply_patch() {
        let mut p = product("p1", 5, false);
        p.apply_patch(&ProductPatch {
            name: Some("Renamed".to_string()),
            featured: Some(true),
            ..ProductPatch::default()
        });
        assert_eq!(p.name, "Renamed");
        assert!(p.featured);
        assert_eq!(p.quantity, 5);
    }

    #[test]
    fn test_stats() {
        let products = vec![
            product("a", 0, true),
            product("b", 4, false),
            product("c", 50, true),
        ];
        let stats = ProductStats::from_products(&products);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.published, 2);
        assert_eq!(stats.drafts, 1);
        assert_eq!(stats.out_of_stock, 1);
        assert_eq!(stats.low_stock, 1);
    }
}

//! Product categories.
//!
//! Categories are a static, client-side catalog. Products reference them by
//! display name; URLs and filters use the slug.

use serde::{Deserialize, Serialize};

use super::product::Product;

/// Color token used when a category name is unknown.
pub const DEFAULT_CATEGORY_COLOR: &str = "bg-gray-500";

/// Legacy display-name to slug table.
const NAME_TO_SLUG: [(&str, &str); 6] = [
    ("Electronics", "electronics"),
    ("Clothing", "clothing"),
    ("Home & Garden", "home-garden"),
    ("Accessories", "accessories"),
    ("Sports & Outdoors", "sports-outdoors"),
    ("Books & Media", "books-media"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub product_count: u32,
    pub is_active: bool,
    pub sort_order: u32,
}

impl Category {
    fn seed(
        slug: &str,
        name: &str,
        description: &str,
        color: &str,
        product_count: u32,
        is_active: bool,
        sort_order: u32,
    ) -> Self {
        Self {
            id: slug.to_string(),
            slug: slug.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            color: color.to_string(),
            product_count,
            is_active,
            sort_order,
        }
    }
}

/// Partial category update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub product_count: Option<u32>,
    pub is_active: Option<bool>,
    pub sort_order: Option<u32>,
}

/// The in-memory category list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
}

impl CategoryCatalog {
    /// The built-in category list: four active categories plus two
    /// inactive ones reserved for later.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            categories: vec![
                Category::seed("electronics", "Electronics", "Latest gadgets and electronic devices", "bg-blue-500", 3, true, 1),
                Category::seed("clothing", "Clothing", "Fashion and apparel for all occasions", "bg-purple-500", 1, true, 2),
                Category::seed("home-garden", "Home & Garden", "Everything for your home and outdoor space", "bg-green-500", 1, true, 3),
                Category::seed("accessories", "Accessories", "Essential accessories and lifestyle products", "bg-orange-500", 1, true, 4),
                Category::seed("sports-outdoors", "Sports & Outdoors", "Equipment and gear for active lifestyles", "bg-red-500", 0, false, 5),
                Category::seed("books-media", "Books & Media", "Books, movies, and digital content", "bg-indigo-500", 0, false, 6),
            ],
        }
    }

    #[must_use]
    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn get_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    fn get_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Active categories in list order.
    #[must_use]
    pub fn active(&self) -> Vec<&Category> {
        self.categories.iter().filter(|c| c.is_active).collect()
    }

    /// Every category, sorted by `sort_order`.
    #[must_use]
    pub fn for_admin(&self) -> Vec<&Category> {
        let mut all: Vec<&Category> = self.categories.iter().collect();
        all.sort_by_key(|c| c.sort_order);
        all
    }

    /// Active categories that have products, sorted by `sort_order`.
    #[must_use]
    pub fn for_user(&self) -> Vec<&Category> {
        let mut visible: Vec<&Category> = self
            .categories
            .iter()
            .filter(|c| c.is_active && c.product_count > 0)
            .collect();
        visible.sort_by_key(|c| c.sort_order);
        visible
    }

    /// Display name for a product's category; unknown names pass through.
    #[must_use]
    pub fn display_name(&self, name: &str) -> String {
        self.get_by_name(name)
            .map_or_else(|| name.to_string(), |c| c.name.clone())
    }

    /// Color token for a category name.
    #[must_use]
    pub fn color(&self, name: &str) -> &str {
        self.get_by_name(name)
            .map_or(DEFAULT_CATEGORY_COLOR, |c| c.color.as_str())
    }

    /// Map a display name to its slug.
    ///
    /// Known names use the fixed table; anything else is lowercased with
    /// each run of whitespace replaced by a single `-`.
    #[must_use]
    pub fn normalize_name(name: &str) -> String {
        if let Some((_, slug)) = NAME_TO_SLUG.iter().find(|(n, _)| *n == name) {
            return (*slug).to_string();
        }

        let mut slug = String::with_capacity(name.len());
        let mut in_space = false;
        for ch in name.chars() {
            if ch.is_whitespace() {
                if !in_space {
                    slug.push('-');
                }
                in_space = true;
            } else {
                slug.extend(ch.to_lowercase());
                in_space = false;
            }
        }
        slug
    }

    /// Insert a category. Its id is forced to its slug and the list stays
    /// sorted by `sort_order`.
    pub fn add(&mut self, mut category: Category) {
        category.id.clone_from(&category.slug);
        self.categories.push(category);
        self.categories.sort_by_key(|c| c.sort_order);
    }

    /// Apply a partial update. Returns `false` if no category has `id`.
    pub fn update(&mut self, id: &str, update: CategoryUpdate) -> bool {
        let Some(category) = self.categories.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        if let Some(name) = update.name {
            category.name = name;
        }
        if let Some(slug) = update.slug {
            category.slug = slug;
        }
        if let Some(description) = update.description {
            category.description = description;
        }
        if let Some(color) = update.color {
            category.color = color;
        }
        if let Some(count) = update.product_count {
            category.product_count = count;
        }
        if let Some(active) = update.is_active {
            category.is_active = active;
        }
        if let Some(order) = update.sort_order {
            category.sort_order = order;
        }
        true
    }

    /// Remove a category. Returns `false` if it was not present.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c.id != id);
        self.categories.len() != before
    }

    /// Flip `is_active`, returning the new value.
    pub fn toggle_active(&mut self, id: &str) -> Option<bool> {
        let category = self.categories.iter_mut().find(|c| c.id == id)?;
        category.is_active = !category.is_active;
        Some(category.is_active)
    }

    pub fn update_product_count(&mut self, id: &str, count: u32) -> bool {
        self.update(
            id,
            CategoryUpdate {
                product_count: Some(count),
                ..CategoryUpdate::default()
            },
        )
    }

    /// Recount products per category by display name.
    pub fn refresh_product_counts(&mut self, products: &[Product]) {
        for category in &mut self.categories {
            let count = products
                .iter()
                .filter(|p| p.category == category.name)
                .count();
            category.product_count = u32::try_from(count).unwrap_or(u32::MAX);
        }
    }

    /// Drop every category.
    pub fn clear(&mut self) {
        self.categories.clear();
    }
}

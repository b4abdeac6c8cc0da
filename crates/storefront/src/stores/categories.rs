//! Category list shared by the catalog filters and the admin screens.
//!
//! Purely local: there is no category endpoint. Reads return owned copies so
//! no lock is held by callers.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use marketstall_core::{Category, CategoryCatalog, CategoryUpdate, Product};

#[derive(Debug, Clone)]
pub struct CategoryStore {
    catalog: Arc<RwLock<CategoryCatalog>>,
}

impl Default for CategoryStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl CategoryStore {
    /// A store holding the built-in categories.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            catalog: Arc::new(RwLock::new(CategoryCatalog::seeded())),
        }
    }

    /// Restore the built-in categories.
    pub fn initialize(&self) {
        *self.write() = CategoryCatalog::seeded();
    }

    /// Empty the list.
    pub fn reset(&self) {
        self.write().clear();
    }

    #[must_use]
    pub fn all(&self) -> Vec<Category> {
        self.read().all().to_vec()
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<Category> {
        self.read().get_by_id(id).cloned()
    }

    #[must_use]
    pub fn get_by_slug(&self, slug: &str) -> Option<Category> {
        self.read().get_by_slug(slug).cloned()
    }

    #[must_use]
    pub fn active(&self) -> Vec<Category> {
        self.read().active().into_iter().cloned().collect()
    }

    #[must_use]
    pub fn for_admin(&self) -> Vec<Category> {
        self.read().for_admin().into_iter().cloned().collect()
    }

    #[must_use]
    pub fn for_user(&self) -> Vec<Category> {
        self.read().for_user().into_iter().cloned().collect()
    }

    #[must_use]
    pub fn display_name(&self, name: &str) -> String {
        self.read().display_name(name)
    }

    #[must_use]
    pub fn color(&self, name: &str) -> String {
        self.read().color(name).to_string()
    }

    #[must_use]
    pub fn normalize_name(name: &str) -> String {
        CategoryCatalog::normalize_name(name)
    }

    pub fn add(&self, category: Category) {
        self.write().add(category);
    }

    pub fn update(&self, id: &str, update: CategoryUpdate) -> bool {
        self.write().update(id, update)
    }

    pub fn delete(&self, id: &str) -> bool {
        self.write().delete(id)
    }

    pub fn toggle_active(&self, id: &str) -> Option<bool> {
        self.write().toggle_active(id)
    }

    pub fn update_product_count(&self, id: &str, count: u32) -> bool {
        self.write().update_product_count(id, count)
    }

    pub fn refresh_product_counts(&self, products: &[Product]) {
        self.write().refresh_product_counts(products);
    }

    fn read(&self) -> RwLockReadGuard<'_, CategoryCatalog> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CategoryCatalog> {
        self.catalog.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_view_hides_inactive_and_empty() {
        let store = CategoryStore::seeded();
        let names: Vec<String> = store.for_user().into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["Electronics", "Clothing", "Home & Garden", "Accessories"]);
        assert_eq!(store.for_admin().len(), 6);
    }

    #[test]
    fn test_toggle_and_count_make_category_visible() {
        let store = CategoryStore::seeded();
        assert_eq!(store.toggle_active("books-media"), Some(true));
        assert!(store.update_product_count("books-media", 2));
        assert_eq!(store.for_user().len(), 5);
        assert_eq!(store.toggle_active("missing"), None);
    }

    #[test]
    fn test_reset_then_initialize() {
        let store = CategoryStore::seeded();
        store.reset();
        assert!(store.all().is_empty());
        assert_eq!(store.color("Electronics"), "bg-gray-500");
        store.initialize();
        assert_eq!(store.color("Electronics"), "bg-blue-500");
        assert_eq!(CategoryStore::normalize_name("Home & Garden"), "home-garden");
    }
}

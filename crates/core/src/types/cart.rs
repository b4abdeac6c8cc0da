//! The shopping cart aggregate.
//!
//! `Cart` keeps its derived `item_count` and `total` private and recomputes
//! them after every mutation, so they can never drift from the lines. Every
//! line satisfies `1 <= quantity <= product.quantity` (stock at insertion).

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::id::{CartItemId, ProductId};
use super::money::Money;
use super::product::Product;

/// One cart line: a product snapshot and a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.product.price * self.quantity
    }
}

/// Why an add was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartRefusal {
    OutOfStock { name: String },
    ZeroQuantity { name: String },
}

/// Outcome of a cart mutation, used to drive user notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    /// A new line was appended.
    Added { name: String, quantity: u32 },
    /// An add merged into the existing line for the same product.
    Merged { name: String, quantity: u32 },
    /// An explicit quantity update changed the line.
    QuantityChanged { name: String, quantity: u32 },
    Removed { name: String },
    Cleared,
    /// Nothing changed (unknown id, or the clamped quantity was the same).
    Unchanged,
    Refused(CartRefusal),
}

impl CartChange {
    /// Notification text for this change, if any.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Added { name, .. } => Some(format!("Added {name} to cart")),
            Self::Merged { name, .. } => Some(format!("Updated {name} quantity in cart")),
            Self::QuantityChanged { name, quantity } => {
                Some(format!("Updated {name} quantity to {quantity}"))
            }
            Self::Removed { name } => Some(format!("Removed {name} from cart")),
            Self::Cleared => Some("Cart cleared".to_string()),
            Self::Refused(CartRefusal::OutOfStock { name }) => {
                Some(format!("{name} is out of stock"))
            }
            Self::Refused(CartRefusal::ZeroQuantity { name }) => {
                Some(format!("Choose a quantity to add {name} to cart"))
            }
            Self::Unchanged => None,
        }
    }

    /// Whether the cart contents changed.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        !matches!(self, Self::Unchanged | Self::Refused(_))
    }
}

/// Persisted form of a cart; derived fields are recomputed on load.
#[derive(Deserialize)]
struct StoredCart {
    #[serde(default)]
    items: Vec<CartItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredCart")]
pub struct Cart {
    items: Vec<CartItem>,
    item_count: u32,
    total: Money,
    #[serde(skip)]
    last_stamp: i64,
}

impl From<StoredCart> for Cart {
    fn from(stored: StoredCart) -> Self {
        let mut cart = Self {
            items: stored
                .items
                .into_iter()
                .filter(|item| item.product.quantity > 0 && item.quantity > 0)
                .map(|mut item| {
                    item.quantity = item.quantity.min(item.product.quantity);
                    item
                })
                .collect(),
            ..Self::default()
        };
        cart.recompute();
        cart
    }
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of line quantities.
    #[must_use]
    pub const fn item_count(&self) -> u32 {
        self.item_count
    }

    /// Exact sum of `price * quantity` over all lines.
    #[must_use]
    pub const fn total(&self) -> Money {
        self.total
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn find_by_product(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product.id == product_id)
    }

    #[must_use]
    pub fn get(&self, item_id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == item_id)
    }

    /// Add `quantity` units of `product`, merging with an existing line.
    ///
    /// A new line is clamped to `product.quantity`. A merge keeps the line's
    /// existing snapshot and clamps against its stock, the same bound
    /// [`Cart::update_quantity`] uses, so a re-fetched product with a
    /// different stock never loosens the limit.
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> CartChange {
        if !product.is_available() {
            return CartChange::Refused(CartRefusal::OutOfStock {
                name: product.name.clone(),
            });
        }
        if quantity == 0 {
            return CartChange::Refused(CartRefusal::ZeroQuantity {
                name: product.name.clone(),
            });
        }

        if let Some(existing) = self.find_by_product(&product.id) {
            let id = existing.id.clone();
            let merged = existing
                .quantity
                .saturating_add(quantity)
                .min(existing.product.quantity);
            self.set_quantity(&id, merged);
            return CartChange::Merged {
                name: product.name.clone(),
                quantity: merged,
            };
        }

        let quantity = quantity.min(product.quantity);
        let id = CartItemId::new(format!("{}-{}", product.id, self.next_stamp()));
        self.items.push(CartItem {
            id,
            product: product.clone(),
            quantity,
        });
        self.recompute();
        CartChange::Added {
            name: product.name.clone(),
            quantity,
        }
    }

    /// Set a line's quantity. Zero or negative removes the line; anything
    /// else is clamped to `[1, stock]`.
    pub fn update_quantity(&mut self, item_id: &CartItemId, quantity: i64) -> CartChange {
        if quantity <= 0 {
            return self.remove_item(item_id);
        }
        let Some(item) = self.get(item_id) else {
            return CartChange::Unchanged;
        };

        let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
        let clamped = requested.min(item.product.quantity).max(1);
        if clamped == item.quantity {
            return CartChange::Unchanged;
        }

        let name = item.product.name.clone();
        self.set_quantity(item_id, clamped);
        CartChange::QuantityChanged {
            name,
            quantity: clamped,
        }
    }

    pub fn remove_item(&mut self, item_id: &CartItemId) -> CartChange {
        let Some(pos) = self.items.iter().position(|item| &item.id == item_id) else {
            return CartChange::Unchanged;
        };
        let removed = self.items.remove(pos);
        self.recompute();
        CartChange::Removed {
            name: removed.product.name,
        }
    }

    pub fn clear(&mut self) -> CartChange {
        self.items.clear();
        self.recompute();
        CartChange::Cleared
    }

    fn set_quantity(&mut self, item_id: &CartItemId, quantity: u32) {
        if let Some(item) = self.items.iter_mut().find(|item| &item.id == item_id) {
            item.quantity = quantity;
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        self.item_count = self.items.iter().map(|item| item.quantity).sum();
        self.total = self.items.iter().map(CartItem::line_total).sum();
    }

    /// Wall-clock millis, bumped so two adds in the same millisecond still
    /// get distinct ids.
    fn next_stamp(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last_stamp = now.max(self.last_stamp + 1);
        self.last_stamp
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, price_cents: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            sku: String::new(),
            name: format!("Item {id}"),
            description: String::new(),
            category: "Electronics".to_string(),
            images: vec![],
            price: Money::from_cents(price_cents),
            quantity: stock,
            is_active: true,
            published: true,
            featured: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_add_then_merge_clamps_to_stock() {
        let p = product("p1", 2500, 3);
        let mut cart = Cart::new();

        assert_eq!(
            cart.add_item(&p, 2),
            CartChange::Added { name: "Item p1".to_string(), quantity: 2 }
        );
        assert_eq!(cart.total(), Money::from_cents(5000));

        let change = cart.add_item(&p, 2);
        assert_eq!(change, CartChange::Merged { name: "Item p1".to_string(), quantity: 3 });
        assert_eq!(change.message().as_deref(), Some("Updated Item p1 quantity in cart"));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Money::from_cents(7500));
    }

    #[test]
    fn test_update_above_stock_is_unchanged_when_already_at_max() {
        let p = product("p1", 2500, 3);
        let mut cart = Cart::new();
        cart.add_item(&p, 3);
        let id = cart.items()[0].id.clone();

        assert_eq!(cart.update_quantity(&id, 10), CartChange::Unchanged);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Money::from_cents(7500));
    }

    #[test]
    fn test_update_to_zero_or_negative_removes() {
        let mut cart = Cart::new();
        cart.add_item(&product("a", 100, 5), 1);
        cart.add_item(&product("b", 100, 5), 1);
        let a = cart.items()[0].id.clone();
        let b = cart.items()[1].id.clone();

        assert!(matches!(cart.update_quantity(&a, 0), CartChange::Removed { .. }));
        assert!(matches!(cart.update_quantity(&b, -4), CartChange::Removed { .. }));
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_update_changes_quantity_with_message() {
        let mut cart = Cart::new();
        cart.add_item(&product("a", 199, 5), 1);
        let id = cart.items()[0].id.clone();

        let change = cart.update_quantity(&id, 4);
        assert_eq!(change.message().as_deref(), Some("Updated Item a quantity to 4"));
        assert_eq!(cart.total(), Money::from_cents(796));
    }

    #[test]
    fn test_refuses_out_of_stock_and_zero_quantity() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add_item(&product("a", 100, 0), 1),
            CartChange::Refused(CartRefusal::OutOfStock { .. })
        ));
        assert!(matches!(
            cart.add_item(&product("b", 100, 4), 0),
            CartChange::Refused(CartRefusal::ZeroQuantity { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_unknown_ids_are_silent() {
        let mut cart = Cart::new();
        let missing = CartItemId::new("nope");
        assert_eq!(cart.update_quantity(&missing, 2), CartChange::Unchanged);
        assert_eq!(cart.remove_item(&missing), CartChange::Unchanged);
        assert_eq!(CartChange::Unchanged.message(), None);
    }

    #[test]
    fn test_item_ids_are_distinct_and_prefixed() {
        let mut cart = Cart::new();
        let p = product("p1", 100, 5);
        cart.add_item(&p, 1);
        let first = cart.items()[0].id.clone();
        cart.remove_item(&first);
        cart.add_item(&p, 1);
        let second = cart.items()[0].id.clone();
        assert_ne!(first, second);
        assert!(second.as_str().starts_with("p1-"));
    }

    #[test]
    fn test_deserialize_recomputes_derived_fields() {
        let mut cart = Cart::new();
        cart.add_item(&product("a", 1050, 5), 2);
        let mut json = serde_json::to_value(&cart).unwrap();
        json["total"] = serde_json::json!(999);
        json["itemCount"] = serde_json::json!(42);

        let restored: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(restored.item_count(), 2);
        assert_eq!(restored.total(), Money::from_cents(2100));
    }

    fn assert_consistent(cart: &Cart) {
        for item in cart.items() {
            assert!(item.quantity >= 1, "{} has quantity 0", item.id);
            assert!(
                item.quantity <= item.product.quantity,
                "{} has {} of {} in stock",
                item.id,
                item.quantity,
                item.product.quantity
            );
        }
        let count: u32 = cart.items().iter().map(|i| i.quantity).sum();
        let total: Money = cart.items().iter().map(CartItem::line_total).sum();
        assert_eq!(cart.item_count(), count);
        assert_eq!(cart.total(), total);
    }

    #[test]
    fn test_readd_with_higher_stock_keeps_line_snapshot_bound() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", 2500, 3), 3);

        let change = cart.add_item(&product("p1", 2500, 10), 4);
        assert_eq!(change, CartChange::Merged { name: "Item p1".to_string(), quantity: 3 });
        assert_eq!(cart.items()[0].product.quantity, 3);
        assert_eq!(cart.item_count(), 3);
        assert_consistent(&cart);
    }

    #[test]
    fn test_readd_with_lower_stock_still_bounded() {
        let mut cart = Cart::new();
        cart.add_item(&product("p1", 100, 10), 2);

        cart.add_item(&product("p1", 100, 1), 5);
        assert_eq!(cart.item_count(), 7);
        assert_consistent(&cart);
    }

    #[test]
    fn test_mixed_sequence_keeps_lines_within_stock() {
        enum Step {
            Add(&'static str, i64, u32, u32),
            Update(usize, i64),
        }

        let steps = [
            Step::Add("a", 1999, 3, 2),
            Step::Add("b", 450, 8, 5),
            Step::Add("a", 1999, 12, 4),
            Step::Update(0, 9),
            Step::Add("c", 1, 1, 3),
            Step::Update(1, 100),
            Step::Add("b", 475, 2, 9),
            Step::Update(2, -1),
            Step::Add("a", 1999, 1, 1),
            Step::Update(0, 1),
            Step::Add("c", 1, 6, 2),
            Step::Update(1, 0),
            Step::Add("d", 333, 4, u32::MAX),
            Step::Update(0, i64::MAX),
        ];

        let mut cart = Cart::new();
        for step in steps {
            match step {
                Step::Add(id, cents, stock, qty) => {
                    cart.add_item(&product(id, cents, stock), qty);
                }
                Step::Update(index, qty) => {
                    if let Some(item) = cart.items().get(index) {
                        let id = item.id.clone();
                        cart.update_quantity(&id, qty);
                    }
                }
            }
            assert_consistent(&cart);
        }
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(&product("a", 100, 5), 3);
        assert_eq!(cart.clear(), CartChange::Cleared);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::ZERO);
    }
}

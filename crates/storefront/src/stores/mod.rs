//! Client-side stores.
//!
//! Each store is a cheap `Clone` handle around shared state. Views call
//! actions on a store and read back snapshots; nothing here is global, so
//! tests and the CLI build their own instances.
//!
//! Read actions capture failures into the store's `error` field. Mutations
//! return [`crate::Result`] so the caller decides what to show.

pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod orders;
pub mod products;

pub use auth::{AuthState, AuthStore};
pub use cart::{CART_STORAGE_KEY, CartStore};
pub use categories::CategoryStore;
pub use checkout::CheckoutStore;
pub use orders::{OrdersState, OrdersStore};
pub use products::{MutationPolicy, ProductStore, ProductStoreState};

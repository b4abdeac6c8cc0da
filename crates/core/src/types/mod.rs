//! Domain types shared by the storefront and admin crates.

pub mod cart;
pub mod category;
pub mod dashboard;
pub mod id;
pub mod money;
pub mod order;
pub mod pagination;
pub mod product;
pub mod status;
pub mod user;
pub mod validation;

pub use cart::{Cart, CartChange, CartItem, CartRefusal};
pub use category::{Category, CategoryCatalog, CategoryUpdate, DEFAULT_CATEGORY_COLOR};
pub use dashboard::{DashboardStats, OrderStatusBreakdown, ProductStatusBreakdown};
pub use id::*;
pub use money::Money;
pub use order::{Order, OrderItem};
pub use pagination::{Page, PageRequest};
pub use product::{LOW_STOCK_THRESHOLD, NewProduct, Product, ProductPatch, ProductStats};
pub use status::*;
pub use user::{Address, User};
pub use validation::{
    AddressForm, ProductForm, ValidProductForm, ValidationError, looks_like_email, validate_login,
    validate_password_confirmation, validate_signup,
};

//! Domain services over the REST API.
//!
//! Each service is a thin, stateless wrapper around [`ApiClient`]: it builds
//! the request, unwraps the response envelope and converts it to core types.
//! State lives in [`crate::stores`].
//!
//! # Services
//!
//! - `auth` - login, registration, logout, profile
//! - `catalog` - product listing and detail (detail responses cached)
//! - `products` - legacy product CRUD used by the product store
//! - `orders` - the signed-in user's orders
//! - `address` - the signed-in user's shipping address
//! - `checkout` - hosted checkout session creation
//!
//! [`ApiClient`]: crate::http::ApiClient

pub mod address;
pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod products;

pub use address::AddressService;
pub use auth::{AuthService, AuthSession};
pub use catalog::{CatalogFilter, CatalogService, ProductData, ProductListData};
pub use checkout::{CheckoutRequest, CheckoutService};
pub use orders::{OrderListResponse, OrderService};
pub use products::ProductService;

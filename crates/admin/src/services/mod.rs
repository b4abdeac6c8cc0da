//! Admin API services.
//!
//! Thin wrappers over the `/admin` endpoints. They share the storefront's
//! [`ApiClient`](marketstall_storefront::ApiClient), so the same bearer token
//! and 401 handling apply.

pub mod dashboard;
pub mod orders;
pub mod products;
pub mod users;

pub use dashboard::DashboardService;
pub use orders::{AdminOrderFilter, AdminOrderService};
pub use products::{
    AdminProductFilter, AdminProductService, ImageUpload, MAX_IMAGES_PER_REQUEST, ProductUpload,
};
pub use users::{AdminUserFilter, AdminUserService, UserAnalytics, UserDetail, UserStatusFilter};

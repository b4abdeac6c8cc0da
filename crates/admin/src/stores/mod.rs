//! Stateful admin views built on the admin services.

mod dashboard;
mod orders;
mod products;
mod users;

pub use dashboard::{AdminDashboardStore, DashboardState};
pub use orders::{ADMIN_ORDERS_PAGE_SIZE, AdminOrderDetail, AdminOrderStore, OrderSummary};
pub use products::{ADMIN_PRODUCTS_PAGE_SIZE, AdminProductStore, MutationFlags};
pub use users::{ADMIN_USERS_PAGE_SIZE, AdminUserDetailState, AdminUserStore};

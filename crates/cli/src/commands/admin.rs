//! Back-office commands.
//!
//! Every subcommand opens an [`AdminConsole`] first, which refuses (and
//! clears the session) unless an admin is signed in.
//!
//! ```bash
//! mstall admin orders list --status pending
//! mstall admin orders status 6650a1 delivered
//! mstall admin products create --name "Desk Lamp" --description "Warm light for late nights" \
//!     --category electronics --price 49.99 --stock 12 --image lamp.jpg --publish
//! ```

use std::path::PathBuf;

use clap::Subcommand;
use marketstall_admin::AdminConsole;
use marketstall_admin::services::{
    AdminOrderFilter, AdminProductFilter, AdminUserFilter, ProductUpload, UserStatusFilter,
};
use marketstall_admin::stores::{ADMIN_ORDERS_PAGE_SIZE, ADMIN_PRODUCTS_PAGE_SIZE, ADMIN_USERS_PAGE_SIZE};
use marketstall_core::types::validation::{parse_price, parse_stock};
use marketstall_core::{OrderId, OrderStatus, ProductForm, ProductId, UserId, UserRole};
use marketstall_storefront::Storefront;
use marketstall_storefront::listing::ListQuery;

use super::{CommandError, Result, list_outcome};
use crate::output;

#[derive(Subcommand)]
pub enum AdminAction {
    /// Store-wide figures
    Dashboard,
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: AdminOrdersAction,
    },
    /// Browse customers
    Users {
        #[command(subcommand)]
        action: AdminUsersAction,
    },
    /// Manage the catalog
    Products {
        #[command(subcommand)]
        action: AdminProductsAction,
    },
}

#[derive(Subcommand)]
pub enum AdminOrdersAction {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = ADMIN_ORDERS_PAGE_SIZE)]
        limit: u32,

        /// Only orders in this status
        #[arg(long)]
        status: Option<OrderStatus>,

        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: String,
    },
    /// Move an order to another status
    Status {
        id: String,
        status: OrderStatus,
    },
}

#[derive(Subcommand)]
pub enum AdminUsersAction {
    Search {
        /// Name or email fragment
        query: Option<String>,

        #[arg(long)]
        role: Option<UserRole>,

        #[arg(long)]
        status: Option<UserStatusFilter>,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = ADMIN_USERS_PAGE_SIZE)]
        limit: u32,
    },
    Show {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum AdminProductsAction {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = ADMIN_PRODUCTS_PAGE_SIZE)]
        limit: u32,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        search: Option<String>,
    },
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,

        #[arg(long)]
        category: String,

        #[arg(long)]
        price: String,

        #[arg(long)]
        stock: String,

        /// Image file to upload (repeatable, at most five)
        #[arg(long = "image")]
        images: Vec<PathBuf>,

        #[arg(long)]
        publish: bool,

        #[arg(long)]
        feature: bool,
    },
    /// Change some fields; unset flags are left alone
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        price: Option<String>,

        #[arg(long)]
        stock: Option<String>,

        /// Additional image to upload (repeatable)
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    Delete {
        id: String,
    },
    DeleteImage {
        id: String,
        url: String,
    },
    /// Publish, or unpublish with `--off`
    Publish {
        id: String,

        #[arg(long)]
        off: bool,
    },
    /// Feature, or unfeature with `--off`
    Feature {
        id: String,

        #[arg(long)]
        off: bool,
    },
}

pub async fn run(app: &Storefront, action: AdminAction) -> Result<()> {
    let console = AdminConsole::for_storefront(app)?;
    tracing::debug!(admin = %console.admin().email, "Admin command");

    match action {
        AdminAction::Dashboard => dashboard(&console).await,
        AdminAction::Orders { action } => orders(&console, action).await,
        AdminAction::Users { action } => users(&console, action).await,
        AdminAction::Products { action } => products(&console, action).await,
    }
}

async fn dashboard(console: &AdminConsole) -> Result<()> {
    let store = console.dashboard();
    store.fetch_stats().await;
    let state = store.state().await;
    match (state.stats, state.error) {
        (Some(stats), None) => {
            output::dashboard(&stats);
            Ok(())
        }
        (_, error) => Err(CommandError::Failed(
            error.unwrap_or_else(|| "Failed to fetch dashboard statistics".to_string()),
        )),
    }
}

async fn orders(console: &AdminConsole, action: AdminOrdersAction) -> Result<()> {
    let store = console.orders();
    match action {
        AdminOrdersAction::List {
            page,
            limit,
            status,
            search,
        } => {
            let refresh = store
                .list()
                .load_query(ListQuery {
                    page,
                    limit,
                    search,
                    filter: AdminOrderFilter { status },
                })
                .await;
            let state = store.list().state().await;
            list_outcome(refresh, &state)?;
            output::orders(&state.items);
            output::page_footer(&state);

            let summary = store.summary().await;
            tracing::info!(
                revenue = %summary.total_revenue,
                average = %summary.average_order_value,
                pending = summary.pending,
                delivered = summary.delivered,
                "Page summary"
            );
        }
        AdminOrdersAction::Show { id } => {
            store.fetch_order(&OrderId::new(id)).await;
            let detail = store.detail().await;
            match (detail.current_order, detail.error) {
                (Some(order), None) => output::order(&order),
                (_, error) => {
                    return Err(CommandError::Failed(
                        error.unwrap_or_else(|| "Failed to fetch order".to_string()),
                    ));
                }
            }
        }
        AdminOrdersAction::Status { id, status } => {
            let order = store.update_order_status(&OrderId::new(id), status).await?;
            output::order(&order);
        }
    }
    Ok(())
}

async fn users(console: &AdminConsole, action: AdminUsersAction) -> Result<()> {
    let store = console.users();
    match action {
        AdminUsersAction::Search {
            query,
            role,
            status,
            page,
            limit,
        } => {
            let refresh = store
                .list()
                .load_query(ListQuery {
                    page,
                    limit,
                    search: query,
                    filter: AdminUserFilter { role, status },
                })
                .await;
            let state = store.list().state().await;
            list_outcome(refresh, &state)?;
            output::users(&state.items);
            output::page_footer(&state);
        }
        AdminUsersAction::Show { id } => {
            store.fetch_user(&UserId::new(id)).await;
            let state = store.detail().await;
            match (state.detail, state.error) {
                (Some(detail), None) => {
                    output::user(&detail.user);
                    if let Some(analytics) = detail.analytics {
                        tracing::info!(
                            account_age_days = ?analytics.account_age,
                            last_updated = ?analytics.last_updated,
                            "Account analytics"
                        );
                    }
                }
                (_, error) => {
                    return Err(CommandError::Failed(
                        error.unwrap_or_else(|| "Failed to fetch user".to_string()),
                    ));
                }
            }
        }
    }
    Ok(())
}

async fn products(console: &AdminConsole, action: AdminProductsAction) -> Result<()> {
    let store = console.products();
    match action {
        AdminProductsAction::List {
            page,
            limit,
            category,
            search,
        } => {
            let refresh = store
                .list()
                .load_query(ListQuery {
                    page,
                    limit,
                    search,
                    filter: AdminProductFilter { category },
                })
                .await;
            let state = store.list().state().await;
            list_outcome(refresh, &state)?;
            output::products(&state.items);
            output::page_footer(&state);
        }
        AdminProductsAction::Create {
            name,
            description,
            category,
            price,
            stock,
            images,
            publish,
            feature,
        } => {
            let form = ProductForm {
                name,
                description,
                category,
                price,
                stock,
            }
            .validate()?;
            let upload = ProductUpload::from_form(form, publish, feature);
            let product = store.create_product_with_images(upload, images.as_slice()).await?;
            output::product(&product);
        }
        AdminProductsAction::Update {
            id,
            name,
            description,
            category,
            price,
            stock,
            images,
        } => {
            let upload = ProductUpload {
                name,
                description,
                category,
                price: price.as_deref().map(parse_price).transpose()?,
                quantity: stock.as_deref().map(parse_stock).transpose()?,
                ..ProductUpload::default()
            };
            let product = store
                .update_product_with_images(&ProductId::new(id), upload, images.as_slice())
                .await?;
            output::product(&product);
        }
        AdminProductsAction::Delete { id } => {
            store.delete_product(&ProductId::new(id)).await?;
        }
        AdminProductsAction::DeleteImage { id, url } => {
            if let Some(product) = store.delete_image(&ProductId::new(id), &url).await? {
                output::product(&product);
            }
        }
        AdminProductsAction::Publish { id, off } => {
            let product = store.set_published(&ProductId::new(id), !off).await?;
            output::product(&product);
        }
        AdminProductsAction::Feature { id, off } => {
            let product = store.set_featured(&ProductId::new(id), !off).await?;
            output::product(&product);
        }
    }
    Ok(())
}

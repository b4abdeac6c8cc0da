//! The signed-in user's orders.

use clap::Subcommand;
use marketstall_core::OrderId;
use marketstall_storefront::Storefront;
use marketstall_storefront::guard::require_session;
use marketstall_storefront::services::orders::USER_ORDERS_PAGE_SIZE;

use super::{CommandError, Result, list_outcome};
use crate::output;

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List past orders
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = USER_ORDERS_PAGE_SIZE)]
        limit: u32,
    },
    /// Show one order
    Show { id: String },
}

pub async fn run(app: &Storefront, action: OrdersAction) -> Result<()> {
    require_session(app.client().session().as_ref())?;
    let orders = app.orders();
    match action {
        OrdersAction::List { page, limit } => {
            let refresh = orders.fetch_user_orders(page, limit).await;
            let state = orders.orders().await;
            list_outcome(refresh, &state)?;
            output::orders(&state.items);
            output::page_footer(&state);
        }
        OrdersAction::Show { id } => {
            orders.fetch_user_order(&OrderId::new(id)).await;
            let detail = orders.detail().await;
            match (detail.current_order, detail.error) {
                (_, Some(error)) => return Err(CommandError::Failed(error)),
                (Some(order), None) => output::order(&order),
                (None, None) => return Err(CommandError::Failed("Order not found".to_string())),
            }
        }
    }
    Ok(())
}

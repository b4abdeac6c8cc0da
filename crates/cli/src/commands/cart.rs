//! The persistent shopping cart.
//!
//! The cart lives in the state directory, so it survives between runs.

use clap::Subcommand;
use marketstall_core::{CartItemId, ProductId};
use marketstall_storefront::Storefront;

use super::Result;
use crate::output;

#[derive(Subcommand)]
pub enum CartAction {
    /// Print the cart
    Show,
    /// Add a product
    Add {
        product_id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (0 or less removes it)
    Update {
        item_id: String,

        #[arg(allow_hyphen_values = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove { item_id: String },
    /// Empty the cart
    Clear,
}

pub async fn run(app: &Storefront, action: CartAction) -> Result<()> {
    let cart = app.cart();
    match action {
        CartAction::Show => {}
        CartAction::Add {
            product_id,
            quantity,
        } => {
            let product = app
                .catalog()
                .source()
                .get_product(&ProductId::new(product_id))
                .await?;
            cart.add_item(&product, quantity).await;
        }
        CartAction::Update { item_id, quantity } => {
            cart.update_quantity(&CartItemId::new(item_id), quantity).await;
        }
        CartAction::Remove { item_id } => {
            cart.remove_item(&CartItemId::new(item_id)).await;
        }
        CartAction::Clear => {
            cart.clear_cart().await;
        }
    }
    output::cart(&cart.snapshot().await);
    Ok(())
}

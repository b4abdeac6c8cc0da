//! Start a hosted checkout for the current cart.

use clap::Args;
use marketstall_core::AddressForm;
use marketstall_storefront::Storefront;
use marketstall_storefront::guard::require_session;

use super::{CommandError, Result};

/// Shipping address for this order. Without `--street` the address saved on
/// the account is used.
#[derive(Args)]
pub struct CheckoutArgs {
    #[arg(long, requires_all = ["city", "post_code", "country"])]
    pub street: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub post_code: Option<String>,

    #[arg(long)]
    pub country: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,
}

pub async fn run(app: &Storefront, args: CheckoutArgs) -> Result<()> {
    require_session(app.client().session().as_ref())?;
    app.auth().initialize().await;

    let form = if let Some(street) = args.street {
        AddressForm {
            address: street,
            city: args.city.unwrap_or_default(),
            zip_code: args.post_code.unwrap_or_default(),
            country: args.country.unwrap_or_default(),
            state: args.state,
            phone: args.phone,
        }
    } else {
        let user = app.auth().get_profile().await?;
        let address = user.shipping_address().ok_or_else(|| {
            CommandError::Failed(
                "No saved address. Pass --street, --city, --post-code and --country.".to_string(),
            )
        })?;
        AddressForm::from(address)
    };

    let url = app
        .checkout()
        .begin_checkout(app.cart(), app.auth(), &form)
        .await?;
    #[allow(clippy::print_stdout)]
    {
        println!("Continue to payment: {url}");
    }
    Ok(())
}

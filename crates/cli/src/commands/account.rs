//! Account settings for the signed-in user.

use clap::Subcommand;
use marketstall_core::AddressForm;
use marketstall_storefront::Storefront;
use marketstall_storefront::guard::require_session;

use super::{AddressArgs, Result};
use crate::output;

#[derive(Subcommand)]
pub enum AccountAction {
    /// Save the shipping address
    Address(AddressArgs),
    /// Reload and print the profile
    Profile,
}

pub async fn run(app: &Storefront, action: AccountAction) -> Result<()> {
    require_session(app.client().session().as_ref())?;
    let auth = app.auth();
    let user = match action {
        AccountAction::Address(args) => auth.save_address(&AddressForm::from(args)).await?,
        AccountAction::Profile => auth.get_profile().await?,
    };
    output::user(&user);
    Ok(())
}

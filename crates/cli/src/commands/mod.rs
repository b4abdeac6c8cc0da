//! Subcommand implementations.

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod orders;
pub mod products;

use clap::Args;
use marketstall_admin::AdminError;
use marketstall_core::{AddressForm, Money, ValidationError};
use marketstall_storefront::ApiError;
use marketstall_storefront::config::ConfigError;
use marketstall_storefront::guard::AccessDenied;
use marketstall_storefront::listing::{ListState, Refresh};
use marketstall_storefront::state::StateError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors a command can end with.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    #[error("{}", .0.user_message())]
    Admin(#[from] AdminError),

    #[error("{0}")]
    Denied(#[from] AccessDenied),

    /// A list or detail view captured an error instead of returning it.
    #[error("{0}")]
    Failed(String),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Turn a list fetch outcome into a command result.
pub fn list_outcome<T, F>(refresh: Refresh, state: &ListState<T, F>) -> Result<()> {
    match refresh {
        Refresh::Failed => Err(CommandError::Failed(
            state
                .error
                .clone()
                .unwrap_or_else(|| "Request failed".to_string()),
        )),
        _ => Ok(()),
    }
}

/// Shipping address flags shared by `checkout` and `account address`.
#[derive(Debug, Clone, Args)]
pub struct AddressArgs {
    /// Street address
    #[arg(long)]
    pub street: String,

    #[arg(long)]
    pub city: String,

    /// Postal or ZIP code
    #[arg(long)]
    pub post_code: String,

    #[arg(long)]
    pub country: String,

    /// State or region
    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,
}

impl From<AddressArgs> for AddressForm {
    fn from(args: AddressArgs) -> Self {
        Self {
            address: args.street,
            city: args.city,
            zip_code: args.post_code,
            country: args.country,
            state: args.state,
            phone: args.phone,
        }
    }
}

/// Parse a non-negative amount such as `12.50`.
pub fn parse_money(value: &str) -> std::result::Result<Money, String> {
    match value.trim().parse::<Decimal>() {
        Ok(amount) if amount >= Decimal::ZERO => Ok(Money::new(amount)),
        Ok(_) => Err("amount must not be negative".to_string()),
        Err(e) => Err(format!("invalid amount: {e}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("12.50").unwrap(), Money::from_cents(1250));
        assert_eq!(parse_money("0").unwrap(), Money::ZERO);
        assert!(parse_money("-1").is_err());
        assert!(parse_money("ten").is_err());
    }

    #[test]
    fn test_address_args_map_to_form() {
        let form = AddressForm::from(AddressArgs {
            street: "1 High St".to_string(),
            city: "Leeds".to_string(),
            post_code: "LS1".to_string(),
            country: "UK".to_string(),
            state: None,
            phone: None,
        });
        let address = form.validate().unwrap();
        assert_eq!(address.post_code, "LS1");
        assert_eq!(address.street, "1 High St");
    }

    #[test]
    fn test_failed_list_outcome_carries_message() {
        let state: ListState<u32, ()> = ListState {
            items: Vec::new(),
            filter: (),
            page: 1,
            limit: 10,
            search: None,
            total_pages: 0,
            total: 0,
            loading: false,
            error: Some("Bad gateway".to_string()),
            loaded: false,
        };
        let err = list_outcome(Refresh::Failed, &state).unwrap_err();
        assert_eq!(err.to_string(), "Bad gateway");
        assert!(list_outcome(Refresh::Applied, &state).is_ok());
    }
}

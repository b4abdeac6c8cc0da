//! Client-side form validation.
//!
//! These checks run before any network call. The server re-validates
//! everything; this only catches obviously incomplete input early.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use super::money::Money;
use super::user::Address;

/// A failed form check, tied to the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Fail with `message` on the first blank field.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming the first blank field.
pub fn require_all(fields: &[(&'static str, &str)], message: &str) -> Result<(), ValidationError> {
    match fields.iter().find(|(_, value)| is_blank(value)) {
        Some((field, _)) => Err(ValidationError::new(*field, message)),
        None => Ok(()),
    }
}

/// Login form check.
///
/// # Errors
///
/// Fails when either field is empty.
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    require_all(
        &[("email", email), ("password", password)],
        "Email and password are required",
    )
}

/// Signup form check.
///
/// # Errors
///
/// Fails when any of the four fields is empty.
pub fn validate_signup(
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<(), ValidationError> {
    require_all(
        &[
            ("firstName", first_name),
            ("lastName", last_name),
            ("email", email),
            ("password", password),
        ],
        "All fields are required",
    )
}

/// # Errors
///
/// Fails when the confirmation differs from the password.
pub fn validate_password_confirmation(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password == confirm {
        Ok(())
    } else {
        Err(ValidationError::new("confirmPassword", "Passwords do not match"))
    }
}

/// Loose shape check: `local@domain.tld`.
#[must_use]
pub fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.trim().split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// Shipping form as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressForm {
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
    pub state: Option<String>,
    pub phone: Option<String>,
}

impl AddressForm {
    /// Every failing field, in form order.
    #[must_use]
    pub fn errors(&self) -> Vec<ValidationError> {
        [
            ("address", self.address.as_str(), "Address is required"),
            ("city", self.city.as_str(), "City is required"),
            ("zipCode", self.zip_code.as_str(), "ZIP code is required"),
            ("country", self.country.as_str(), "Country is required"),
        ]
        .into_iter()
        .filter(|(_, value, _)| is_blank(value))
        .map(|(field, _, message)| ValidationError::new(field, message))
        .collect()
    }

    /// Validate and convert into the API address shape.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> Result<Address, ValidationError> {
        if let Some(err) = self.errors().into_iter().next() {
            return Err(err);
        }
        Ok(Address {
            street: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            post_code: self.zip_code.trim().to_string(),
            country: self.country.trim().to_string(),
        })
    }
}

impl From<&Address> for AddressForm {
    fn from(address: &Address) -> Self {
        Self {
            address: address.street.clone(),
            city: address.city.clone(),
            zip_code: address.post_code.clone(),
            country: address.country.clone(),
            state: None,
            phone: None,
        }
    }
}

/// Admin product form as typed, with numeric fields still as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub stock: String,
}

/// A product form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProductForm {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Money,
    pub quantity: u32,
}

impl ProductForm {
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> Result<ValidProductForm, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::new("name", "Product name is required"));
        }
        if name.chars().count() < 3 {
            return Err(ValidationError::new(
                "name",
                "Product name must be at least 3 characters",
            ));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::new("description", "Description is required"));
        }
        if description.chars().count() < 10 {
            return Err(ValidationError::new(
                "description",
                "Description must be at least 10 characters",
            ));
        }
        if is_blank(&self.category) {
            return Err(ValidationError::new("category", "Category is required"));
        }
        let price = parse_price(&self.price)?;
        let quantity = parse_stock(&self.stock)?;

        Ok(ValidProductForm {
            name: name.to_string(),
            description: description.to_string(),
            category: self.category.trim().to_string(),
            price,
            quantity,
        })
    }
}

/// Parse a strictly positive price.
///
/// # Errors
///
/// Fails on empty, non-numeric, zero or negative input.
pub fn parse_price(value: &str) -> Result<Money, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new("price", "Price is required"));
    }
    match Decimal::from_str(value) {
        Ok(amount) if amount > Decimal::ZERO => Ok(Money::new(amount)),
        _ => Err(ValidationError::new("price", "Price must be a positive number")),
    }
}

/// Parse a non-negative stock count.
///
/// # Errors
///
/// Fails on empty, non-integer or negative input.
pub fn parse_stock(value: &str) -> Result<u32, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new("stock", "Stock is required"));
    }
    value
        .parse::<u32>()
        .map_err(|_| ValidationError::new("stock", "Stock must be a non-negative number"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_requires_both_fields() {
        let err = validate_login("a@b.co", "  ").unwrap_err();
        assert_eq!(err.field, "password");
        assert_eq!(err.to_string(), "Email and password are required");
        assert!(validate_login("a@b.co", "pw").is_ok());
    }

    #[test]
    fn test_signup_requires_all_fields() {
        let err = validate_signup("Ada", "", "a@b.co", "pw").unwrap_err();
        assert_eq!(err.field, "lastName");
        assert_eq!(err.message, "All fields are required");
    }

    #[test]
    fn test_password_confirmation() {
        assert!(validate_password_confirmation("x", "x").is_ok());
        assert_eq!(
            validate_password_confirmation("x", "y").unwrap_err().message,
            "Passwords do not match"
        );
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("ada@example.com"));
        assert!(!looks_like_email("ada@example"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("ada@@example.com"));
    }

    #[test]
    fn test_address_form() {
        let form = AddressForm {
            address: "1 High St".to_string(),
            city: "Leeds".to_string(),
            zip_code: String::new(),
            country: String::new(),
            ..AddressForm::default()
        };
        let fields: Vec<&str> = form.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, ["zipCode", "country"]);

        let valid = AddressForm {
            zip_code: " LS1 ".to_string(),
            country: "UK".to_string(),
            ..form
        };
        let address = valid.validate().unwrap();
        assert_eq!(address.post_code, "LS1");
    }

    #[test]
    fn test_product_form() {
        let form = ProductForm {
            name: "Mug".to_string(),
            description: "A sturdy ceramic mug".to_string(),
            category: "Home & Garden".to_string(),
            price: "7.50".to_string(),
            stock: "12".to_string(),
        };
        let valid = form.validate().unwrap();
        assert_eq!(valid.price, Money::from_cents(750));
        assert_eq!(valid.quantity, 12);

        let bad = ProductForm {
            price: "0".to_string(),
            ..form.clone()
        };
        assert_eq!(bad.validate().unwrap_err().field, "price");

        let bad = ProductForm {
            stock: "-1".to_string(),
            ..form
        };
        assert_eq!(bad.validate().unwrap_err().field, "stock");
    }
}

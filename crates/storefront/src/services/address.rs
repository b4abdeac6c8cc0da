//! The signed-in user's shipping address (one per user).

use marketstall_core::Address;
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::http::{ApiClient, ApiEnvelope};

/// `data` is either `{address}` or the address itself.
#[derive(Deserialize)]
#[serde(untagged)]
enum AddressPayload {
    Wrapped { address: Address },
    Bare(Address),
}

impl AddressPayload {
    fn into_address(self) -> Option<Address> {
        let address = match self {
            Self::Wrapped { address } | Self::Bare(address) => address,
        };
        address.is_complete().then_some(address)
    }
}

#[derive(Clone)]
pub struct AddressService {
    client: ApiClient,
}

impl AddressService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /users/address`. `None` when no address has been saved.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self))]
    pub async fn get(&self) -> Result<Option<Address>> {
        let response: ApiEnvelope<Option<AddressPayload>> =
            self.client.get("/users/address", &[]).await?;
        Ok(response.data.and_then(AddressPayload::into_address))
    }

    /// `POST /users/address` (first address).
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self, address))]
    pub async fn add(&self, address: &Address) -> Result<Option<Address>> {
        let response: ApiEnvelope<Option<AddressPayload>> =
            self.client.post("/users/address", address).await?;
        Ok(response.data.and_then(AddressPayload::into_address))
    }

    /// `PUT /users/address` (replace in place).
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self, address))]
    pub async fn update(&self, address: &Address) -> Result<Option<Address>> {
        let response: ApiEnvelope<Option<AddressPayload>> =
            self.client.put("/users/address", address).await?;
        Ok(response.data.and_then(AddressPayload::into_address))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shapes() {
        let wrapped: AddressPayload = serde_json::from_str(
            r#"{"address": {"street": "1 High St", "city": "Leeds", "postCode": "LS1", "country": "UK"}}"#,
        )
        .unwrap();
        assert_eq!(wrapped.into_address().unwrap().city, "Leeds");

        let bare: AddressPayload = serde_json::from_str(
            r#"{"street": "1 High St", "city": "Leeds", "postCode": "LS1", "country": "UK"}"#,
        )
        .unwrap();
        assert_eq!(bare.into_address().unwrap().post_code, "LS1");

        let empty: AddressPayload = serde_json::from_str(r#"{"address": null}"#).unwrap();
        assert!(empty.into_address().is_none());
    }
}

//! Error type for admin operations that span more than one API call.

use marketstall_storefront::ApiError;
use marketstall_storefront::guard::AccessDenied;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    /// The session does not belong to an admin.
    #[error("Access denied: {0}")]
    Denied(#[from] AccessDenied),

    /// An API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An image to upload could not be read.
    #[error("Failed to read image {path}: {source}")]
    Upload {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl AdminError {
    /// Text suitable for showing to the operator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;

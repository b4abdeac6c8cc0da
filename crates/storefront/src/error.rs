//! API error taxonomy with Sentry integration.
//!
//! Every service returns `Result<T, ApiError>`. Read paths in the stores
//! capture the error into their state via [`ApiError::user_message`];
//! mutations hand it back to the caller.

use marketstall_core::ValidationError;
use serde::Deserialize;
use thiserror::Error;

/// Errors produced by the API client and the services built on it.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Input rejected before any request was sent.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Connection-level failure (DNS, refused, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// 401. The session has already been cleared when this is returned.
    #[error("{0}")]
    Unauthorized(String),

    /// 403.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// 5xx.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-success status.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        details: Vec<String>,
    },

    /// The response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text suitable for showing to the user.
    ///
    /// Prefers the server's field-level `details`, then its message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.message.clone(),
            Self::Timeout => "The request timed out. Please try again.".to_string(),
            Self::Network(_) => "Could not reach the server. Check your connection.".to_string(),
            Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Server { message, .. } => message.clone(),
            Self::Api {
                message, details, ..
            } => {
                if details.is_empty() {
                    message.clone()
                } else {
                    details.join(", ")
                }
            }
            Self::Decode(_) => "Unexpected response from the server".to_string(),
        }
    }

    /// Whether a manual retry could plausibly succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Network(_) | Self::Server { .. })
    }

    /// HTTP status, if the error came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Server { status, .. } | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build an error from a non-success status and its raw body.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let ErrorPayload { message, details } = ErrorPayload::parse(body);
        let message = message.unwrap_or_else(|| default_message(status).to_string());

        match status {
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            500..=599 => Self::Server { status, message },
            _ => Self::Api {
                status,
                message,
                details,
            },
        }
    }

    /// Report server-side failures to Sentry and the log.
    pub fn capture(&self) {
        if matches!(self, Self::Server { .. } | Self::Decode(_)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request failed"
            );
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

const fn default_message(status: u16) -> &'static str {
    match status {
        401 => "Authentication required",
        403 => "Access forbidden",
        404 => "Resource not found",
        500..=599 => "Internal server error",
        _ => "Request failed",
    }
}

// =============================================================================
// Error payload parsing
// =============================================================================

/// Normalized error body. The API answers either `{error: {message,
/// details}}` or a flat `{message}`; `details` may be a string or a list.
#[derive(Debug, Default, PartialEq, Eq)]
struct ErrorPayload {
    message: Option<String>,
    details: Vec<String>,
}

#[derive(Deserialize)]
struct RawErrorEnvelope {
    error: Option<RawError>,
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawError {
    Structured {
        message: Option<String>,
        #[serde(default)]
        details: serde_json::Value,
    },
    Plain(String),
}

impl ErrorPayload {
    fn parse(body: &str) -> Self {
        let Ok(envelope) = serde_json::from_str::<RawErrorEnvelope>(body) else {
            return Self::default();
        };

        match envelope.error {
            Some(RawError::Structured { message, details }) => Self {
                message: message.or(envelope.message),
                details: flatten_details(details),
            },
            Some(RawError::Plain(message)) => Self {
                message: Some(message),
                details: Vec::new(),
            },
            None => Self {
                message: envelope.message,
                details: Vec::new(),
            },
        }
    }
}

fn flatten_details(value: serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => vec![s],
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Object(map) => map
                    .get("message")
                    .and_then(serde_json::Value::as_str)
                    .map(String::from),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    }
}

// =============================================================================
// Sentry helpers
// =============================================================================

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "p1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_error_prefers_details() {
        let body = r#"{"error": {"message": "Validation failed", "details": ["Name is required", "Price must be positive"]}}"#;
        let err = ApiError::from_response(400, body);
        assert_eq!(err.to_string(), "Validation failed");
        assert_eq!(err.user_message(), "Name is required, Price must be positive");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_flat_message() {
        let err = ApiError::from_response(401, r#"{"success": false, "message": "Invalid email or password"}"#);
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(err.user_message(), "Invalid email or password");
    }

    #[test]
    fn test_string_details_and_plain_error() {
        let err = ApiError::from_response(422, r#"{"error": {"message": "Bad", "details": "Too many files"}}"#);
        assert_eq!(err.user_message(), "Too many files");

        let err = ApiError::from_response(409, r#"{"error": "Email already registered"}"#);
        assert_eq!(err.user_message(), "Email already registered");
    }

    #[test]
    fn test_unparseable_body_uses_status_default() {
        let err = ApiError::from_response(502, "<html>Bad Gateway</html>");
        assert!(matches!(err, ApiError::Server { status: 502, .. }));
        assert!(err.is_retryable());
        assert_eq!(err.user_message(), "Internal server error");

        let err = ApiError::from_response(404, "");
        assert_eq!(err.user_message(), "Resource not found");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ApiError::from(ValidationError::new("email", "Email and password are required"));
        assert_eq!(err.to_string(), "Email and password are required");
        assert_eq!(err.status(), None);
    }
}

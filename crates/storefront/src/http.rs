//! HTTP client wrapper for the Marketstall REST API.
//!
//! Every request goes through [`ApiClient::send`], which injects the bearer
//! token, applies the timeout, and maps non-success statuses onto
//! [`ApiError`]. A 401 clears the session and broadcasts
//! [`SessionEvent::Expired`] before the error reaches the caller.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::session::{SessionEvent, SessionStore};

/// Query parameters as `(name, value)` pairs.
pub type Query<'a> = [(&'a str, String)];

/// The `{success, message, data}` envelope most endpoints answer with.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: T,
}

const fn default_success() -> bool {
    true
}

/// A body-less acknowledgement (`{success, message}`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Marketstall REST API.
///
/// Cheap to clone; clones share the connection pool, session and event
/// channel.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    upload_timeout: Duration,
    session: Arc<dyn SessionStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl ApiClient {
    /// Create a client for `config.api_url`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client fails to build.
    pub fn new(config: &ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("marketstall/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let (events, _) = broadcast::channel(16);

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
                upload_timeout: config.upload_timeout,
                session,
                events,
            }),
        })
    }

    /// The session this client authenticates with.
    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.inner.session
    }

    /// Subscribe to session events raised by the response interceptor.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Build an absolute URL for `path` (which starts with `/`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the result is not a valid URL.
    pub fn url(&self, path: &str, query: &Query<'_>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{path}", self.inner.base_url))
            .map_err(|e| ApiError::Network(format!("invalid URL for {path}: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query<'_>) -> Result<T> {
        let url = self.url(path, query)?;
        self.send(Method::GET, self.inner.http.get(url)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, &[])?;
        self.send(Method::POST, self.inner.http.post(url).json(body))
            .await
    }

    /// POST without a body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path, &[])?;
        self.send(Method::POST, self.inner.http.post(url)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, &[])?;
        self.send(Method::PUT, self.inner.http.put(url).json(body))
            .await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, &[])?;
        self.send(Method::PATCH, self.inner.http.patch(url).json(body))
            .await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path, &[])?;
        self.send(Method::DELETE, self.inner.http.delete(url)).await
    }

    /// DELETE with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete_with_body<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, &[])?;
        self.send(Method::DELETE, self.inner.http.delete(url).json(body))
            .await
    }

    /// Send a multipart form with the upload timeout.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let url = self.url(path, &[])?;
        let request = self
            .inner
            .http
            .request(method.clone(), url)
            .timeout(self.inner.upload_timeout)
            .multipart(form);
        self.send(method, request).await
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Attach the bearer token, send, and decode the response.
    ///
    /// # Errors
    ///
    /// - `ApiError::Timeout` / `ApiError::Network` on transport failure
    /// - `ApiError::Unauthorized` on 401, after the session is cleared
    /// - the status-specific variant for other non-success responses
    /// - `ApiError::Decode` if a success body does not match `T`
    #[instrument(skip(self, method, request), fields(method = %method))]
    async fn send<T: DeserializeOwned>(&self, method: Method, request: RequestBuilder) -> Result<T> {
        let request = match self.inner.session.token() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            let err = ApiError::from(e);
            warn!(error = %err, "Request failed before a response arrived");
            err
        })?;

        let status = response.status();
        let path = response.url().path().to_string();
        let body = response.text().await?;
        debug!(%status, path, "API response");

        if !status.is_success() {
            return Err(self.handle_failure(status.as_u16(), &path, &body));
        }

        // Empty bodies (204, bare 200) decode as JSON null.
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| {
            let err = ApiError::Decode(format!("{path}: {e}"));
            err.capture();
            err
        })
    }

    fn handle_failure(&self, status: u16, path: &str, body: &str) -> ApiError {
        let err = ApiError::from_response(status, body);
        match &err {
            ApiError::Unauthorized(_) => {
                if self.inner.session.is_authenticated() {
                    warn!(path, "Session rejected by API, clearing");
                    self.inner.session.clear();
                    crate::error::clear_sentry_user();
                    // No receivers is fine.
                    let _ = self.inner.events.send(SessionEvent::Expired);
                }
            }
            ApiError::Forbidden(message) => {
                tracing::error!(path, message, "Access forbidden");
            }
            ApiError::Server { .. } => err.capture(),
            _ => debug!(path, status, error = %err, "API error response"),
        }
        err
    }
}

/// Percent-encode a path segment (ids, slugs).
#[must_use]
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::StoredSession;
    use crate::storage::MemoryStorage;

    fn client(base: &str) -> ApiClient {
        let config = ClientConfig::new(base).unwrap();
        let session = Arc::new(StoredSession::new(
            Arc::new(MemoryStorage::new()),
            chrono::Duration::days(7),
        ));
        ApiClient::new(&config, session).unwrap()
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = client("http://localhost:8080/api");
        let url = client
            .url("/products", &[("page", "2".to_string()), ("search", "blue mug".to_string())])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/products?page=2&search=blue+mug");
    }

    #[test]
    fn test_url_with_root_base() {
        let client = client("https://api.example.com/");
        let url = client.url("/auth/profile", &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/auth/profile");
    }

    #[test]
    fn test_segment_encodes_reserved_characters() {
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn test_envelope_defaults_success() {
        let env: ApiEnvelope<serde_json::Value> =
            serde_json::from_str(r#"{"data": {"x": 1}}"#).unwrap();
        assert!(env.success);
        assert!(env.message.is_none());
    }
}

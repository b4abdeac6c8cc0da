//! Authentication service.
//!
//! Token-based: login and registration return a bearer token plus the user,
//! and the profile endpoint is the source of truth for the signed-in user.

use marketstall_core::User;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::http::{Ack, ApiClient, ApiEnvelope};

/// A successful login or registration.
pub struct AuthSession {
    pub user: User,
    pub token: SecretString,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user.id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Deserialize)]
struct AuthData {
    user: User,
    token: String,
}

#[derive(Deserialize)]
struct UserData {
    user: User,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Authentication endpoints.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns the API error (bad credentials arrive as `Unauthorized` with
    /// the server's message).
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let response: ApiEnvelope<AuthData> = self
            .client
            .post("/auth/login", &LoginBody { email, password })
            .await?;
        Ok(response.data.into())
    }

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Returns the API error, e.g. when the email is already registered.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession> {
        let body = RegisterBody {
            first_name,
            last_name,
            email,
            password,
        };
        let response: ApiEnvelope<AuthData> = self.client.post("/auth/register", &body).await?;
        Ok(response.data.into())
    }

    /// `POST /auth/logout`.
    ///
    /// # Errors
    ///
    /// Returns the API error; callers treat logout as best-effort.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<Ack> {
        self.client.post_empty("/auth/logout").await
    }

    /// `GET /auth/profile`.
    ///
    /// # Errors
    ///
    /// Returns the API error (`Unauthorized` when the token is rejected).
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<User> {
        let response: ApiEnvelope<UserData> = self.client.get("/auth/profile", &[]).await?;
        Ok(response.data.user)
    }
}

impl From<AuthData> for AuthSession {
    fn from(data: AuthData) -> Self {
        Self {
            user: data.user,
            token: SecretString::from(data.token),
        }
    }
}

//! Signed-in user state.
//!
//! `Uninitialized -> Loading -> Authenticated | Anonymous`. The session
//! store holds the token; this store holds the profile fetched with it.

use std::sync::{Arc, Mutex};

use marketstall_core::{AddressForm, User, validate_login, validate_signup};
use secrecy::SecretString;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, instrument, warn};

use crate::error::{ApiError, Result, clear_sentry_user, set_sentry_user};
use crate::http::ApiClient;
use crate::services::{AddressService, AuthService};
use crate::session::{SessionEvent, SessionStore};

/// Where the auth store is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Uninitialized,
    Loading,
    Authenticated(User),
    Anonymous,
}

impl AuthState {
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Uninitialized | Self::Loading)
    }
}

/// Handle to the auth state.
#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<AuthStoreInner>,
}

struct AuthStoreInner {
    auth: AuthService,
    address: AddressService,
    session: Arc<dyn SessionStore>,
    state: RwLock<AuthState>,
    events: Mutex<broadcast::Receiver<SessionEvent>>,
}

impl AuthStore {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let events = client.subscribe();
        Self {
            inner: Arc::new(AuthStoreInner {
                auth: AuthService::new(client.clone()),
                address: AddressService::new(client.clone()),
                session: Arc::clone(client.session()),
                state: RwLock::new(AuthState::Uninitialized),
                events: Mutex::new(events),
            }),
        }
    }

    pub async fn state(&self) -> AuthState {
        self.inner.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.inner.state.read().await.user().cloned()
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(*self.inner.state.read().await, AuthState::Authenticated(_))
    }

    /// Resolve the initial state from whatever session is stored.
    ///
    /// A stored token whose profile cannot be fetched is discarded.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> AuthState {
        if !self.inner.session.is_authenticated() {
            return self.set_state(AuthState::Anonymous).await;
        }

        self.set_state(AuthState::Loading).await;
        match self.get_profile().await {
            Ok(_) => self.state().await,
            Err(e) => {
                warn!(error = %e, "Failed to initialize auth, clearing session");
                self.inner.session.clear();
                self.set_state(AuthState::Anonymous).await
            }
        }
    }

    /// Log in and load the profile.
    ///
    /// # Errors
    ///
    /// `Validation` if either field is empty (no request is made), otherwise
    /// the API error with the server's message.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        validate_login(email, password)?;
        let session = self.inner.auth.login(email.trim(), password).await?;
        self.establish(session.token).await
    }

    /// Register and load the profile.
    ///
    /// # Errors
    ///
    /// `Validation` if any field is empty, otherwise the API error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn signup(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User> {
        validate_signup(first_name, last_name, email, password)?;
        let session = self
            .inner
            .auth
            .register(first_name.trim(), last_name.trim(), email.trim(), password)
            .await?;
        self.establish(session.token).await
    }

    /// Store the token, then fetch the profile it belongs to.
    async fn establish(&self, token: SecretString) -> Result<User> {
        self.inner.session.set_token(token);
        match self.get_profile().await {
            Ok(user) => Ok(user),
            Err(e) => {
                self.inner.session.clear();
                self.set_state(AuthState::Anonymous).await;
                Err(e)
            }
        }
    }

    /// Tell the API, then forget the session locally regardless of the
    /// outcome.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self.inner.auth.logout().await {
            warn!(error = %e, "API logout failed");
        }
        self.inner.session.clear();
        clear_sentry_user();
        self.set_state(AuthState::Anonymous).await;
        info!("Logged out");
    }

    /// Fetch the profile and cache it as the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns the API error; the cached state is left as it was.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<User> {
        let user = self.inner.auth.profile().await?.with_display_name();
        self.inner.session.set_user(&user);
        set_sentry_user(&user.id, Some(&user.email));
        debug!(user_id = %user.id, "Profile loaded");
        self.set_state(AuthState::Authenticated(user.clone())).await;
        Ok(user)
    }

    /// Save the shipping address, creating it on first use and replacing it
    /// afterwards, then refresh the profile.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when nobody is signed in, `Validation` for an
    /// incomplete form, otherwise the API error.
    #[instrument(skip(self, form))]
    pub async fn save_address(&self, form: &AddressForm) -> Result<User> {
        let Some(user) = self.user().await else {
            return Err(ApiError::Unauthorized("Please sign in first".to_string()));
        };
        let address = form.validate()?;

        if user.shipping_address().is_some() {
            self.inner.address.update(&address).await?;
        } else {
            self.inner.address.add(&address).await?;
        }
        self.get_profile().await
    }

    /// Drop to `Anonymous` if the session was cleared behind this store's
    /// back (for example by a 401 on another request).
    pub async fn sync_with_session(&self) -> AuthState {
        let expired = match self.inner.events.lock() {
            Ok(mut events) => {
                let mut expired = false;
                loop {
                    match events.try_recv() {
                        Ok(SessionEvent::Expired) => expired = true,
                        Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                        Err(_) => break,
                    }
                }
                expired
            }
            Err(_) => false,
        };

        if (expired || !self.inner.session.is_authenticated()) && self.is_authenticated().await {
            debug!("Session gone, dropping to anonymous");
            clear_sentry_user();
            return self.set_state(AuthState::Anonymous).await;
        }
        self.state().await
    }

    /// Follow session expiry in the background until the client is dropped.
    pub fn spawn_session_watcher(&self, client: &ApiClient) -> tokio::task::JoinHandle<()> {
        let mut events = client.subscribe();
        let this = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::Expired) => {
                        this.sync_with_session().await;
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    async fn set_state(&self, state: AuthState) -> AuthState {
        let mut current = self.inner.state.write().await;
        *current = state;
        current.clone()
    }
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::session::StoredSession;
    use crate::storage::MemoryStorage;

    /// A client pointed at a port nothing listens on.
    fn offline_client() -> ApiClient {
        let config = ClientConfig::new("http://127.0.0.1:9/api").unwrap();
        let session = StoredSession::new(Arc::new(MemoryStorage::new()), chrono::Duration::days(7));
        ApiClient::new(&config, Arc::new(session)).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_without_token_is_anonymous() {
        let store = AuthStore::new(offline_client());
        assert!(store.state().await.is_loading());
        assert_eq!(store.initialize().await, AuthState::Anonymous);
    }

    #[tokio::test]
    async fn test_login_validates_before_network() {
        let store = AuthStore::new(offline_client());
        let err = store.login("", "secret").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.user_message(), "Email and password are required");
    }

    #[tokio::test]
    async fn test_signup_requires_all_fields() {
        let store = AuthStore::new(offline_client());
        let err = store.signup("Ada", "", "a@b.co", "pw").await.unwrap_err();
        assert_eq!(err.user_message(), "All fields are required");
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_api_unreachable() {
        let client = offline_client();
        client.session().set_token(SecretString::from("tok"));
        let store = AuthStore::new(client.clone());

        store.logout().await;
        assert_eq!(store.state().await, AuthState::Anonymous);
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_initialize_with_unusable_token_clears_session() {
        let client = offline_client();
        client.session().set_token(SecretString::from("tok"));
        let store = AuthStore::new(client.clone());

        assert_eq!(store.initialize().await, AuthState::Anonymous);
        assert!(client.session().token().is_none());
    }

    #[tokio::test]
    async fn test_save_address_requires_user() {
        let store = AuthStore::new(offline_client());
        let err = store.save_address(&AddressForm::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }
}

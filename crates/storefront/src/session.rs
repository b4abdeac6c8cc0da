//! Session persistence: the bearer token and a mirror of the signed-in user.
//!
//! The token is what authenticates requests; the mirrored user lets guards
//! make a role decision without a network call. Both expire together after
//! the configured TTL.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use marketstall_core::User;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::storage::Storage;

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "auth-token";
/// Storage key for the mirrored user.
pub const USER_KEY: &str = "user";

/// Broadcast when session state changes outside a store's own actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The API rejected the token (401) and the session was cleared.
    Expired,
}

/// Where the session token and user mirror live.
pub trait SessionStore: Send + Sync {
    /// The current, unexpired token.
    fn token(&self) -> Option<SecretString>;

    fn set_token(&self, token: SecretString);

    /// The mirrored user, if a session exists.
    fn user(&self) -> Option<User>;

    fn set_user(&self, user: &User);

    /// Forget token and user.
    fn clear(&self);

    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Expiring<T> {
    value: T,
    expires_at: DateTime<Utc>,
}

/// [`SessionStore`] backed by a [`Storage`].
///
/// Storage failures are logged and treated as "no session".
#[derive(Clone)]
pub struct StoredSession {
    storage: Arc<dyn Storage>,
    ttl: chrono::Duration,
}

impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("token", &self.token().map(|_| "[REDACTED]"))
            .field("ttl_days", &self.ttl.num_days())
            .finish_non_exhaustive()
    }
}

impl StoredSession {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, ttl: chrono::Duration) -> Self {
        Self { storage, ttl }
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.storage.read(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read session record");
                return None;
            }
        };

        let record: Expiring<T> = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding malformed session record");
                self.remove(key);
                return None;
            }
        };

        if record.expires_at <= Utc::now() {
            tracing::debug!(key, "Session record expired");
            self.remove(key);
            return None;
        }
        Some(record.value)
    }

    fn save<T: Serialize>(&self, key: &str, value: T) {
        let record = Expiring {
            value,
            expires_at: Utc::now() + self.ttl,
        };
        let result = serde_json::to_string(&record)
            .map_err(|e| e.to_string())
            .and_then(|json| self.storage.write(key, &json).map_err(|e| e.to_string()));
        if let Err(error) = result {
            tracing::warn!(key, %error, "Failed to persist session record");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            tracing::warn!(key, error = %e, "Failed to remove session record");
        }
    }
}

impl SessionStore for StoredSession {
    fn token(&self) -> Option<SecretString> {
        self.load::<String>(TOKEN_KEY).map(SecretString::from)
    }

    fn set_token(&self, token: SecretString) {
        use secrecy::ExposeSecret;
        self.save(TOKEN_KEY, token.expose_secret());
    }

    fn user(&self) -> Option<User> {
        self.load(USER_KEY)
    }

    fn set_user(&self, user: &User) {
        self.save(USER_KEY, user);
    }

    fn clear(&self) {
        self.remove(TOKEN_KEY);
        self.remove(USER_KEY);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use crate::storage::MemoryStorage;

    fn session(ttl: chrono::Duration) -> (Arc<MemoryStorage>, StoredSession) {
        let storage = Arc::new(MemoryStorage::new());
        let session = StoredSession::new(storage.clone(), ttl);
        (storage, session)
    }

    #[test]
    fn test_token_roundtrip_and_clear() {
        let (_, session) = session(chrono::Duration::days(7));
        assert!(!session.is_authenticated());

        session.set_token(SecretString::from("tok-123"));
        assert_eq!(session.token().unwrap().expose_secret(), "tok-123");

        session.clear();
        assert!(session.token().is_none());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_expired_token_is_dropped() {
        let (storage, session) = session(chrono::Duration::seconds(-1));
        session.set_token(SecretString::from("stale"));
        assert!(session.token().is_none());
        assert_eq!(storage.read(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_malformed_record_is_discarded() {
        let (storage, session) = session(chrono::Duration::days(7));
        storage.write(USER_KEY, "not json").unwrap();
        assert!(session.user().is_none());
        assert_eq!(storage.read(USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_debug_redacts_token() {
        let (_, session) = session(chrono::Duration::days(7));
        session.set_token(SecretString::from("super-secret"));
        let debug = format!("{session:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}

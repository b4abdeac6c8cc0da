//! Access checks run before protected views.
//!
//! Decisions are local: the token's `exp` claim and the mirrored user's role
//! are read from the session store without calling the API. The API still
//! authorizes every request; these checks only keep the UI honest.
//!
//! Every failure clears the session, so a rejected visitor starts over at
//! the login screen.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use marketstall_core::User;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::session::SessionStore;

/// Why access was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("Not signed in")]
    NoSession,

    #[error("Session token is malformed")]
    MalformedToken,

    #[error("Session has expired")]
    Expired,

    #[error("Admin access required")]
    NotAdmin,
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Token lifetime as read from its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenAge {
    Valid,
    Expired,
    Malformed,
}

/// Read `exp` from a JWT payload. Tokens without `exp` never expire here.
fn token_age(token: &str, now_secs: i64) -> TokenAge {
    let Some(payload) = token.split('.').nth(1) else {
        return TokenAge::Malformed;
    };
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) else {
        return TokenAge::Malformed;
    };
    let Ok(claims) = serde_json::from_slice::<Claims>(&bytes) else {
        return TokenAge::Malformed;
    };

    match claims.exp {
        Some(exp) if now_secs >= exp => TokenAge::Expired,
        _ => TokenAge::Valid,
    }
}

/// Require a signed-in user with an unexpired token.
///
/// # Errors
///
/// Returns the reason access was denied. The session is cleared first.
pub fn require_session(session: &dyn SessionStore) -> Result<User, AccessDenied> {
    check_session(session).inspect_err(|reason| {
        warn!(%reason, "Access denied, clearing session");
        session.clear();
    })
}

/// Require a signed-in admin.
///
/// # Errors
///
/// Returns the reason access was denied. The session is cleared first.
pub fn require_admin(session: &dyn SessionStore) -> Result<User, AccessDenied> {
    check_session(session)
        .and_then(|user| {
            if user.is_admin() {
                Ok(user)
            } else {
                Err(AccessDenied::NotAdmin)
            }
        })
        .inspect_err(|reason| {
            warn!(%reason, "Admin access denied, clearing session");
            session.clear();
        })
}

fn check_session(session: &dyn SessionStore) -> Result<User, AccessDenied> {
    let token = session.token().ok_or(AccessDenied::NoSession)?;
    match token_age(token.expose_secret(), Utc::now().timestamp()) {
        TokenAge::Valid => {}
        TokenAge::Expired => return Err(AccessDenied::Expired),
        TokenAge::Malformed => return Err(AccessDenied::MalformedToken),
    }

    let user = session.user().ok_or(AccessDenied::NoSession)?;
    debug!(user_id = %user.id, role = %user.role, "Session accepted");
    Ok(user)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use marketstall_core::{UserId, UserRole};
    use secrecy::SecretString;

    use super::*;
    use crate::session::StoredSession;
    use crate::storage::MemoryStorage;

    fn jwt(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    fn user(role: UserRole) -> User {
        User {
            id: UserId::new("u1"),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: None,
            address: None,
            role,
            is_active: true,
            email_verified: true,
            created_at: None,
            name: None,
        }
    }

    fn session_with(token: &str, role: UserRole) -> StoredSession {
        let session = StoredSession::new(Arc::new(MemoryStorage::new()), chrono::Duration::days(7));
        session.set_token(SecretString::from(token.to_string()));
        session.set_user(&user(role));
        session
    }

    #[test]
    fn test_token_age() {
        assert_eq!(token_age(&jwt(r#"{"exp": 100}"#), 99), TokenAge::Valid);
        assert_eq!(token_age(&jwt(r#"{"exp": 100}"#), 100), TokenAge::Expired);
        assert_eq!(token_age(&jwt(r#"{"sub": "u1"}"#), 1_000_000), TokenAge::Valid);
        assert_eq!(token_age("not-a-jwt", 0), TokenAge::Malformed);
        assert_eq!(token_age("a.!!!.c", 0), TokenAge::Malformed);
    }

    #[test]
    fn test_admin_passes() {
        let exp = Utc::now().timestamp() + 3600;
        let session = session_with(&jwt(&format!(r#"{{"exp": {exp}}}"#)), UserRole::Admin);
        assert_eq!(require_admin(&session).unwrap().id, UserId::new("u1"));
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_customer_is_refused_and_session_cleared() {
        let session = session_with(&jwt(r#"{"sub": "u1"}"#), UserRole::Customer);
        assert!(require_session(&session).is_ok());
        assert_eq!(require_admin(&session), Err(AccessDenied::NotAdmin));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_expired_token_is_refused() {
        let session = session_with(&jwt(r#"{"exp": 1}"#), UserRole::Admin);
        assert_eq!(require_admin(&session), Err(AccessDenied::Expired));
        assert!(session.user().is_none());
    }

    #[test]
    fn test_malformed_token_is_refused() {
        let session = session_with("garbage", UserRole::Admin);
        assert_eq!(require_session(&session), Err(AccessDenied::MalformedToken));
    }

    #[test]
    fn test_no_session() {
        let session = StoredSession::new(Arc::new(MemoryStorage::new()), chrono::Duration::days(7));
        assert_eq!(require_session(&session), Err(AccessDenied::NoSession));
    }
}

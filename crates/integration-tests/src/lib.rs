//! Shared fixtures for the integration tests.
//!
//! Each test builds an axum router standing in for the Marketstall API,
//! binds it to `127.0.0.1:0` and points a real client at it.
//!
//! ```bash
//! cargo test -p marketstall-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};

use axum::Router;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use marketstall_core::{User, UserRole};
use marketstall_storefront::notify::RecordingNotifier;
use marketstall_storefront::session::SessionStore;
use marketstall_storefront::storage::MemoryStorage;
use marketstall_storefront::stores::MutationPolicy;
use marketstall_storefront::{ClientConfig, Storefront};
use secrecy::SecretString;
use serde_json::{Value, json};

/// Bind to port 0, serve `app`, and return the API base URL.
pub async fn start_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// A storefront against `base_url` with in-memory storage.
pub fn storefront(base_url: &str) -> (Storefront, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let storefront = Storefront::new(
        ClientConfig::new(base_url).unwrap(),
        Arc::new(MemoryStorage::new()),
        notifier.clone(),
        MutationPolicy::Strict,
    )
    .unwrap();
    (storefront, notifier)
}

/// An unsigned token whose `exp` is `secs_from_now` seconds away.
pub fn jwt(secs_from_now: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + secs_from_now;
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u1","exp":{exp}}}"#))
    )
}

pub fn user_json(role: UserRole) -> Value {
    json!({
        "id": "u1",
        "email": "ada@example.com",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "role": role.to_string(),
        "isActive": true,
    })
}

/// Sign `storefront` in without going through the API.
pub fn sign_in(storefront: &Storefront, role: UserRole) {
    let session = storefront.client().session();
    session.set_token(SecretString::from(jwt(3600)));
    let user: User = serde_json::from_value(user_json(role)).unwrap();
    session.set_user(&user);
}

pub fn product_json(id: &str, name: &str, price: f64, quantity: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} for testing"),
        "category": "electronics",
        "images": [format!("https://cdn.example.com/{id}.jpg")],
        "price": price,
        "quantity": quantity,
        "published": true,
        "featured": false,
    })
}

pub fn order_json(id: &str, status: &str, total: f64) -> Value {
    json!({
        "id": id,
        "userId": "u1",
        "items": [
            {"productId": "p1", "name": "Mug", "price": total, "quantity": 1}
        ],
        "address": {"street": "1 High St", "city": "Leeds", "postCode": "LS1", "country": "UK"},
        "status": status,
        "total": total,
        "customerEmail": "ada@example.com",
    })
}

/// `{success, data}`.
pub fn envelope(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

/// Request log shared between a mock router and the test body.
#[derive(Clone, Default)]
pub struct Hits(Arc<Mutex<Vec<String>>>);

impl Hits {
    pub fn record(&self, hit: impl Into<String>) {
        self.0.lock().unwrap().push(hit.into());
    }

    #[must_use]
    pub fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    #[must_use]
    pub fn count(&self, prefix: &str) -> usize {
        self.all().iter().filter(|h| h.starts_with(prefix)).count()
    }
}

//! Admin console state shared across admin views.

use std::sync::Arc;

use marketstall_core::User;
use marketstall_storefront::guard::require_admin;
use marketstall_storefront::http::ApiClient;
use marketstall_storefront::notify::Notifier;
use marketstall_storefront::services::CatalogService;
use marketstall_storefront::Storefront;
use tracing::info;

use crate::error::Result;
use crate::stores::{AdminDashboardStore, AdminOrderStore, AdminProductStore, AdminUserStore};

/// Every admin store, wired to one client and opened for one admin.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AdminConsole {
    inner: Arc<AdminConsoleInner>,
}

struct AdminConsoleInner {
    admin: User,
    products: AdminProductStore,
    orders: AdminOrderStore,
    users: AdminUserStore,
    dashboard: AdminDashboardStore,
}

impl AdminConsole {
    /// Check the client's session for an admin, then build the stores.
    ///
    /// # Errors
    ///
    /// `AdminError::Denied` if the session is missing, expired or not an
    /// admin's. The session has been cleared in that case.
    pub fn open(client: &ApiClient, notifier: Arc<dyn Notifier>) -> Result<Self> {
        Self::build(client, notifier, None)
    }

    /// [`AdminConsole::open`] on a storefront's client. Product mutations
    /// also evict the storefront's cached product details.
    ///
    /// # Errors
    ///
    /// As [`AdminConsole::open`].
    pub fn for_storefront(app: &Storefront) -> Result<Self> {
        Self::build(
            app.client(),
            Arc::clone(app.notifier()),
            Some(app.catalog().source().clone()),
        )
    }

    fn build(
        client: &ApiClient,
        notifier: Arc<dyn Notifier>,
        catalog: Option<CatalogService>,
    ) -> Result<Self> {
        let admin = require_admin(client.session().as_ref())?;
        info!(user_id = %admin.id, "Admin console opened");

        let products = match catalog {
            Some(catalog) => {
                AdminProductStore::with_catalog(client.clone(), Arc::clone(&notifier), catalog)
            }
            None => AdminProductStore::new(client.clone(), Arc::clone(&notifier)),
        };

        Ok(Self {
            inner: Arc::new(AdminConsoleInner {
                products,
                orders: AdminOrderStore::new(client.clone(), notifier),
                users: AdminUserStore::new(client.clone()),
                dashboard: AdminDashboardStore::new(client.clone()),
                admin,
            }),
        })
    }

    /// The admin the console was opened for.
    #[must_use]
    pub fn admin(&self) -> &User {
        &self.inner.admin
    }

    #[must_use]
    pub fn products(&self) -> &AdminProductStore {
        &self.inner.products
    }

    #[must_use]
    pub fn orders(&self) -> &AdminOrderStore {
        &self.inner.orders
    }

    #[must_use]
    pub fn users(&self) -> &AdminUserStore {
        &self.inner.users
    }

    #[must_use]
    pub fn dashboard(&self) -> &AdminDashboardStore {
        &self.inner.dashboard
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marketstall_storefront::ClientConfig;
    use marketstall_storefront::guard::AccessDenied;
    use marketstall_storefront::notify::RecordingNotifier;
    use marketstall_storefront::session::{SessionStore, StoredSession};
    use marketstall_storefront::storage::MemoryStorage;

    use super::*;
    use crate::error::AdminError;

    #[test]
    fn test_open_without_session_is_denied() {
        let config = ClientConfig::new("http://127.0.0.1:9/api").unwrap();
        let session = StoredSession::new(Arc::new(MemoryStorage::new()), chrono::Duration::days(7));
        let client = ApiClient::new(&config, Arc::new(session)).unwrap();

        let err = AdminConsole::open(&client, Arc::new(RecordingNotifier::new()))
            .err()
            .unwrap();
        assert!(matches!(err, AdminError::Denied(AccessDenied::NoSession)));
        assert!(!client.session().is_authenticated());
    }
}

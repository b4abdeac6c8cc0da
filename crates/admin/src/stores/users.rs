//! Admin user search and detail.

use std::sync::Arc;

use marketstall_core::{User, UserId, UserRole};
use marketstall_storefront::http::ApiClient;
use marketstall_storefront::listing::{ListController, ListOptions, Refresh, USERS_DEBOUNCE};
use tokio::sync::RwLock;
use tracing::{instrument, warn};

use crate::services::{AdminUserService, UserDetail, UserStatusFilter};

/// Users per page in the admin list.
pub const ADMIN_USERS_PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone, Default)]
pub struct AdminUserDetailState {
    pub detail: Option<UserDetail>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct AdminUserStore {
    list: ListController<AdminUserService>,
    detail: Arc<RwLock<AdminUserDetailState>>,
}

impl AdminUserStore {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            list: ListController::new(
                AdminUserService::new(client),
                ListOptions::new(ADMIN_USERS_PAGE_SIZE, USERS_DEBOUNCE),
            ),
            detail: Arc::new(RwLock::new(AdminUserDetailState::default())),
        }
    }

    #[must_use]
    pub const fn list(&self) -> &ListController<AdminUserService> {
        &self.list
    }

    pub async fn filter_role(&self, role: Option<UserRole>) -> Refresh {
        self.list.update_filter(|f| f.role = role).await
    }

    pub async fn filter_status(&self, status: Option<UserStatusFilter>) -> Refresh {
        self.list.update_filter(|f| f.status = status).await
    }

    /// Drop search and filters and fetch page 1.
    pub async fn clear_filters(&self) -> Refresh {
        self.list.reset().await;
        self.list.refresh().await
    }

    pub async fn detail(&self) -> AdminUserDetailState {
        self.detail.read().await.clone()
    }

    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn fetch_user(&self, id: &UserId) {
        {
            let mut state = self.detail.write().await;
            state.loading = true;
            state.error = None;
        }

        let result = self.list.source().get(id).await;

        let mut state = self.detail.write().await;
        state.loading = false;
        match result {
            Ok(detail) => state.detail = Some(detail),
            Err(e) => {
                warn!(error = %e, "Failed to fetch user");
                state.detail = None;
                state.error = Some(e.user_message());
            }
        }
    }

    /// Close the detail view.
    pub async fn close(&self) {
        *self.detail.write().await = AdminUserDetailState::default();
    }

    /// The user shown in the detail view, if any.
    pub async fn selected(&self) -> Option<User> {
        self.detail.read().await.detail.as_ref().map(|d| d.user.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marketstall_storefront::ClientConfig;
    use marketstall_storefront::session::StoredSession;
    use marketstall_storefront::storage::MemoryStorage;

    use super::*;

    #[tokio::test]
    async fn test_fetch_failure_and_close() {
        let config = ClientConfig::new("http://127.0.0.1:9/api").unwrap();
        let session = StoredSession::new(Arc::new(MemoryStorage::new()), chrono::Duration::days(7));
        let store = AdminUserStore::new(ApiClient::new(&config, Arc::new(session)).unwrap());

        assert_eq!(store.list().options().limit, ADMIN_USERS_PAGE_SIZE);

        store.fetch_user(&UserId::new("u1")).await;
        let state = store.detail().await;
        assert!(!state.loading);
        assert!(state.error.is_some());
        assert!(store.selected().await.is_none());

        store.close().await;
        assert!(store.detail().await.error.is_none());
    }
}

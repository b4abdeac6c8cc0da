//! Admin dashboard figures.

use std::sync::Arc;

use marketstall_core::DashboardStats;
use marketstall_storefront::http::ApiClient;
use tokio::sync::RwLock;
use tracing::{instrument, warn};

use crate::services::DashboardService;

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub stats: Option<DashboardStats>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct AdminDashboardStore {
    service: DashboardService,
    state: Arc<RwLock<DashboardState>>,
}

impl AdminDashboardStore {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            service: DashboardService::new(client),
            state: Arc::new(RwLock::new(DashboardState::default())),
        }
    }

    pub async fn state(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    /// Fetch the figures. Previous figures stay visible if this fails.
    #[instrument(skip(self))]
    pub async fn fetch_stats(&self) {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let result = self.service.stats().await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(stats) => state.stats = Some(stats),
            Err(e) => {
                warn!(error = %e, "Failed to fetch dashboard statistics");
                e.capture();
                state.error = Some("Failed to fetch dashboard statistics".to_string());
            }
        }
    }

    pub async fn reset(&self) {
        *self.state.write().await = DashboardState::default();
    }
}

//! `GET /admin/dashboard`.

use marketstall_core::DashboardStats;
use marketstall_storefront::Result;
use marketstall_storefront::http::{ApiClient, ApiEnvelope};
use tracing::instrument;

#[derive(Clone)]
pub struct DashboardService {
    client: ApiClient,
}

impl DashboardService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<DashboardStats> {
        let response: ApiEnvelope<DashboardStats> = self.client.get("/admin/dashboard", &[]).await?;
        Ok(response.data)
    }
}

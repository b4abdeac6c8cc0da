//! Admin user search and detail.

use chrono::{DateTime, Utc};
use marketstall_core::{Page, User, UserId, UserRole};
use marketstall_storefront::Result;
use marketstall_storefront::http::{ApiClient, ApiEnvelope, segment};
use marketstall_storefront::listing::{ListQuery, ListSource};
use serde::Deserialize;
use tracing::instrument;

/// Account status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatusFilter {
    Active,
    Inactive,
}

impl UserStatusFilter {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl std::str::FromStr for UserStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("invalid user status: {s}")),
        }
    }
}

/// Filters for the user search. `None` means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminUserFilter {
    pub role: Option<UserRole>,
    pub status: Option<UserStatusFilter>,
}

#[derive(Deserialize)]
struct UserSearchData {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    pagination: UserPagination,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserPagination {
    #[serde(default = "first_page")]
    current_page: u32,
    #[serde(default = "first_page")]
    total_pages: u32,
    #[serde(default, alias = "totalUsers")]
    total: Option<u64>,
    #[serde(default, alias = "usersPerPage")]
    limit: Option<u32>,
}

impl Default for UserPagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total: None,
            limit: None,
        }
    }
}

const fn first_page() -> u32 {
    1
}

/// Derived account facts shown next to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalytics {
    /// Days since the account was created.
    #[serde(default)]
    pub account_age: Option<i64>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// `data` of `GET /admin/users/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserDetail {
    pub user: User,
    #[serde(default)]
    pub analytics: Option<UserAnalytics>,
}

/// `/admin/users` endpoints.
#[derive(Clone)]
pub struct AdminUserService {
    client: ApiClient,
}

impl AdminUserService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /admin/users/search`.
    ///
    /// # Errors
    ///
    /// Returns the API error. Validation failures carry `details`, which
    /// [`marketstall_storefront::ApiError::user_message`] prefers.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &ListQuery<AdminUserFilter>) -> Result<Page<User>> {
        let mut params = query.base_params();
        if let Some(role) = query.filter.role {
            params.push(("role", role.to_string()));
        }
        if let Some(status) = query.filter.status {
            params.push(("status", status.as_str().to_string()));
        }

        let response: ApiEnvelope<UserSearchData> =
            self.client.get("/admin/users/search", &params).await?;
        let data = response.data;
        let total = data
            .pagination
            .total
            .unwrap_or_else(|| data.users.len() as u64);
        Ok(Page {
            current_page: data.pagination.current_page,
            total_pages: data.pagination.total_pages,
            total,
            limit: data.pagination.limit.unwrap_or(query.limit),
            items: data.users,
        })
    }

    /// `GET /admin/users/:id`.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get(&self, id: &UserId) -> Result<UserDetail> {
        let path = format!("/admin/users/{}", segment(id.as_str()));
        let response: ApiEnvelope<UserDetail> = self.client.get(&path, &[]).await?;
        Ok(UserDetail {
            user: response.data.user.with_display_name(),
            analytics: response.data.analytics,
        })
    }
}

impl ListSource for AdminUserService {
    type Item = User;
    type Filter = AdminUserFilter;

    async fn fetch(&self, query: &ListQuery<AdminUserFilter>) -> Result<Page<User>> {
        self.search(query).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_search_payload_without_totals() {
        let json = r#"{
            "users": [],
            "pagination": {"currentPage": 2, "totalPages": 4},
            "filters": {"role": "customer"}
        }"#;
        let data: UserSearchData = serde_json::from_str(json).unwrap();
        assert_eq!(data.pagination.current_page, 2);
        assert!(data.pagination.total.is_none());
    }

    #[test]
    fn test_user_detail_with_analytics() {
        let json = r#"{
            "user": {"id": "u1", "email": "a@b.co", "firstName": "A", "lastName": "B", "role": "customer"},
            "analytics": {"accountAge": 12, "lastUpdated": "2024-06-01T08:00:00Z"}
        }"#;
        let detail: UserDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.analytics.unwrap().account_age, Some(12));
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("inactive".parse::<UserStatusFilter>(), Ok(UserStatusFilter::Inactive));
        assert!("banned".parse::<UserStatusFilter>().is_err());
    }
}

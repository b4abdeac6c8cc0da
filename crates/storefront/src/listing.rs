//! Paginated list views with debounced search and request sequencing.
//!
//! A [`ListController`] owns the state of one list screen (catalog, admin
//! products, orders, users). Every fetch takes a ticket from a monotonic
//! counter; a response whose ticket is no longer the latest is dropped, so
//! the most recently issued request always wins regardless of arrival order.
//!
//! Search input is debounced: each keystroke restarts the timer and only the
//! value present when the timer fires is applied. Terms shorter than
//! [`MIN_SEARCH_LEN`] characters (after trimming) mean "no search".

use std::fmt::Debug;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use marketstall_core::Page;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::ApiError;

/// Shortest search term that is sent to the API.
pub const MIN_SEARCH_LEN: usize = 2;

/// Debounce for catalog and product searches.
pub const CATALOG_DEBOUNCE: Duration = Duration::from_millis(500);
/// Debounce for order searches.
pub const ORDERS_DEBOUNCE: Duration = Duration::from_millis(500);
/// Debounce for user searches.
pub const USERS_DEBOUNCE: Duration = Duration::from_millis(300);

/// What a list fetch asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery<F> {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub filter: F,
}

impl<F> ListQuery<F> {
    /// `page`, `limit` and (when set) `search` as query parameters.
    #[must_use]
    pub fn base_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}

/// A paginated, filterable API listing.
pub trait ListSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;
    type Filter: Clone + Default + PartialEq + Debug + Send + Sync + 'static;

    fn fetch(
        &self,
        query: &ListQuery<Self::Filter>,
    ) -> impl Future<Output = Result<Page<Self::Item>, ApiError>> + Send;
}

/// Per-list tuning.
#[derive(Debug, Clone, Copy)]
pub struct ListOptions {
    pub limit: u32,
    pub debounce: Duration,
    pub min_search_len: usize,
}

impl ListOptions {
    #[must_use]
    pub const fn new(limit: u32, debounce: Duration) -> Self {
        Self {
            limit,
            debounce,
            min_search_len: MIN_SEARCH_LEN,
        }
    }
}

/// Snapshot of a list view.
#[derive(Debug, Clone)]
pub struct ListState<T, F> {
    pub items: Vec<T>,
    pub filter: F,
    pub page: u32,
    pub limit: u32,
    /// The search term currently applied (not the raw input).
    pub search: Option<String>,
    pub total_pages: u32,
    pub total: u64,
    pub loading: bool,
    pub error: Option<String>,
    /// Whether any fetch has completed successfully.
    pub loaded: bool,
}

impl<T, F: Default> ListState<T, F> {
    fn initial(options: &ListOptions) -> Self {
        Self {
            items: Vec::new(),
            filter: F::default(),
            page: 1,
            limit: options.limit.max(1),
            search: None,
            total_pages: 0,
            total: 0,
            loading: false,
            error: None,
            loaded: false,
        }
    }
}

impl<T, F> ListState<T, F> {
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Outcome of a state change that may trigger a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// The response was applied to the state.
    Applied,
    /// The request failed; the error is in the state.
    Failed,
    /// A newer request was issued meanwhile; the response was dropped.
    Superseded,
    /// Nothing changed, so nothing was fetched.
    Skipped,
}

/// Trim and apply the minimum length.
#[must_use]
pub fn effective_search(raw: &str, min_len: usize) -> Option<String> {
    let trimmed = raw.trim();
    (trimmed.chars().count() >= min_len).then(|| trimmed.to_string())
}

// =============================================================================
// ListController
// =============================================================================

/// Coordinates one list view against a [`ListSource`].
pub struct ListController<S: ListSource> {
    inner: Arc<ListInner<S>>,
}

impl<S: ListSource> Clone for ListController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ListInner<S: ListSource> {
    source: S,
    options: ListOptions,
    state: RwLock<ListState<S::Item, S::Filter>>,
    ticket: AtomicU64,
    pending_search: Mutex<Option<JoinHandle<()>>>,
}

impl<S: ListSource> ListController<S> {
    #[must_use]
    pub fn new(source: S, options: ListOptions) -> Self {
        Self {
            inner: Arc::new(ListInner {
                source,
                options,
                state: RwLock::new(ListState::initial(&options)),
                ticket: AtomicU64::new(0),
                pending_search: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.inner.source
    }

    #[must_use]
    pub fn options(&self) -> &ListOptions {
        &self.inner.options
    }

    /// Clone of the current state.
    pub async fn state(&self) -> ListState<S::Item, S::Filter> {
        self.inner.state.read().await.clone()
    }

    pub async fn items(&self) -> Vec<S::Item> {
        self.inner.state.read().await.items.clone()
    }

    /// Fetch with the current parameters. This is also the manual retry.
    pub async fn refresh(&self) -> Refresh {
        self.fetch().await
    }

    /// Record a keystroke. The search is applied once input has been quiet
    /// for the configured debounce period.
    pub fn input_search(&self, raw: impl Into<String>) {
        let raw = raw.into();
        let this = self.clone();
        let delay = self.inner.options.debounce;

        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detach the fetch so a later keystroke only cancels the timer.
            tokio::spawn(async move {
                this.apply_search(&raw).await;
            });
        });

        match self.inner.pending_search.lock() {
            Ok(mut pending) => {
                if let Some(previous) = pending.replace(timer) {
                    previous.abort();
                }
            }
            Err(_) => warn!("Search debounce lock poisoned"),
        }
    }

    /// Drop any pending debounced search.
    pub fn cancel_pending_search(&self) {
        if let Ok(mut pending) = self.inner.pending_search.lock()
            && let Some(timer) = pending.take()
        {
            timer.abort();
        }
    }

    /// Apply a search term immediately. Fetches only if the effective term
    /// differs from the applied one; resets to page 1.
    pub async fn apply_search(&self, raw: &str) -> Refresh {
        let search = effective_search(raw, self.inner.options.min_search_len);
        {
            let mut state = self.inner.state.write().await;
            if state.search == search {
                return Refresh::Skipped;
            }
            debug!(search = ?search, "Applying search");
            state.search = search;
            state.page = 1;
        }
        self.fetch().await
    }

    /// Replace the filter; resets to page 1.
    pub async fn set_filter(&self, filter: S::Filter) -> Refresh {
        {
            let mut state = self.inner.state.write().await;
            if state.filter == filter {
                return Refresh::Skipped;
            }
            state.filter = filter;
            state.page = 1;
        }
        self.fetch().await
    }

    /// Modify the filter in place; resets to page 1 if it changed.
    pub async fn update_filter(&self, update: impl FnOnce(&mut S::Filter)) -> Refresh {
        let mut filter = self.inner.state.read().await.filter.clone();
        update(&mut filter);
        self.set_filter(filter).await
    }

    /// Go to `page` (1-based).
    pub async fn set_page(&self, page: u32) -> Refresh {
        let page = page.max(1);
        {
            let mut state = self.inner.state.write().await;
            if state.page == page {
                return Refresh::Skipped;
            }
            state.page = page;
        }
        self.fetch().await
    }

    /// Change the page size; resets to page 1.
    pub async fn set_limit(&self, limit: u32) -> Refresh {
        let limit = limit.max(1);
        {
            let mut state = self.inner.state.write().await;
            if state.limit == limit {
                return Refresh::Skipped;
            }
            state.limit = limit;
            state.page = 1;
        }
        self.fetch().await
    }

    /// Fetch `page` with `limit`, even if both are unchanged.
    pub async fn load(&self, page: u32, limit: u32) -> Refresh {
        {
            let mut state = self.inner.state.write().await;
            state.page = page.max(1);
            state.limit = limit.max(1);
        }
        self.fetch().await
    }

    /// Set page, limit, search and filter together, then fetch once.
    ///
    /// The search term goes through the same minimum-length rule as typed
    /// input.
    pub async fn load_query(&self, query: ListQuery<S::Filter>) -> Refresh {
        self.cancel_pending_search();
        {
            let mut state = self.inner.state.write().await;
            state.page = query.page.max(1);
            state.limit = query.limit.max(1);
            state.search = query
                .search
                .as_deref()
                .and_then(|raw| effective_search(raw, self.inner.options.min_search_len));
            state.filter = query.filter;
        }
        self.fetch().await
    }

    /// Back to the initial state. In-flight responses are dropped.
    pub async fn reset(&self) {
        self.cancel_pending_search();
        let mut state = self.inner.state.write().await;
        self.inner.ticket.fetch_add(1, Ordering::SeqCst);
        *state = ListState::initial(&self.inner.options);
    }

    /// Replace the first row matching `matches` with `item`.
    ///
    /// Returns whether a row was replaced.
    pub async fn replace_item(&self, matches: impl Fn(&S::Item) -> bool, item: S::Item) -> bool {
        let mut state = self.inner.state.write().await;
        state
            .items
            .iter_mut()
            .find(|row| matches(row))
            .map(|row| *row = item)
            .is_some()
    }

    /// Drop rows matching `matches`. Returns how many were removed.
    pub async fn remove_items(&self, matches: impl Fn(&S::Item) -> bool) -> usize {
        let mut state = self.inner.state.write().await;
        let before = state.items.len();
        state.items.retain(|row| !matches(row));
        let removed = before - state.items.len();
        state.total = state.total.saturating_sub(removed as u64);
        removed
    }

    async fn fetch(&self) -> Refresh {
        let (ticket, query) = {
            let mut state = self.inner.state.write().await;
            let ticket = self.inner.ticket.fetch_add(1, Ordering::SeqCst) + 1;
            state.loading = true;
            let query = ListQuery {
                page: state.page,
                limit: state.limit,
                search: state.search.clone(),
                filter: state.filter.clone(),
            };
            (ticket, query)
        };

        let result = self.inner.source.fetch(&query).await;

        let mut state = self.inner.state.write().await;
        if self.inner.ticket.load(Ordering::SeqCst) != ticket {
            debug!(ticket, page = query.page, "Discarding superseded list response");
            return Refresh::Superseded;
        }

        state.loading = false;
        match result {
            Ok(page) => {
                state.items = page.items;
                state.total_pages = page.total_pages;
                state.total = page.total;
                state.error = None;
                state.loaded = true;
                Refresh::Applied
            }
            Err(err) => {
                warn!(error = %err, page = query.page, "List fetch failed");
                state.error = Some(err.user_message());
                Refresh::Failed
            }
        }
    }
}

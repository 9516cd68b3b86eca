//! Filter/sort/page state and fetch triggering.
//!
//! The [`QueryController`] exclusively owns the [`TaskQuery`] and is the
//! sole trigger for task collection fetches. Any filter or sort change
//! resets the page to 1; only an explicit page change sets the page
//! independently. Every state mutation issues exactly one fetch with the
//! resulting state — there is no debouncing, so two rapid changes mean
//! two in-flight fetches, ordered at the store by their sequence tags.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use taskhub_api::query::{TaskQuery, TaskSort};
use taskhub_api::task::{TaskPriority, TaskStatus};

use crate::gateway::Gateway;
use crate::store::DomainStore;

/// Capacity of the sync event channel.
const EVENT_BUFFER: usize = 64;

/// The user-facing filter triple: everything except pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskFilter {
    /// Restrict to one status, or `None` for all.
    pub status: Option<TaskStatus>,
    /// Restrict to one priority, or `None` for all.
    pub priority: Option<TaskPriority>,
    /// Sort order.
    pub sort: TaskSort,
}

/// Returns `query` with the filter replaced and the page forced back to 1.
///
/// Pure: the page-reset rule lives here so it can be checked in
/// isolation, independent of any gateway.
#[must_use]
pub fn apply_filter(query: &TaskQuery, filter: &TaskFilter) -> TaskQuery {
    TaskQuery {
        status: filter.status,
        priority: filter.priority,
        sort: filter.sort,
        page: 1,
        limit: query.limit,
    }
}

/// Returns `query` with only the page changed.
#[must_use]
pub fn apply_page(query: &TaskQuery, page: u32) -> TaskQuery {
    TaskQuery {
        page,
        ..query.clone()
    }
}

/// Notifications emitted around task fetches, for UI consumption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A fetch was issued.
    Loading,
    /// A fetch completed and was applied to the store.
    Refreshed {
        /// Total matching tasks reported by the server.
        total_tasks: u64,
    },
    /// A fetch failed and the failure was applied (collection cleared).
    Failed {
        /// The normalized error message.
        message: String,
    },
    /// A completed fetch was discarded because a newer one had already
    /// been applied.
    StaleDiscarded,
}

/// Owns the query state and drives task collection fetches.
pub struct QueryController<G: Gateway> {
    gateway: Arc<G>,
    store: Arc<DomainStore>,
    query: RwLock<TaskQuery>,
    events: mpsc::Sender<SyncEvent>,
}

impl<G: Gateway> QueryController<G> {
    /// Creates a controller and the receiver for its [`SyncEvent`]s.
    ///
    /// The caller should consume events from the returned receiver to
    /// drive UI updates; dropping it is harmless (emission is
    /// best-effort).
    #[must_use]
    pub fn new(gateway: Arc<G>, store: Arc<DomainStore>) -> (Self, mpsc::Receiver<SyncEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let controller = Self {
            gateway,
            store,
            query: RwLock::new(TaskQuery::default()),
            events: tx,
        };
        (controller, rx)
    }

    /// Returns a copy of the current query state.
    #[must_use]
    pub fn query(&self) -> TaskQuery {
        self.query.read().clone()
    }

    /// Overrides the page size used by subsequent fetches.
    pub fn set_limit(&self, limit: u32) {
        self.query.write().limit = limit.max(1);
    }

    /// Replaces the filter triple, resets the page to 1, and fetches.
    pub async fn set_filter(&self, filter: TaskFilter) {
        {
            let mut query = self.query.write();
            *query = apply_filter(&query, &filter);
        }
        self.fetch().await;
    }

    /// Moves to another page of the current filter and fetches.
    pub async fn set_page(&self, page: u32) {
        {
            let mut query = self.query.write();
            *query = apply_page(&query, page.max(1));
        }
        self.fetch().await;
    }

    /// Fetches with the current state unchanged — the initial load and
    /// the canonical refetch after a mutation.
    pub async fn refresh(&self) {
        self.fetch().await;
    }

    /// Issues one fetch: draw a sequence tag, snapshot the query, call
    /// the gateway, apply the outcome under that tag.
    async fn fetch(&self) {
        let seq = self.store.issue_task_fetch();
        let query = self.query();
        self.store.mark_tasks_loading();
        let _ = self.events.try_send(SyncEvent::Loading);

        match self.gateway.list_tasks(&query).await {
            Ok(response) => {
                let total_tasks = response.pagination.total_tasks;
                if self
                    .store
                    .replace_tasks(seq, response.tasks, response.pagination)
                {
                    let _ = self.events.try_send(SyncEvent::Refreshed { total_tasks });
                } else {
                    tracing::debug!(?seq, "discarded stale task fetch result");
                    let _ = self.events.try_send(SyncEvent::StaleDiscarded);
                }
            }
            Err(e) => {
                if self.store.fail_tasks(seq, e.message.clone()) {
                    tracing::warn!(error = %e, "task fetch failed");
                    let _ = self.events.try_send(SyncEvent::Failed { message: e.message });
                } else {
                    tracing::debug!(?seq, "discarded stale task fetch failure");
                    let _ = self.events.try_send(SyncEvent::StaleDiscarded);
                }
            }
        }
    }
}

//! In-memory mirror of the server-owned collections.
//!
//! The store is the single source of truth for everything a consumer
//! renders: the last-fetched task page, the last-fetched user list, and
//! the pagination metadata that came with the tasks. Fetches replace a
//! collection wholesale — there is no merge — so the only freshness
//! guarantee is "reflects the newest *completed* fetch, in issuance
//! order".
//!
//! # Stale-response discarding
//!
//! Fetches are asynchronous and may complete out of issuance order. Every
//! fetch draws a [`FetchSeq`] from the collection's gate at issuance time;
//! application takes the collection's write lock and rejects any response
//! whose sequence is not newer than the last one applied. Logout advances
//! the gates past every issued sequence, so responses that were in flight
//! when the session ended land in the bin instead of in a store that no
//! longer belongs to anyone.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use taskhub_api::task::{Pagination, Task, TaskFields, TaskId};
use taskhub_api::user::{Role, User, UserId};

/// Load state of a cached collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    /// Nothing fetched yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The collection reflects a completed fetch.
    Ready,
    /// The last fetch failed; the collection is empty.
    Failed,
}

/// Sequence tag drawn at fetch issuance, compared at application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchSeq(u64);

/// Issues monotonically increasing [`FetchSeq`] values.
#[derive(Debug, Default)]
struct SeqGate {
    next: AtomicU64,
}

impl SeqGate {
    fn issue(&self) -> FetchSeq {
        FetchSeq(self.next.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[derive(Debug, Default)]
struct TaskCollection {
    items: Vec<Task>,
    pagination: Pagination,
    phase: LoadPhase,
    error: Option<String>,
    last_applied: u64,
}

#[derive(Debug, Default)]
struct UserCollection {
    items: Vec<User>,
    phase: LoadPhase,
    error: Option<String>,
    last_applied: u64,
}

/// Read snapshot of the task collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TasksView {
    /// The current page of tasks, server-ordered.
    pub tasks: Vec<Task>,
    /// Metadata for the page, verbatim from the server.
    pub pagination: Pagination,
    /// Load state.
    pub phase: LoadPhase,
    /// Message of the last failed fetch, if the phase is [`LoadPhase::Failed`].
    pub error: Option<String>,
}

/// Read snapshot of the user collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsersView {
    /// All users known to the server (admin view).
    pub users: Vec<User>,
    /// Load state.
    pub phase: LoadPhase,
    /// Message of the last failed fetch, if the phase is [`LoadPhase::Failed`].
    pub error: Option<String>,
}

/// The client's in-memory mirror of the remote collections.
#[derive(Debug, Default)]
pub struct DomainStore {
    tasks: RwLock<TaskCollection>,
    users: RwLock<UserCollection>,
    task_gate: SeqGate,
    user_gate: SeqGate,
}

impl DomainStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- tasks -----------------------------------------------------------

    /// Draws a sequence tag for a task fetch about to be issued.
    pub fn issue_task_fetch(&self) -> FetchSeq {
        self.task_gate.issue()
    }

    /// Marks the task collection as loading. Called at issuance time, so
    /// issuance order equals call order.
    pub fn mark_tasks_loading(&self) {
        self.tasks.write().phase = LoadPhase::Loading;
    }

    /// Atomically replaces the task page with a completed fetch result.
    ///
    /// Returns `false` (and changes nothing) when a newer fetch has
    /// already been applied — the monotonic-apply rule.
    pub fn replace_tasks(&self, seq: FetchSeq, tasks: Vec<Task>, pagination: Pagination) -> bool {
        let mut collection = self.tasks.write();
        if seq.0 <= collection.last_applied {
            return false;
        }
        collection.last_applied = seq.0;
        collection.items = tasks;
        collection.pagination = pagination;
        collection.phase = LoadPhase::Ready;
        collection.error = None;
        true
    }

    /// Records a failed task fetch: the visible page is cleared rather
    /// than left possibly inconsistent with the query that failed.
    ///
    /// Same sequence gating as [`replace_tasks`](Self::replace_tasks).
    pub fn fail_tasks(&self, seq: FetchSeq, message: impl Into<String>) -> bool {
        let mut collection = self.tasks.write();
        if seq.0 <= collection.last_applied {
            return false;
        }
        collection.last_applied = seq.0;
        collection.items.clear();
        collection.pagination = Pagination::default();
        collection.phase = LoadPhase::Failed;
        collection.error = Some(message.into());
        true
    }

    /// Merges updated metadata fields into one task in place.
    ///
    /// Used for immediate feedback after a successful update mutation,
    /// before the canonical refetch lands. No-op when the id is absent
    /// from the current page (it fell off the filtered view).
    pub fn patch_task(&self, id: &TaskId, fields: &TaskFields) {
        let mut collection = self.tasks.write();
        let Some(task) = collection.items.iter_mut().find(|t| &t.id == id) else {
            return;
        };
        task.title = fields.title.clone();
        task.description = fields.description.clone();
        task.status = fields.status;
        task.priority = fields.priority;
        task.due_date = fields.due_date;
        if let Some(assignee) = &fields.assigned_to {
            task.assigned_to = assignee.clone();
        }
    }

    /// Removes one task by id. No-op when absent.
    pub fn remove_task(&self, id: &TaskId) {
        self.tasks.write().items.retain(|t| &t.id != id);
    }

    /// Returns a snapshot of the task collection.
    #[must_use]
    pub fn tasks(&self) -> TasksView {
        let collection = self.tasks.read();
        TasksView {
            tasks: collection.items.clone(),
            pagination: collection.pagination,
            phase: collection.phase,
            error: collection.error.clone(),
        }
    }

    // --- users -----------------------------------------------------------

    /// Draws a sequence tag for a user fetch about to be issued.
    pub fn issue_user_fetch(&self) -> FetchSeq {
        self.user_gate.issue()
    }

    /// Marks the user collection as loading.
    pub fn mark_users_loading(&self) {
        self.users.write().phase = LoadPhase::Loading;
    }

    /// Atomically replaces the user list with a completed fetch result.
    /// Same monotonic-apply rule as tasks.
    pub fn replace_users(&self, seq: FetchSeq, users: Vec<User>) -> bool {
        let mut collection = self.users.write();
        if seq.0 <= collection.last_applied {
            return false;
        }
        collection.last_applied = seq.0;
        collection.items = users;
        collection.phase = LoadPhase::Ready;
        collection.error = None;
        true
    }

    /// Records a failed user fetch, clearing the list.
    pub fn fail_users(&self, seq: FetchSeq, message: impl Into<String>) -> bool {
        let mut collection = self.users.write();
        if seq.0 <= collection.last_applied {
            return false;
        }
        collection.last_applied = seq.0;
        collection.items.clear();
        collection.phase = LoadPhase::Failed;
        collection.error = Some(message.into());
        true
    }

    /// Updates one user's role in place. Passwords are write-only and
    /// never touch the read model, so role is the only patchable field.
    pub fn patch_user_role(&self, id: &UserId, role: Role) {
        let mut collection = self.users.write();
        if let Some(user) = collection.items.iter_mut().find(|u| &u.id == id) {
            user.role = role;
        }
    }

    /// Removes one user by id. No-op when absent.
    pub fn remove_user(&self, id: &UserId) {
        self.users.write().items.retain(|u| &u.id != id);
    }

    /// Returns a snapshot of the user collection.
    #[must_use]
    pub fn users(&self) -> UsersView {
        let collection = self.users.read();
        UsersView {
            users: collection.items.clone(),
            phase: collection.phase,
            error: collection.error.clone(),
        }
    }

    // --- lifecycle -------------------------------------------------------

    /// Wipes both collections and advances both gates, so every response
    /// still in flight arrives stale and is discarded. Called on logout
    /// and on session invalidation.
    pub fn clear(&self) {
        let task_barrier = self.task_gate.issue();
        let user_barrier = self.user_gate.issue();

        let mut tasks = self.tasks.write();
        tasks.items.clear();
        tasks.pagination = Pagination::default();
        tasks.phase = LoadPhase::Idle;
        tasks.error = None;
        tasks.last_applied = task_barrier.0;
        drop(tasks);

        let mut users = self.users.write();
        users.items.clear();
        users.phase = LoadPhase::Idle;
        users.error = None;
        users.last_applied = user_barrier.0;
    }
}

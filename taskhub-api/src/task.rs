//! Task resource wire types.
//!
//! Field names and enum strings match the server's JSON exactly: record
//! identifiers travel as `_id`, status values carry spaces (`"To Do"`),
//! and due dates are ISO calendar dates. The client never invents any of
//! these values — every [`Task`] originates from a server response.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// Maximum number of documents that may be attached to a single task.
pub const MAX_TASK_DOCUMENTS: usize = 3;

/// The only content type accepted for task attachments.
pub const DOCUMENT_CONTENT_TYPE: &str = "application/pdf";

/// Opaque server-assigned task identifier.
///
/// The server mints these; the client treats them as opaque strings and
/// only ever echoes them back in request paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a task identifier from its string representation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this task ID.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Workflow status of a task.
///
/// `Ord` follows workflow order (`To Do < In Progress < Completed`),
/// which is the order the status sort groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started.
    #[serde(rename = "To Do")]
    ToDo,
    /// Actively being worked on.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Finished.
    Completed,
}

impl TaskStatus {
    /// Returns the wire string for this status (the human-facing label).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Urgency of a task.
///
/// `Ord` follows urgency (`Low < Medium < High`) so the server can sort
/// by priority without a translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Normal urgency.
    Medium,
    /// Needs attention soon.
    High,
}

impl TaskPriority {
    /// Returns the wire string for this priority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A document attached to a task.
///
/// Immutable once attached — there is no rename or replace operation.
/// `stored_name` is the server's storage key; `original_name` is what the
/// user sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Server-assigned storage identifier, used in download paths.
    pub stored_name: String,
    /// Filename as originally uploaded.
    pub original_name: String,
}

/// A task record as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique record identifier.
    #[serde(rename = "_id")]
    pub id: TaskId,
    /// Short title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Workflow status.
    pub status: TaskStatus,
    /// Urgency.
    pub priority: TaskPriority,
    /// Calendar date the task is due.
    pub due_date: NaiveDate,
    /// User the task is assigned to.
    pub assigned_to: UserId,
    /// User who created the task.
    pub created_by: UserId,
    /// Attached documents, in upload order, at most [`MAX_TASK_DOCUMENTS`].
    #[serde(default)]
    pub attached_documents: Vec<Document>,
}

/// Metadata fields submitted when creating or updating a task.
///
/// Attachments are deliberately absent: they ride along as multipart
/// parts on create and are immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFields {
    /// Short title. Required — the client checks this before any call.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Workflow status.
    pub status: TaskStatus,
    /// Urgency.
    pub priority: TaskPriority,
    /// Calendar date the task is due. Required.
    pub due_date: NaiveDate,
    /// Assignee. `None` lets the server default to the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
}

/// Pagination metadata accompanying every task list response.
///
/// Always taken verbatim from the most recent fetch — the client never
/// derives page counts itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    /// Total records matching the filter, across all pages.
    pub total_tasks: u64,
    /// The page this response covers (1-based).
    pub current_page: u32,
    /// Total number of pages at the current page size.
    pub total_pages: u32,
    /// Records per page used for this response.
    pub page_size: u32,
}

/// Response body of `GET /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListResponse {
    /// One page of tasks, already filtered and sorted by the server.
    pub tasks: Vec<Task>,
    /// Metadata for the page the tasks came from.
    pub pagination: Pagination,
}

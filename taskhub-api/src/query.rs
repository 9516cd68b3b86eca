//! Filter / sort / pagination (FSP) query parameters for `GET /tasks`.
//!
//! The same struct serves both sides: the client renders it into query
//! pairs, the server deserializes it from the query string. An empty
//! `status=` or `priority=` parameter means "no filter" — that is how
//! the select-box "All" option travels on the wire.

use serde::{Deserialize, Deserializer, Serialize};

use crate::task::{TaskPriority, TaskStatus};

/// Default page size for task list fetches.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Sort order for the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskSort {
    /// Most distant due date first.
    #[default]
    #[serde(rename = "-due_date")]
    DueDateDesc,
    /// Nearest due date first.
    #[serde(rename = "due_date")]
    DueDateAsc,
    /// Highest priority first.
    #[serde(rename = "-priority")]
    PriorityDesc,
    /// Grouped by status.
    #[serde(rename = "status")]
    Status,
}

impl TaskSort {
    /// Returns the wire parameter for this sort order (`-` prefix means
    /// descending).
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::DueDateDesc => "-due_date",
            Self::DueDateAsc => "due_date",
            Self::PriorityDesc => "-priority",
            Self::Status => "status",
        }
    }
}

/// The full FSP state of a task list fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskQuery {
    /// Restrict to one status, or `None` for all.
    #[serde(deserialize_with = "empty_as_none")]
    pub status: Option<TaskStatus>,
    /// Restrict to one priority, or `None` for all.
    #[serde(deserialize_with = "empty_as_none")]
    pub priority: Option<TaskPriority>,
    /// Sort order.
    pub sort: TaskSort,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            status: None,
            priority: None,
            sort: TaskSort::default(),
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl TaskQuery {
    /// Renders this query as URL query pairs, omitting absent filters.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(5);
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.as_str().to_string()));
        }
        pairs.push(("sort", self.sort.as_param().to_string()));
        pairs.push(("page", self.page.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

/// Deserializes `""` (and absence) as `None`, anything else as the inner
/// type. Query strings have no native null, so the empty string stands in.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(serde::de::Error::custom),
    }
}

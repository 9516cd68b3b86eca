//! Remote gateway abstraction over the `TaskHub` REST surface.
//!
//! Defines the [`Gateway`] trait that all gateway implementations must
//! satisfy. Concrete implementations:
//! - [`http::HttpGateway`] — reqwest-backed gateway for a real server
//! - [`fake::FakeGateway`] — in-process scripted gateway for testing
//!
//! The gateway is stateless apart from the bearer credential it holds
//! between [`attach_token`](Gateway::attach_token) and
//! [`detach_token`](Gateway::detach_token). It performs no retries and
//! makes no policy decisions — a 401 comes back as
//! [`ErrorKind::Unauthorized`] and it is the caller's business what to do
//! about it.

pub mod fake;
pub mod http;

use taskhub_api::auth::{Credentials, LoginResponse, RegisterResponse};
use taskhub_api::query::TaskQuery;
use taskhub_api::task::{Task, TaskFields, TaskId, TaskListResponse};
use taskhub_api::user::{User, UserChange, UserId};

use crate::attachments::DocumentUpload;

/// Classification of a failed gateway call, derived from the HTTP status
/// class (or the absence of a response).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 400 — the server refused the request payload.
    Validation,
    /// 401 — credential missing, invalid, or expired.
    Unauthorized,
    /// 403 — authenticated but insufficient role.
    Forbidden,
    /// 404 — the target record no longer exists.
    NotFound,
    /// No response at all: connect failure, timeout, aborted transfer.
    Network,
    /// 5xx — the server failed.
    Server,
}

impl ErrorKind {
    /// Maps an HTTP status code to its error class.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => Self::Validation,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500..=599 => Self::Server,
            // Anything else unexpected is treated as a server fault.
            _ => Self::Server,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Validation => "validation",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::Network => "network",
            Self::Server => "server",
        };
        write!(f, "{label}")
    }
}

/// Normalized error shape returned by every gateway operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    /// Error class, derived from the HTTP status.
    pub kind: ErrorKind,
    /// Server-provided message when one was present, otherwise a
    /// transport-level description.
    pub message: String,
}

impl ApiError {
    /// Creates an error with the given class and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a [`ErrorKind::Network`] error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }
}

/// Async gateway trait covering the full REST surface.
///
/// Implementations attach the held bearer credential to every outgoing
/// call when present, normalize failures into [`ApiError`], and never
/// retry. All methods are cancel-safe: dropping a returned future leaves
/// no partial client-side state behind.
pub trait Gateway: Send + Sync {
    /// Holds the bearer credential for subsequent calls.
    fn attach_token(&self, token: &str);

    /// Drops the bearer credential; subsequent calls go out anonymous.
    fn detach_token(&self);

    /// Whether a bearer credential is currently attached.
    fn has_token(&self) -> bool;

    /// `POST /auth/login`.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<LoginResponse, ApiError>> + Send;

    /// `POST /auth/register`.
    fn register(
        &self,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<RegisterResponse, ApiError>> + Send;

    /// `POST /auth/logout`. Best-effort from the caller's point of view —
    /// the session manager ignores failures here by design.
    fn logout(&self) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;

    /// `GET /tasks` with filter/sort/pagination parameters.
    fn list_tasks(
        &self,
        query: &TaskQuery,
    ) -> impl std::future::Future<Output = Result<TaskListResponse, ApiError>> + Send;

    /// `POST /tasks` as multipart: metadata fields plus up to three
    /// `documents` parts.
    fn create_task(
        &self,
        fields: &TaskFields,
        documents: &[DocumentUpload],
    ) -> impl std::future::Future<Output = Result<Task, ApiError>> + Send;

    /// `PUT /tasks/:id` with metadata fields only (attachments are
    /// immutable after creation).
    fn update_task(
        &self,
        id: &TaskId,
        fields: &TaskFields,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;

    /// `DELETE /tasks/:id`.
    fn delete_task(
        &self,
        id: &TaskId,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;

    /// `GET /tasks/:id/documents/:stored_name` — raw document bytes.
    fn download_document(
        &self,
        id: &TaskId,
        stored_name: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, ApiError>> + Send;

    /// `GET /users` (admin only).
    fn list_users(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<User>, ApiError>> + Send;

    /// `PUT /users/:id` with exactly one changed field (admin only).
    fn update_user(
        &self,
        id: &UserId,
        change: &UserChange,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;

    /// `DELETE /users/:id` (admin only).
    fn delete_user(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;
}

//! HTTP gateway backed by `reqwest`.
//!
//! One instance per configured server. The bearer credential lives in the
//! gateway itself with an explicit attach/detach lifecycle — there is no
//! ambient global token, so two gateways against two servers never share
//! credentials.

use std::time::Duration;

use parking_lot::RwLock;
use reqwest::Response;
use reqwest::multipart::{Form, Part};
use url::Url;

use taskhub_api::auth::{Credentials, ErrorBody, LoginResponse, RegisterResponse};
use taskhub_api::query::TaskQuery;
use taskhub_api::task::{Task, TaskFields, TaskId, TaskListResponse};
use taskhub_api::user::{User, UserChange, UserId};

use super::{ApiError, ErrorKind, Gateway};
use crate::attachments::DocumentUpload;

/// Gateway implementation speaking HTTP/JSON to a real server.
pub struct HttpGateway {
    http: reqwest::Client,
    base: Url,
    token: RwLock<Option<String>>,
}

impl HttpGateway {
    /// Creates a gateway against `base_url` with the given request timeout.
    ///
    /// A missing trailing slash on the base URL is corrected here, since
    /// [`Url::join`] would otherwise drop the last path segment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the base URL does not parse or the HTTP
    /// client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized)
            .map_err(|e| ApiError::network(format!("invalid base URL {base_url}: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base,
            token: RwLock::new(None),
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::network(format!("invalid request path {path}: {e}")))
    }

    /// Applies the attached bearer credential, when present.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.read().as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, ApiError> {
        let response = self.authorize(request).send().await.map_err(from_reqwest)?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(from_response(response).await)
        }
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::network(format!("malformed response body: {e}")))
    }

    /// Sends a request whose response body is only an acknowledgment.
    async fn send_ack(&self, request: reqwest::RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }
}

/// Classifies a transport-level failure (no HTTP response was produced).
fn from_reqwest(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::network(format!("request timed out: {err}"))
    } else {
        ApiError::network(err.to_string())
    }
}

/// Normalizes a non-success response, preferring the server's `msg` body.
async fn from_response(response: Response) -> ApiError {
    let status = response.status();
    let kind = ErrorKind::from_status(status.as_u16());
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.msg,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    ApiError { kind, message }
}

/// Builds the multipart form for task creation: every metadata field as a
/// text part, then each document under the `documents` part name.
fn multipart_form(fields: &TaskFields, documents: &[DocumentUpload]) -> Result<Form, ApiError> {
    let mut form = Form::new()
        .text("title", fields.title.clone())
        .text("description", fields.description.clone())
        .text("status", fields.status.as_str())
        .text("priority", fields.priority.as_str())
        .text("due_date", fields.due_date.to_string());
    if let Some(assignee) = &fields.assigned_to {
        form = form.text("assigned_to", assignee.to_string());
    }
    for doc in documents {
        let part = Part::bytes(doc.bytes.clone())
            .file_name(doc.file_name.clone())
            .mime_str(&doc.content_type)
            .map_err(|e| {
                ApiError::new(
                    ErrorKind::Validation,
                    format!("unusable content type {}: {e}", doc.content_type),
                )
            })?;
        form = form.part("documents", part);
    }
    Ok(form)
}

impl Gateway for HttpGateway {
    fn attach_token(&self, token: &str) {
        *self.token.write() = Some(token.to_string());
    }

    fn detach_token(&self) {
        *self.token.write() = None;
    }

    fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let url = self.url("auth/login")?;
        self.send_json(self.http.post(url).json(credentials)).await
    }

    async fn register(&self, credentials: &Credentials) -> Result<RegisterResponse, ApiError> {
        let url = self.url("auth/register")?;
        self.send_json(self.http.post(url).json(credentials)).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let url = self.url("auth/logout")?;
        self.send_ack(self.http.post(url)).await
    }

    async fn list_tasks(&self, query: &TaskQuery) -> Result<TaskListResponse, ApiError> {
        let url = self.url("tasks")?;
        self.send_json(self.http.get(url).query(&query.to_query_pairs()))
            .await
    }

    async fn create_task(
        &self,
        fields: &TaskFields,
        documents: &[DocumentUpload],
    ) -> Result<Task, ApiError> {
        let url = self.url("tasks")?;
        let form = multipart_form(fields, documents)?;
        self.send_json(self.http.post(url).multipart(form)).await
    }

    async fn update_task(&self, id: &TaskId, fields: &TaskFields) -> Result<(), ApiError> {
        let url = self.url(&format!("tasks/{id}"))?;
        self.send_ack(self.http.put(url).json(fields)).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), ApiError> {
        let url = self.url(&format!("tasks/{id}"))?;
        self.send_ack(self.http.delete(url)).await
    }

    async fn download_document(
        &self,
        id: &TaskId,
        stored_name: &str,
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.url(&format!("tasks/{id}/documents/{stored_name}"))?;
        let response = self.send(self.http.get(url)).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(format!("document transfer aborted: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let url = self.url("users")?;
        self.send_json(self.http.get(url)).await
    }

    async fn update_user(&self, id: &UserId, change: &UserChange) -> Result<(), ApiError> {
        let url = self.url(&format!("users/{id}"))?;
        self.send_ack(self.http.put(url).json(change)).await
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), ApiError> {
        let url = self.url(&format!("users/{id}"))?;
        self.send_ack(self.http.delete(url)).await
    }
}

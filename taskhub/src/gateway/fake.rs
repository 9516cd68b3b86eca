//! Scripted in-process gateway for testing.
//!
//! The counterpart of a loopback transport: no sockets, no server. Each
//! operation pops the next planned outcome from its own queue, optionally
//! sleeping first — the delay is what makes fetch races reproducible in
//! tests (issue a slow fetch, then a fast one, and watch the stale result
//! get discarded).

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use taskhub_api::auth::{Credentials, LoginResponse, RegisterResponse};
use taskhub_api::query::TaskQuery;
use taskhub_api::task::{Task, TaskFields, TaskId, TaskListResponse};
use taskhub_api::user::{User, UserChange, UserId};

use super::{ApiError, Gateway};
use crate::attachments::DocumentUpload;

/// One planned outcome: an optional artificial latency, then a result.
struct Planned<T> {
    delay: Option<Duration>,
    result: Result<T, ApiError>,
}

/// A FIFO of planned outcomes for one operation.
struct Script<T>(Mutex<VecDeque<Planned<T>>>);

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self(Mutex::new(VecDeque::new()))
    }
}

impl<T> Script<T> {
    fn push(&self, delay: Option<Duration>, result: Result<T, ApiError>) {
        self.0.lock().push_back(Planned { delay, result });
    }

    /// Pops the next planned outcome, sleeping through its delay first.
    /// An exhausted script reports a network error rather than panicking,
    /// so a missing expectation shows up as a normal failure path.
    async fn next(&self, operation: &str) -> Result<T, ApiError> {
        let planned = self.0.lock().pop_front();
        let Some(planned) = planned else {
            return Err(ApiError::network(format!(
                "no scripted response left for {operation}"
            )));
        };
        if let Some(delay) = planned.delay {
            tokio::time::sleep(delay).await;
        }
        planned.result
    }
}

/// In-process [`Gateway`] whose responses are scripted by the test.
///
/// Every call is also recorded in an operation log so tests can assert
/// what went over the (absent) wire — and, just as importantly, what
/// never did.
#[derive(Default)]
pub struct FakeGateway {
    token: RwLock<Option<String>>,
    log: Mutex<Vec<String>>,
    login_script: Script<LoginResponse>,
    register_script: Script<RegisterResponse>,
    logout_script: Script<()>,
    list_tasks_script: Script<TaskListResponse>,
    create_task_script: Script<Task>,
    update_task_script: Script<()>,
    delete_task_script: Script<()>,
    download_script: Script<Vec<u8>>,
    list_users_script: Script<Vec<User>>,
    update_user_script: Script<()>,
    delete_user_script: Script<()>,
}

impl FakeGateway {
    /// Creates a gateway with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the operations performed so far, in call order.
    #[must_use]
    pub fn operations(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    fn record(&self, operation: impl Into<String>) {
        self.log.lock().push(operation.into());
    }

    // --- scripting -------------------------------------------------------

    /// Scripts the next login outcome.
    pub fn script_login(&self, result: Result<LoginResponse, ApiError>) {
        self.login_script.push(None, result);
    }

    /// Scripts the next register outcome.
    pub fn script_register(&self, result: Result<RegisterResponse, ApiError>) {
        self.register_script.push(None, result);
    }

    /// Scripts the next logout outcome.
    pub fn script_logout(&self, result: Result<(), ApiError>) {
        self.logout_script.push(None, result);
    }

    /// Scripts the next task list outcome.
    pub fn script_list_tasks(&self, result: Result<TaskListResponse, ApiError>) {
        self.list_tasks_script.push(None, result);
    }

    /// Scripts the next task list outcome behind an artificial delay.
    pub fn script_list_tasks_delayed(
        &self,
        delay: Duration,
        result: Result<TaskListResponse, ApiError>,
    ) {
        self.list_tasks_script.push(Some(delay), result);
    }

    /// Scripts the next create outcome.
    pub fn script_create_task(&self, result: Result<Task, ApiError>) {
        self.create_task_script.push(None, result);
    }

    /// Scripts the next update outcome.
    pub fn script_update_task(&self, result: Result<(), ApiError>) {
        self.update_task_script.push(None, result);
    }

    /// Scripts the next delete outcome.
    pub fn script_delete_task(&self, result: Result<(), ApiError>) {
        self.delete_task_script.push(None, result);
    }

    /// Scripts the next document download outcome.
    pub fn script_download(&self, result: Result<Vec<u8>, ApiError>) {
        self.download_script.push(None, result);
    }

    /// Scripts the next user list outcome.
    pub fn script_list_users(&self, result: Result<Vec<User>, ApiError>) {
        self.list_users_script.push(None, result);
    }

    /// Scripts the next user update outcome.
    pub fn script_update_user(&self, result: Result<(), ApiError>) {
        self.update_user_script.push(None, result);
    }

    /// Scripts the next user delete outcome.
    pub fn script_delete_user(&self, result: Result<(), ApiError>) {
        self.delete_user_script.push(None, result);
    }
}

impl Gateway for FakeGateway {
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
        self.record(format!("login {}", credentials.email));
        self.login_script.next("login").await
    }

    async fn register(&self, credentials: &Credentials) -> Result<RegisterResponse, ApiError> {
        self.record(format!("register {}", credentials.email));
        self.register_script.next("register").await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.record("logout");
        self.logout_script.next("logout").await
    }

    async fn list_tasks(&self, query: &TaskQuery) -> Result<TaskListResponse, ApiError> {
        self.record(format!("list_tasks page={}", query.page));
        self.list_tasks_script.next("list_tasks").await
    }

    async fn create_task(
        &self,
        fields: &TaskFields,
        documents: &[DocumentUpload],
    ) -> Result<Task, ApiError> {
        self.record(format!(
            "create_task {} docs={}",
            fields.title,
            documents.len()
        ));
        self.create_task_script.next("create_task").await
    }

    async fn update_task(&self, id: &TaskId, _fields: &TaskFields) -> Result<(), ApiError> {
        self.record(format!("update_task {id}"));
        self.update_task_script.next("update_task").await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), ApiError> {
        self.record(format!("delete_task {id}"));
        self.delete_task_script.next("delete_task").await
    }

    async fn download_document(
        &self,
        id: &TaskId,
        stored_name: &str,
    ) -> Result<Vec<u8>, ApiError> {
        self.record(format!("download {id}/{stored_name}"));
        self.download_script.next("download_document").await
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.record("list_users");
        self.list_users_script.next("list_users").await
    }

    async fn update_user(&self, id: &UserId, _change: &UserChange) -> Result<(), ApiError> {
        self.record(format!("update_user {id}"));
        self.update_user_script.next("update_user").await
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), ApiError> {
        self.record(format!("delete_user {id}"));
        self.delete_user_script.next("delete_user").await
    }
}

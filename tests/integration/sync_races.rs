//! Ordering-hazard tests over a scripted gateway with injected latency:
//! stale fetches losing to fresher ones, mutation refetches surviving
//! older in-flight fetches, and logout discarding everything in flight.
//!
//! Paused tokio time makes the races deterministic: the "slow" response
//! is parked on a timer while the "fast" one completes, then time is
//! advanced and the slow one limps in to be discarded.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::similar_names
)]

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use taskhub::client::TaskHubClient;
use taskhub::gateway::fake::FakeGateway;
use taskhub::query::TaskFilter;
use taskhub::session::persist::CredentialFile;
use taskhub::store::LoadPhase;
use taskhub_api::auth::{Credentials, LoginResponse};
use taskhub_api::task::{
    Pagination, Task, TaskFields, TaskId, TaskListResponse, TaskPriority, TaskStatus,
};
use taskhub_api::user::{Role, UserId};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn make_task(id: &str, title: &str) -> Task {
    Task {
        id: TaskId::new(id),
        title: title.to_string(),
        description: String::new(),
        status: TaskStatus::ToDo,
        priority: TaskPriority::Medium,
        due_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        assigned_to: UserId::new("u-1"),
        created_by: UserId::new("u-1"),
        attached_documents: vec![],
    }
}

fn page_with(tasks: Vec<Task>) -> TaskListResponse {
    let total = tasks.len() as u64;
    TaskListResponse {
        tasks,
        pagination: Pagination {
            total_tasks: total,
            current_page: 1,
            total_pages: 1,
            page_size: 10,
        },
    }
}

fn client_over_fake(
    dir: &tempfile::TempDir,
) -> TaskHubClient<FakeGateway> {
    let credentials = CredentialFile::at(dir.path().join("session.toml"));
    let (client, _events) = TaskHubClient::assemble(FakeGateway::new(), credentials);
    client
}

async fn log_in(client: &TaskHubClient<FakeGateway>) {
    client.gateway().script_login(Ok(LoginResponse {
        msg: "ok".to_string(),
        access_token: "tok-1".to_string(),
        user_id: UserId::new("u-1"),
        role: Role::User,
    }));
    client
        .session()
        .login(&Credentials {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Fetch race: completion order differs from issuance order
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn slow_older_fetch_loses_to_fast_newer_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let client = client_over_fake(&dir);
    log_in(&client).await;

    // First fetch is slow and carries stale content; the second is
    // instantaneous and carries the content the user actually asked for.
    client.gateway().script_list_tasks_delayed(
        Duration::from_millis(200),
        Ok(page_with(vec![make_task("t-1", "stale filter result")])),
    );
    client
        .gateway()
        .script_list_tasks(Ok(page_with(vec![make_task("t-2", "fresh filter result")])));

    let query = Arc::clone(client.query());
    let first = tokio::spawn({
        let query = Arc::clone(&query);
        async move {
            query
                .set_filter(TaskFilter {
                    status: Some(TaskStatus::ToDo),
                    priority: None,
                    sort: taskhub_api::query::TaskSort::DueDateDesc,
                })
                .await;
        }
    });
    // Let the first fetch reach its timer before issuing the second.
    tokio::task::yield_now().await;
    let second = tokio::spawn({
        let query = Arc::clone(&query);
        async move {
            query
                .set_filter(TaskFilter {
                    status: Some(TaskStatus::ToDo),
                    priority: Some(TaskPriority::High),
                    sort: taskhub_api::query::TaskSort::DueDateDesc,
                })
                .await;
        }
    });

    second.await.unwrap();
    // The fresh result is in place before the slow response arrives.
    assert_eq!(client.store().tasks().tasks[0].title, "fresh filter result");

    first.await.unwrap();
    // The stale response completed last — and changed nothing.
    let view = client.store().tasks();
    assert_eq!(view.tasks.len(), 1);
    assert_eq!(view.tasks[0].title, "fresh filter result");
    assert_eq!(view.phase, LoadPhase::Ready);
}

// ---------------------------------------------------------------------------
// Mutation-then-refetch ordering
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn mutation_refetch_is_not_overwritten_by_older_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let client = client_over_fake(&dir);
    log_in(&client).await;

    // An ordinary fetch is already in flight, slowly, with pre-mutation
    // content.
    client.gateway().script_list_tasks_delayed(
        Duration::from_millis(500),
        Ok(page_with(vec![make_task("t-1", "before update")])),
    );
    // The update itself acknowledges, and its follow-up refetch returns
    // the post-mutation truth instantly.
    client.gateway().script_update_task(Ok(()));
    client
        .gateway()
        .script_list_tasks(Ok(page_with(vec![make_task("t-1", "after update")])));

    let query = Arc::clone(client.query());
    let slow_fetch = tokio::spawn(async move { query.refresh().await });
    tokio::task::yield_now().await;

    client
        .mutations()
        .update_task(
            &TaskId::new("t-1"),
            TaskFields {
                title: "after update".to_string(),
                description: String::new(),
                status: TaskStatus::ToDo,
                priority: TaskPriority::Medium,
                due_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                assigned_to: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(client.store().tasks().tasks[0].title, "after update");

    slow_fetch.await.unwrap();
    // The pre-mutation snapshot arrived after the refetch and was binned.
    assert_eq!(client.store().tasks().tasks[0].title, "after update");
}

// ---------------------------------------------------------------------------
// Logout race
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn response_in_flight_at_logout_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let client = client_over_fake(&dir);
    log_in(&client).await;

    client.gateway().script_list_tasks_delayed(
        Duration::from_millis(300),
        Ok(page_with(vec![make_task("t-1", "zombie page")])),
    );

    let query = Arc::clone(client.query());
    let in_flight = tokio::spawn(async move { query.refresh().await });
    tokio::task::yield_now().await;

    client.gateway().script_logout(Ok(()));
    client.logout().await;
    assert!(!client.session().snapshot().is_authenticated());

    in_flight.await.unwrap();
    // The logged-out store stays empty; the zombie page never landed.
    let view = client.store().tasks();
    assert!(view.tasks.is_empty());
    assert_eq!(view.phase, LoadPhase::Idle);
}

//! Integration tests for the admin-only user directory: role gating,
//! single-field updates (role vs. password), and account deletion.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::similar_names
)]

use std::sync::Arc;

use chrono::NaiveDate;
use taskhub::client::TaskHubClient;
use taskhub::config::ClientConfig;
use taskhub::gateway::ErrorKind;
use taskhub::gateway::http::HttpGateway;
use taskhub::mutate::MutationError;
use taskhub::store::LoadPhase;
use taskhub_api::auth::Credentials;
use taskhub_api::task::{TaskFields, TaskPriority, TaskStatus};
use taskhub_api::user::{Role, UserChange};
use taskhub_server::start_server;
use taskhub_server::state::ServerState;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

async fn spawn_server() -> (Arc<ServerState>, String) {
    let state = Arc::new(ServerState::new());
    let (addr, _handle) = start_server("127.0.0.1:0", Arc::clone(&state))
        .await
        .expect("server should bind");
    (state, format!("http://{addr}/api"))
}

async fn logged_in_client(
    state: &Arc<ServerState>,
    base_url: &str,
    dir: &tempfile::TempDir,
    email: &str,
    role: Role,
) -> TaskHubClient<HttpGateway> {
    state.seed_account(email, "secret1", role).await;
    let config = ClientConfig {
        base_url: base_url.to_string(),
        credentials_path: Some(dir.path().join(format!("{email}.toml"))),
        ..ClientConfig::default()
    };
    let (client, _events) = TaskHubClient::connect(&config).expect("client should build");
    client
        .session()
        .login(&Credentials {
            email: email.to_string(),
            password: "secret1".to_string(),
        })
        .await
        .expect("login should succeed");
    client
}

// ---------------------------------------------------------------------------
// Role gating
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_admin_is_forbidden_from_the_directory() {
    let (state, base_url) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let client = logged_in_client(&state, &base_url, &dir, "user@b.com", Role::User).await;

    let err = client.mutations().fetch_users().await.unwrap_err();
    let MutationError::Api(api) = err else {
        panic!("expected an API error");
    };
    assert_eq!(api.kind, ErrorKind::Forbidden);
    // A 403 is a denial, not a logout: the session stays authenticated.
    assert!(client.session().snapshot().is_authenticated());
    assert_eq!(client.store().users().phase, LoadPhase::Failed);
}

#[tokio::test]
async fn admin_lists_every_account() {
    let (state, base_url) = spawn_server().await;
    state.seed_account("user@b.com", "secret1", Role::User).await;
    let dir = tempfile::tempdir().unwrap();
    let admin = logged_in_client(&state, &base_url, &dir, "root@b.com", Role::Admin).await;

    admin.mutations().fetch_users().await.unwrap();

    let view = admin.store().users();
    assert_eq!(view.phase, LoadPhase::Ready);
    assert_eq!(view.users.len(), 2);
    // Passwords never appear in the read model — there is no field for
    // them at all; this is a type-level fact, not an assertion.
}

// ---------------------------------------------------------------------------
// Single-field updates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn role_change_is_patched_into_the_store() {
    let (state, base_url) = spawn_server().await;
    let user_id = state.seed_account("user@b.com", "secret1", Role::User).await;
    let dir = tempfile::tempdir().unwrap();
    let admin = logged_in_client(&state, &base_url, &dir, "root@b.com", Role::Admin).await;

    admin.mutations().fetch_users().await.unwrap();
    admin
        .mutations()
        .update_user(&user_id, UserChange::Role { role: Role::Admin })
        .await
        .unwrap();

    let promoted = admin
        .store()
        .users()
        .users
        .into_iter()
        .find(|u| u.id == user_id)
        .unwrap();
    assert_eq!(promoted.role, Role::Admin);
}

#[tokio::test]
async fn password_change_takes_effect_and_leaves_store_alone() {
    let (state, base_url) = spawn_server().await;
    let user_id = state.seed_account("user@b.com", "secret1", Role::User).await;
    let dir = tempfile::tempdir().unwrap();
    let admin = logged_in_client(&state, &base_url, &dir, "root@b.com", Role::Admin).await;

    admin.mutations().fetch_users().await.unwrap();
    admin
        .mutations()
        .update_user(
            &user_id,
            UserChange::Password {
                password: "n3w-secret".to_string(),
            },
        )
        .await
        .unwrap();

    // The cached role is untouched by a password change.
    let cached = admin
        .store()
        .users()
        .users
        .into_iter()
        .find(|u| u.id == user_id)
        .unwrap();
    assert_eq!(cached.role, Role::User);

    // The old password is dead, the new one works.
    let config = ClientConfig {
        base_url: base_url.clone(),
        credentials_path: Some(dir.path().join("relogin.toml")),
        ..ClientConfig::default()
    };
    let (fresh, _events) = TaskHubClient::connect(&config).unwrap();
    assert!(
        fresh
            .session()
            .login(&Credentials {
                email: "user@b.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .is_err()
    );
    fresh
        .session()
        .login(&Credentials {
            email: "user@b.com".to_string(),
            password: "n3w-secret".to_string(),
        })
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deleting_a_user_removes_their_tasks_too() {
    let (state, base_url) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let user = logged_in_client(&state, &base_url, &dir, "user@b.com", Role::User).await;
    let admin = logged_in_client(&state, &base_url, &dir, "root@b.com", Role::Admin).await;

    user.mutations()
        .create_task(
            TaskFields {
                title: "orphan-to-be".to_string(),
                description: String::new(),
                status: TaskStatus::ToDo,
                priority: TaskPriority::Low,
                due_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                assigned_to: None,
            },
            vec![],
        )
        .await
        .unwrap();

    let user_id = user.session().snapshot().user_id.unwrap();
    admin.mutations().fetch_users().await.unwrap();
    admin.mutations().delete_user(&user_id).await.unwrap();

    // Gone from the cached directory.
    assert!(
        admin
            .store()
            .users()
            .users
            .iter()
            .all(|u| u.id != user_id)
    );
    // Their task went with them.
    admin.query().refresh().await;
    assert!(admin.store().tasks().tasks.is_empty());
}

#[tokio::test]
async fn deleting_an_unknown_user_is_not_found() {
    let (state, base_url) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let admin = logged_in_client(&state, &base_url, &dir, "root@b.com", Role::Admin).await;

    let err = admin
        .mutations()
        .delete_user(&taskhub_api::user::UserId::new("no-such-user"))
        .await
        .unwrap_err();
    let MutationError::Api(api) = err else {
        panic!("expected an API error");
    };
    assert_eq!(api.kind, ErrorKind::NotFound);
}

//! Integration tests for the session lifecycle against a live server:
//! registration, login, credential persistence across restarts, logout
//! revocation, and access-guard decisions on real session state.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::similar_names
)]

use std::sync::Arc;

use taskhub::access::{self, RouteDecision};
use taskhub::client::TaskHubClient;
use taskhub::config::ClientConfig;
use taskhub::gateway::http::HttpGateway;
use taskhub::gateway::{ErrorKind, Gateway};
use taskhub::mutate::MutationError;
use taskhub::session::{AuthPhase, SessionError};
use taskhub::store::LoadPhase;
use taskhub_api::auth::Credentials;
use taskhub_api::user::Role;
use taskhub_server::start_server;
use taskhub_server::state::ServerState;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Starts a server on an ephemeral port and returns its state and base URL.
async fn spawn_server() -> (Arc<ServerState>, String) {
    let state = Arc::new(ServerState::new());
    let (addr, _handle) = start_server("127.0.0.1:0", Arc::clone(&state))
        .await
        .expect("server should bind");
    (state, format!("http://{addr}/api"))
}

/// Builds a client for the given server, with credentials stored under
/// the given temp directory.
fn client_for(
    base_url: &str,
    dir: &tempfile::TempDir,
) -> TaskHubClient<HttpGateway> {
    let config = ClientConfig {
        base_url: base_url.to_string(),
        credentials_path: Some(dir.path().join("session.toml")),
        ..ClientConfig::default()
    };
    let (client, _events) = TaskHubClient::connect(&config).expect("client should build");
    client
}

fn creds(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_authenticates_with_token_only() {
    let (_state, base_url) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&base_url, &dir);

    client
        .session()
        .register(&creds("new@b.com", "secret1"))
        .await
        .unwrap();

    let snap = client.session().snapshot();
    assert_eq!(snap.phase, AuthPhase::Authenticated);
    assert!(snap.token.is_some());
    assert_eq!(snap.user_id, None);
    assert_eq!(snap.role, None);

    // The fresh token works for an authenticated fetch.
    client.query().refresh().await;
    assert_eq!(client.store().tasks().phase, LoadPhase::Ready);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let (_state, base_url) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&base_url, &dir);

    client
        .session()
        .register(&creds("dup@b.com", "secret1"))
        .await
        .unwrap();
    let err = client
        .session()
        .register(&creds("dup@b.com", "secret1"))
        .await
        .unwrap_err();

    let SessionError::Api(api) = err else {
        panic!("expected an API error");
    };
    assert!(api.message.contains("already exists"));
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_returns_identity_and_role() {
    let (state, base_url) = spawn_server().await;
    let user_id = state.seed_account("a@b.com", "secret1", Role::User).await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&base_url, &dir);

    client
        .session()
        .login(&creds("a@b.com", "secret1"))
        .await
        .unwrap();

    let snap = client.session().snapshot();
    assert_eq!(snap.phase, AuthPhase::Authenticated);
    assert_eq!(snap.user_id, Some(user_id));
    assert_eq!(snap.role, Some(Role::User));
}

#[tokio::test]
async fn wrong_password_fails_with_server_message() {
    let (state, base_url) = spawn_server().await;
    state.seed_account("a@b.com", "secret1", Role::User).await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&base_url, &dir);

    let err = client
        .session()
        .login(&creds("a@b.com", "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Api(_)));
    let snap = client.session().snapshot();
    assert_eq!(snap.phase, AuthPhase::Failed);
    assert_eq!(snap.error.as_deref(), Some("Bad email or password"));
}

#[tokio::test]
async fn empty_credentials_never_reach_the_server() {
    let (_state, base_url) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&base_url, &dir);

    let err = client
        .session()
        .login(&creds("", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::MissingCredentials));
    assert_eq!(client.session().snapshot().phase, AuthPhase::Unauthenticated);
}

// ---------------------------------------------------------------------------
// Restore across process restarts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn session_survives_a_restart() {
    let (state, base_url) = spawn_server().await;
    state.seed_account("a@b.com", "secret1", Role::User).await;
    let dir = tempfile::tempdir().unwrap();

    let client = client_for(&base_url, &dir);
    client
        .session()
        .login(&creds("a@b.com", "secret1"))
        .await
        .unwrap();
    drop(client);

    // Same credential file, fresh process.
    let restarted = client_for(&base_url, &dir);
    assert!(restarted.start().await);
    assert_eq!(
        restarted.session().snapshot().phase,
        AuthPhase::Authenticated
    );
    // start() already ran the initial fetch with the restored token.
    assert_eq!(restarted.store().tasks().phase, LoadPhase::Ready);
}

// ---------------------------------------------------------------------------
// Logout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn logout_revokes_the_token_server_side() {
    let (state, base_url) = spawn_server().await;
    state.seed_account("a@b.com", "secret1", Role::Admin).await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&base_url, &dir);

    client
        .session()
        .login(&creds("a@b.com", "secret1"))
        .await
        .unwrap();
    let old_token = client.session().snapshot().token.unwrap();

    client.logout().await;
    assert_eq!(client.session().snapshot().phase, AuthPhase::Unauthenticated);

    // Replaying the revoked token earns a 401.
    client.gateway().attach_token(&old_token);
    let err = client.mutations().fetch_users().await.unwrap_err();
    let MutationError::Api(api) = err else {
        panic!("expected an API error");
    };
    assert_eq!(api.kind, ErrorKind::Unauthorized);
}

#[tokio::test]
async fn logout_clears_locally_when_server_is_gone() {
    let (state, base_url) = spawn_server().await;
    state.seed_account("a@b.com", "secret1", Role::User).await;
    let dir = tempfile::tempdir().unwrap();

    // A client pointed at a dead port, with a session restored from the
    // live login below.
    let client = client_for(&base_url, &dir);
    client
        .session()
        .login(&creds("a@b.com", "secret1"))
        .await
        .unwrap();

    let dead = client_for("http://127.0.0.1:1/api", &dir);
    assert!(dead.start().await);

    dead.logout().await;

    let snap = dead.session().snapshot();
    assert_eq!(snap.phase, AuthPhase::Unauthenticated);
    assert!(snap.token.is_none());
    // The persisted credential is gone despite the unreachable server.
    let fresh = client_for(&base_url, &dir);
    assert!(!fresh.start().await);
}

// ---------------------------------------------------------------------------
// Access guard over live session state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn guard_decisions_follow_the_session() {
    let (state, base_url) = spawn_server().await;
    state.seed_account("user@b.com", "secret1", Role::User).await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&base_url, &dir);

    // Before login: everything redirects to login.
    let snap = client.session().snapshot();
    assert_eq!(
        access::decide(&snap, Some(Role::Admin)),
        RouteDecision::RedirectToLogin
    );

    client
        .session()
        .login(&creds("user@b.com", "secret1"))
        .await
        .unwrap();
    let snap = client.session().snapshot();

    // Plain view: allowed. Admin view: redirected, never an error.
    assert_eq!(access::decide(&snap, None), RouteDecision::Allow);
    assert_eq!(
        access::decide(&snap, Some(Role::Admin)),
        RouteDecision::RedirectToDefault
    );
}

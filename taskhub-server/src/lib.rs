//! `TaskHub` API server — in-memory implementation of the REST contract.
//!
//! Serves the same surface a production backend would (`/api/auth/*`,
//! `/api/tasks`, `/api/users`), backed entirely by in-memory maps. Used
//! by the client's integration tests and for local development; it holds
//! no durable data.

pub mod auth;
pub mod config;
pub mod state;
pub mod tasks;
pub mod users;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};

use state::ServerState;

/// Builds the full application router over the given state.
#[must_use]
pub fn app(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/tasks", get(tasks::list).post(tasks::create))
        .route(
            "/api/tasks/{id}",
            put(tasks::update).delete(tasks::remove),
        )
        .route(
            "/api/tasks/{id}/documents/{stored_name}",
            get(tasks::download),
        )
        .route("/api/users", get(users::list))
        .route(
            "/api/users/{id}",
            put(users::update).delete(users::remove),
        )
        .with_state(state)
}

/// Binds a listener and serves the API on a background task.
///
/// Returns the actually bound address (useful with port 0) and the serve
/// task's handle.
///
/// # Errors
///
/// Returns the I/O error when the address cannot be bound.
pub async fn start_server(
    bind_addr: &str,
    state: Arc<ServerState>,
) -> std::io::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let bound_addr = listener.local_addr()?;
    let router = app(state);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "server task failed");
        }
    });

    Ok((bound_addr, handle))
}

//! Admin-only user management endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use taskhub_api::auth::Ack;
use taskhub_api::user::{User, UserChange};

use crate::auth::{ApiFailure, failure};
use crate::state::{Claims, ServerState};

/// Rejects callers without the admin role.
fn require_admin(claims: &Claims) -> Result<(), ApiFailure> {
    if claims.is_admin() {
        Ok(())
    } else {
        Err(failure(
            StatusCode::FORBIDDEN,
            "Administrator access required",
        ))
    }
}

/// `GET /users` — all accounts, passwords excluded by construction.
pub async fn list(
    claims: Claims,
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Vec<User>>, ApiFailure> {
    require_admin(&claims)?;

    let users = state.users.read().await;
    let mut list: Vec<User> = users.values().map(|r| r.user.clone()).collect();
    // Stable order for anyone eyeballing responses.
    list.sort_by(|a, b| a.email.cmp(&b.email));
    Ok(Json(list))
}

/// `PUT /users/:id` — applies a single-field change: role or password.
pub async fn update(
    claims: Claims,
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(change): Json<UserChange>,
) -> Result<Json<Ack>, ApiFailure> {
    require_admin(&claims)?;

    let mut users = state.users.write().await;
    let Some(record) = users.get_mut(&id) else {
        return Err(failure(StatusCode::NOT_FOUND, "User not found"));
    };

    match change {
        UserChange::Role { role } => record.user.role = role,
        UserChange::Password { password } => {
            if password.is_empty() {
                return Err(failure(StatusCode::BAD_REQUEST, "Password cannot be empty"));
            }
            record.password = password;
        }
    }

    tracing::info!(user = %id, by = %claims.user_id, "user updated");
    Ok(Json(Ack {
        msg: "User updated successfully".to_string(),
    }))
}

/// `DELETE /users/:id` — removes the account and every task assigned to
/// it.
pub async fn remove(
    claims: Claims,
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<Ack>, ApiFailure> {
    require_admin(&claims)?;

    let mut users = state.users.write().await;
    let Some(record) = users.remove(&id) else {
        return Err(failure(StatusCode::NOT_FOUND, "User not found"));
    };
    drop(users);

    let removed_id = record.user.id;
    let mut tasks = state.tasks.write().await;
    let doomed: Vec<String> = tasks
        .iter()
        .filter(|(_, t)| t.assigned_to == removed_id)
        .map(|(k, _)| k.clone())
        .collect();
    for key in &doomed {
        tasks.remove(key);
    }
    drop(tasks);

    tracing::info!(user = %id, tasks_removed = doomed.len(), "user deleted");
    Ok(Json(Ack {
        msg: "User and associated tasks deleted".to_string(),
    }))
}

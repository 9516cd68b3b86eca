//! Authentication endpoints and the bearer-token extractor.

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;

use taskhub_api::auth::{Ack, Credentials, ErrorBody, LoginResponse, RegisterResponse};
use taskhub_api::user::{Role, User, UserId};

use crate::state::{Claims, ServerState, UserRecord, mint_id};

/// Uniform error response shape: status plus `{ "msg": ... }`.
pub type ApiFailure = (StatusCode, Json<ErrorBody>);

/// Builds an error response.
pub fn failure(status: StatusCode, msg: impl Into<String>) -> ApiFailure {
    (status, Json(ErrorBody { msg: msg.into() }))
}

impl FromRequestParts<Arc<ServerState>> for Claims {
    type Rejection = ApiFailure;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ServerState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Missing Authorization header"))?;

        state
            .sessions
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Token is invalid or has expired"))
    }
}

/// `POST /auth/register` — creates a plain-user account and logs it in.
///
/// Responds 201 with a token only; the fresh account's id and role are
/// not reported.
pub async fn register(
    State(state): State<Arc<ServerState>>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiFailure> {
    if credentials.email.is_empty() || credentials.password.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Missing email or password"));
    }
    if state.find_by_email(&credentials.email).await.is_some() {
        return Err(failure(StatusCode::CONFLICT, "User already exists"));
    }

    let id = UserId::new(mint_id());
    let record = UserRecord {
        user: User {
            id: id.clone(),
            email: credentials.email.clone(),
            role: Role::User,
        },
        password: credentials.password,
    };
    state.users.write().await.insert(id.to_string(), record);
    let access_token = state.issue_token(&id, Role::User).await;

    tracing::info!(email = %credentials.email, "account registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            msg: "User created successfully".to_string(),
            access_token,
        }),
    ))
}

/// `POST /auth/login` — verifies credentials and issues a token.
pub async fn login(
    State(state): State<Arc<ServerState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LoginResponse>, ApiFailure> {
    let Some(record) = state.find_by_email(&credentials.email).await else {
        return Err(failure(StatusCode::UNAUTHORIZED, "Bad email or password"));
    };
    if record.password != credentials.password {
        return Err(failure(StatusCode::UNAUTHORIZED, "Bad email or password"));
    }

    let access_token = state.issue_token(&record.user.id, record.user.role).await;
    tracing::info!(email = %credentials.email, "login");
    Ok(Json(LoginResponse {
        msg: "Login successful".to_string(),
        access_token,
        user_id: record.user.id,
        role: record.user.role,
    }))
}

/// `POST /auth/logout` — revokes the presented token.
pub async fn logout(
    claims: Claims,
    State(state): State<Arc<ServerState>>,
) -> Json<Ack> {
    state.revoke_token(&claims.token).await;
    tracing::info!(user = %claims.user_id, "logout");
    Json(Ack {
        msg: "Successfully logged out".to_string(),
    })
}

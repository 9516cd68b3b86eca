//! Authentication wire types.

use serde::{Deserialize, Serialize};

use crate::user::{Role, UserId};

/// Login / registration request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login email address.
    pub email: String,
    /// Password, in the clear over TLS.
    pub password: String,
}

/// Response body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Human-readable outcome message.
    pub msg: String,
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// Identifier of the authenticated account.
    pub user_id: UserId,
    /// Role of the authenticated account.
    pub role: Role,
}

/// Response body of `POST /auth/register`.
///
/// Registration authenticates the caller but reports only the token —
/// no subject id or role travels back (the account starts as a plain
/// `user` either way).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Human-readable outcome message.
    pub msg: String,
    /// Bearer token for subsequent requests.
    pub access_token: String,
}

/// Generic acknowledgment body used by mutation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Human-readable outcome message.
    pub msg: String,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub msg: String,
}

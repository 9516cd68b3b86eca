//! User resource wire types.
//!
//! Passwords are write-only: they appear in [`UserChange::Password`] and
//! in registration credentials, never in any read model.

use serde::{Deserialize, Serialize};

/// Opaque server-assigned user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a user identifier from its string representation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this user ID.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authorization role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account: sees only its own assigned tasks.
    User,
    /// Administrator: sees all tasks and manages accounts.
    Admin,
}

impl Role {
    /// Returns the wire string for this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user record as returned by `GET /users` (admin only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique record identifier.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Login email address.
    pub email: String,
    /// Authorization role.
    pub role: Role,
}

/// Body of `PUT /users/:id`.
///
/// Role changes and password changes are distinct operations and must
/// never share a request — the enum makes combining them unrepresentable
/// rather than relying on runtime validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserChange {
    /// Change the account's role.
    Role {
        /// The new role.
        role: Role,
    },
    /// Change the account's password.
    Password {
        /// The new password, in the clear (the server hashes it).
        password: String,
    },
}

//! Shared in-memory state: accounts, tasks, documents, and live tokens.
//!
//! Everything lives in maps behind `tokio::sync::RwLock`. Nothing is
//! persistent — this server exists to make the REST contract executable
//! in integration tests and local development, not to hold data anyone
//! cares about. Passwords are compared in the clear for the same reason.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use taskhub_api::task::{Task, TaskId};
use taskhub_api::user::{Role, User, UserId};

/// One account, with its (plaintext, dev-only) password.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// The user as exposed over the API.
    pub user: User,
    /// Login password.
    pub password: String,
}

/// Claims attached to a live bearer token.
#[derive(Debug, Clone)]
pub struct Claims {
    /// The token itself, kept so logout can revoke it.
    pub token: String,
    /// Subject of the token.
    pub user_id: UserId,
    /// Subject's role at issue time.
    pub role: Role,
}

impl Claims {
    /// Whether the subject holds the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// An uploaded document's stored bytes.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    /// Task the document belongs to.
    pub task_id: TaskId,
    /// Filename as uploaded.
    pub original_name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

/// Shared server state.
#[derive(Debug, Default)]
pub struct ServerState {
    /// Accounts keyed by user id.
    pub users: RwLock<HashMap<String, UserRecord>>,
    /// Tasks keyed by task id.
    pub tasks: RwLock<HashMap<String, Task>>,
    /// Document payloads keyed by stored name.
    pub documents: RwLock<HashMap<String, StoredDocument>>,
    /// Live bearer tokens. Logout removes the entry, which is all token
    /// revocation amounts to here.
    pub sessions: RwLock<HashMap<String, Claims>>,
}

/// Mints an opaque record identifier.
#[must_use]
pub fn mint_id() -> String {
    Uuid::now_v7().simple().to_string()
}

impl ServerState {
    /// Creates empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an account with the given role, returning its id.
    /// Used for seeding admins (tests, `[admin]` config section) —
    /// registration over the API only ever creates plain users.
    pub async fn seed_account(&self, email: &str, password: &str, role: Role) -> UserId {
        let id = UserId::new(mint_id());
        let record = UserRecord {
            user: User {
                id: id.clone(),
                email: email.to_string(),
                role,
            },
            password: password.to_string(),
        };
        self.users.write().await.insert(id.to_string(), record);
        id
    }

    /// Looks up an account by email.
    pub async fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        self.users
            .read()
            .await
            .values()
            .find(|r| r.user.email == email)
            .cloned()
    }

    /// Issues a bearer token for the given account.
    pub async fn issue_token(&self, user_id: &UserId, role: Role) -> String {
        let token = mint_id();
        let claims = Claims {
            token: token.clone(),
            user_id: user_id.clone(),
            role,
        };
        self.sessions.write().await.insert(token.clone(), claims);
        token
    }

    /// Revokes a bearer token. Unknown tokens are ignored.
    pub async fn revoke_token(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }
}

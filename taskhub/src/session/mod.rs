//! Session lifecycle: the authentication credential and its persisted form.
//!
//! The [`SessionManager`] is the only component that writes session
//! state. It configures the gateway's bearer credential on every
//! transition, so the rest of the engine never touches tokens directly.
//!
//! # Lifecycle
//!
//! ```text
//! Unauthenticated ──login/register──▶ Authenticating ──ok──▶ Authenticated
//!        ▲                                  │
//!        │                                 err
//!        ├──────────── logout ──────────────┴──▶ Failed
//!        └──────────── invalidate ◀── consumer saw a 401
//! ```
//!
//! A 401 observed during any later store operation is a *signal* that the
//! session is stale, not something handled here automatically — the
//! consuming layer decides whether to call [`SessionManager::invalidate`].

pub mod persist;

use std::sync::Arc;

use parking_lot::RwLock;

use taskhub_api::auth::Credentials;
use taskhub_api::user::{Role, UserId};

use crate::gateway::{ApiError, Gateway};
use self::persist::{CredentialFile, StoredCredential};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPhase {
    /// No credential; the default state and the state after logout.
    #[default]
    Unauthenticated,
    /// A login or registration call is in flight.
    Authenticating,
    /// A credential is held and attached to the gateway.
    Authenticated,
    /// The last login or registration attempt failed.
    Failed,
}

/// Point-in-time copy of the session state.
///
/// Invariant: `token` is `Some` exactly when `phase` is
/// [`AuthPhase::Authenticated`]. `user_id` and `role` are only
/// meaningful while authenticated, and may still be absent right after
/// registration (the server reports no identity on that path).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    /// Bearer token, present only while authenticated.
    pub token: Option<String>,
    /// Authenticated subject, when known.
    pub user_id: Option<UserId>,
    /// Subject's role, when known.
    pub role: Option<Role>,
    /// Lifecycle phase.
    pub phase: AuthPhase,
    /// Message of the last failed attempt, if the phase is [`AuthPhase::Failed`].
    pub error: Option<String>,
}

impl SessionSnapshot {
    /// Whether the session holds a credential.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.phase, AuthPhase::Authenticated)
    }
}

/// Errors surfaced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Both email and password must be present before a call is attempted
    /// — the pre-check that saves a round-trip for empty forms.
    #[error("email and password are required")]
    MissingCredentials,

    /// The server rejected the attempt; the message is the server's.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Owns the authentication credential and its lifecycle.
pub struct SessionManager<G: Gateway> {
    gateway: Arc<G>,
    credentials: CredentialFile,
    state: RwLock<SessionSnapshot>,
}

impl<G: Gateway> SessionManager<G> {
    /// Creates a manager over the given gateway and credential file.
    /// The session starts unauthenticated; call
    /// [`restore`](Self::restore) to pick up a persisted credential.
    #[must_use]
    pub fn new(gateway: Arc<G>, credentials: CredentialFile) -> Self {
        Self {
            gateway,
            credentials,
            state: RwLock::new(SessionSnapshot::default()),
        }
    }

    /// Returns a copy of the current session state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.read().clone()
    }

    /// Restores a persisted credential from disk, if one exists.
    ///
    /// No validation round-trip is made — a stale token will simply earn
    /// a 401 on the first real call, which the consumer routes back to
    /// [`invalidate`](Self::invalidate). An unreadable file is logged and
    /// treated as absent.
    ///
    /// Returns whether a credential was restored.
    pub fn restore(&self) -> bool {
        let stored = match self.credentials.load() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "could not read persisted session; starting clean");
                None
            }
        };
        let Some(stored) = stored else {
            return false;
        };

        self.gateway.attach_token(&stored.token);
        *self.state.write() = SessionSnapshot {
            token: Some(stored.token),
            user_id: stored.user_id,
            role: stored.role,
            phase: AuthPhase::Authenticated,
            error: None,
        };
        tracing::info!("session restored from disk");
        true
    }

    /// Authenticates with the server.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingCredentials`] without any network
    /// call when either field is empty, or the server's error on a
    /// rejected attempt — in which case the phase is `Failed` and the
    /// message is kept in the snapshot for display.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), SessionError> {
        self.precheck(credentials)?;
        self.state.write().phase = AuthPhase::Authenticating;

        match self.gateway.login(credentials).await {
            Ok(response) => {
                self.establish(
                    response.access_token,
                    Some(response.user_id),
                    Some(response.role),
                );
                tracing::info!("login succeeded");
                Ok(())
            }
            Err(e) => {
                self.fail(&e);
                Err(e.into())
            }
        }
    }

    /// Registers a new account; success also authenticates the caller.
    ///
    /// The registration response carries only a token — subject id and
    /// role stay unknown until the next login.
    ///
    /// # Errors
    ///
    /// Same contract as [`login`](Self::login).
    pub async fn register(&self, credentials: &Credentials) -> Result<(), SessionError> {
        self.precheck(credentials)?;
        self.state.write().phase = AuthPhase::Authenticating;

        match self.gateway.register(credentials).await {
            Ok(response) => {
                self.establish(response.access_token, None, None);
                tracing::info!("registration succeeded");
                Ok(())
            }
            Err(e) => {
                self.fail(&e);
                Err(e.into())
            }
        }
    }

    /// Ends the session.
    ///
    /// Two independent steps: a best-effort server-side logout call, then
    /// an *unconditional* local clear. A dead server must never leave the
    /// client stuck looking authenticated, so the second step does not
    /// depend on the first in any way.
    pub async fn logout(&self) {
        if let Err(e) = self.gateway.logout().await {
            tracing::warn!(error = %e, "server-side logout failed; clearing locally anyway");
        }
        self.clear_local();
        tracing::info!("logged out");
    }

    /// Clears the session locally without a server call.
    ///
    /// The consumer's response to an observed 401: the credential is
    /// already dead server-side, so there is nothing to tell the server.
    pub fn invalidate(&self) {
        self.clear_local();
        tracing::info!("session invalidated");
    }

    fn precheck(&self, credentials: &Credentials) -> Result<(), SessionError> {
        if credentials.email.is_empty() || credentials.password.is_empty() {
            return Err(SessionError::MissingCredentials);
        }
        Ok(())
    }

    /// Persists and installs a fresh credential.
    fn establish(&self, token: String, user_id: Option<UserId>, role: Option<Role>) {
        let stored = StoredCredential {
            token: token.clone(),
            user_id: user_id.clone(),
            role,
        };
        // Persistence failure degrades to an in-memory session; the user
        // just logs in again next start.
        if let Err(e) = self.credentials.save(&stored) {
            tracing::warn!(error = %e, "could not persist session");
        }

        self.gateway.attach_token(&token);
        *self.state.write() = SessionSnapshot {
            token: Some(token),
            user_id,
            role,
            phase: AuthPhase::Authenticated,
            error: None,
        };
    }

    fn fail(&self, error: &ApiError) {
        let mut state = self.state.write();
        state.phase = AuthPhase::Failed;
        state.error = Some(error.message.clone());
    }

    fn clear_local(&self) {
        if let Err(e) = self.credentials.erase() {
            tracing::warn!(error = %e, "could not erase persisted session");
        }
        self.gateway.detach_token();
        *self.state.write() = SessionSnapshot::default();
    }
}

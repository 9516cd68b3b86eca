//! Role gating for protected views.
//!
//! A pure predicate over session state — no I/O, no store access — so a
//! routing layer can call it on every navigation without cost. The one
//! subtlety is startup: while the session is still authenticating (or
//! being restored), the guard answers [`RouteDecision::Pending`] rather
//! than denying, to avoid a flash-redirect to the login view that would
//! be reversed a moment later.

use taskhub_api::user::Role;

use crate::session::{AuthPhase, SessionSnapshot};

/// What the routing layer should do with a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The session state is not settled yet; render nothing conclusive.
    Pending,
    /// Let the navigation through.
    Allow,
    /// No credential: send the user to the login view.
    RedirectToLogin,
    /// Authenticated but under-privileged: send the user to the default
    /// authorized view. A redirect, not an error.
    RedirectToDefault,
}

/// Decides whether the session may enter a view requiring `required_role`.
///
/// `None` means the view only requires authentication. A role mismatch —
/// including a role that is simply unknown, as right after registration —
/// redirects to the default view rather than erroring.
#[must_use]
pub fn decide(session: &SessionSnapshot, required_role: Option<Role>) -> RouteDecision {
    match session.phase {
        AuthPhase::Authenticating => RouteDecision::Pending,
        AuthPhase::Unauthenticated | AuthPhase::Failed => RouteDecision::RedirectToLogin,
        AuthPhase::Authenticated => match required_role {
            None => RouteDecision::Allow,
            Some(required) if session.role == Some(required) => RouteDecision::Allow,
            Some(_) => RouteDecision::RedirectToDefault,
        },
    }
}

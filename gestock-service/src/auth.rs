//! Role-based authorization guard.
//!
//! Views declare the roles they allow; the guard checks the caller's session
//! against the store on every call, so a role change takes effect on the next
//! navigation without re-login.

use std::sync::Arc;

use gestock_core::errors::GestockError;
use gestock_core::traits::RecordStore;
use gestock_core::types::identifiers::UserId;
use gestock_core::types::role::Role;
use gestock_core::types::user::UserProfile;

/// The caller's authentication context. Built from the identity provider's
/// `current_user()` at the view boundary and passed down explicitly.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user_id: Option<UserId>,
}

impl Session {
    /// A session with nobody signed in.
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    /// The caller may proceed; carries their freshly-read profile.
    Granted(UserProfile),
    /// No session, or the session's user document is gone. The view should
    /// redirect to login.
    DeniedUnauthenticated,
    /// Authenticated but the role is not in the allowed set. The view should
    /// redirect to the caller's default view.
    DeniedRole { actual: Role },
}

/// Checks sessions against the user store.
#[derive(Clone)]
pub struct AuthorizationGuard {
    store: Arc<dyn RecordStore>,
}

impl AuthorizationGuard {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Check the session against `allowed`. An empty `allowed` grants any
    /// authenticated user. The role is re-read from the store each time.
    pub fn authorize(
        &self,
        session: &Session,
        allowed: &[Role],
    ) -> Result<Access, GestockError> {
        let Some(user_id) = session.user_id() else {
            return Ok(Access::DeniedUnauthenticated);
        };
        let Some(profile) = self.store.get_user(user_id)? else {
            // A session pointing at a deleted user document is treated the
            // same as no session at all.
            return Ok(Access::DeniedUnauthenticated);
        };
        if allowed.is_empty() || allowed.contains(&profile.role) {
            Ok(Access::Granted(profile))
        } else {
            tracing::debug!(user = %profile.id, role = %profile.role, "access denied");
            Ok(Access::DeniedRole {
                actual: profile.role,
            })
        }
    }

    /// Like [`authorize`](Self::authorize), but denials become
    /// `GestockError::Permission`. Used by managers whose operations are
    /// role-gated rather than redirect-driven.
    pub fn require(
        &self,
        session: &Session,
        allowed: &[Role],
    ) -> Result<UserProfile, GestockError> {
        match self.authorize(session, allowed)? {
            Access::Granted(profile) => Ok(profile),
            Access::DeniedUnauthenticated => {
                Err(GestockError::Permission("not signed in".to_string()))
            }
            Access::DeniedRole { actual } => Err(GestockError::Permission(format!(
                "role {actual} is not allowed for this operation"
            ))),
        }
    }
}

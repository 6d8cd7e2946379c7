//! Identity-provider boundary.
//!
//! Authentication is delegated to a hosted service; this workspace only
//! consumes the uid it issues and never stores credentials.

use crate::types::identifiers::UserId;

/// Errors from the external identity provider.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Minimal surface of the hosted authentication service.
pub trait IdentityProvider: Send + Sync {
    /// Exchange credentials for a session; returns the authenticated uid.
    fn sign_in(&self, identifiant: &str, secret: &str) -> Result<UserId, IdentityError>;

    fn sign_out(&self);

    /// The currently signed-in user, if any.
    fn current_user(&self) -> Option<UserId>;
}

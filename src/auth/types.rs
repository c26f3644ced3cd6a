//! Identity types shared by the session and its providers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier that scopes every per-user collection
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// What subscribers of the auth session observe.
///
/// Starts as `loading` with no user; the first identity resolution clears
/// `loading` for good.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn phase(&self) -> AuthPhase {
        match (&self.user, self.loading) {
            (_, true) => AuthPhase::Unknown,
            (Some(_), false) => AuthPhase::Authenticated,
            (None, false) => AuthPhase::Anonymous,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Unknown,
    Authenticated,
    Anonymous,
}

/// Errors reported by an identity provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("Email already in use: {0}")]
    EmailAlreadyInUse(String),

    #[error("Invalid email or password")]
    InvalidCredential,

    #[error("No user signed in")]
    NotSignedIn,

    #[error("Identity provider failure: {0}")]
    Provider(String),
}

impl AuthError {
    /// Provider-style error code for mapping to user-facing text.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidEmail(_) => "auth/invalid-email",
            AuthError::WeakPassword(_) => "auth/weak-password",
            AuthError::EmailAlreadyInUse(_) => "auth/email-already-in-use",
            AuthError::InvalidCredential => "auth/invalid-credential",
            AuthError::NotSignedIn => "auth/no-current-user",
            AuthError::Provider(_) => "auth/internal-error",
        }
    }
}

//! Identity provider contract.

use super::types::{AuthError, User};
use crate::observer::Subscription;
use std::sync::Arc;

/// Callback receiving the current identity on every change.
pub type IdentityListener = Arc<dyn Fn(Option<User>) + Send + Sync>;

/// Source of identities: sign-up, sign-in, sign-out and change notification.
pub trait IdentityProvider: Send + Sync {
    /// Observe identity changes. The listener fires once right away with the
    /// current identity, then after every sign-in and sign-out.
    fn on_identity_change(&self, listener: IdentityListener) -> Subscription;

    /// Create an account and sign it in.
    fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError>;

    fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;

    fn sign_out(&self) -> Result<(), AuthError>;

    /// Change the display name of the signed-in user.
    fn update_display_name(&self, display_name: &str) -> Result<User, AuthError>;
}

//! Authentication: identity providers and the auth session.

pub mod local;
pub mod provider;
pub mod session;
pub mod types;

pub use local::LocalIdentityProvider;
pub use provider::{IdentityListener, IdentityProvider};
pub use session::{AuthSession, RedirectPolicy};
pub use types::{AuthError, AuthPhase, AuthState, User};

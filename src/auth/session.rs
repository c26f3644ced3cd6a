//! Auth session: who is signed in, and the redirects that follow.

use super::provider::IdentityProvider;
use super::types::{AuthError, AuthState, User};
use crate::observer::{lock, ListenerRegistry, Subscription};
use crate::router::{NavigationIntent, NavigationReason, Navigator};
use std::sync::{Arc, Mutex};

/// Paths and destinations used by the auth redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPolicy {
    /// Paths reachable without an identity
    pub public_paths: Vec<String>,
    pub login_path: String,
    pub home_path: String,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        Self {
            public_paths: vec!["/login".to_string(), "/register".to_string()],
            login_path: "/login".to_string(),
            home_path: "/".to_string(),
        }
    }
}

impl RedirectPolicy {
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| p == path)
    }

    /// Where an identity transition must send the user, if anywhere.
    pub fn redirect_for(&self, user: Option<&User>, current_path: &str) -> Option<NavigationIntent> {
        match user {
            None if !self.is_public(current_path) => Some(NavigationIntent::new(
                self.login_path.clone(),
                NavigationReason::AuthRequired,
            )),
            Some(_) if self.is_public(current_path) => Some(NavigationIntent::new(
                self.home_path.clone(),
                NavigationReason::AlreadyAuthenticated,
            )),
            _ => None,
        }
    }
}

/// Single source of truth for the current identity.
pub struct AuthSession {
    provider: Arc<dyn IdentityProvider>,
    navigator: Arc<dyn Navigator>,
    policy: RedirectPolicy,
    state: Mutex<AuthState>,
    listeners: ListenerRegistry<AuthState>,
    provider_subscription: Mutex<Option<Subscription>>,
}

impl AuthSession {
    /// Create a session and start observing `provider`.
    pub fn new(provider: Arc<dyn IdentityProvider>, navigator: Arc<dyn Navigator>) -> Arc<Self> {
        Self::with_policy(provider, navigator, RedirectPolicy::default())
    }

    pub fn with_policy(
        provider: Arc<dyn IdentityProvider>,
        navigator: Arc<dyn Navigator>,
        policy: RedirectPolicy,
    ) -> Arc<Self> {
        let session = Arc::new(Self {
            provider: Arc::clone(&provider),
            navigator,
            policy,
            state: Mutex::new(AuthState::default()),
            listeners: ListenerRegistry::new(),
            provider_subscription: Mutex::new(None),
        });

        let weak = Arc::downgrade(&session);
        let subscription = provider.on_identity_change(Arc::new(move |user| {
            if let Some(session) = weak.upgrade() {
                session.identity_changed(user);
            }
        }));
        *lock(&session.provider_subscription) = Some(subscription);

        session
    }

    fn identity_changed(&self, user: Option<User>) {
        let state = {
            let mut state = lock(&self.state);
            state.user = user;
            state.loading = false;
            state.clone()
        };

        match &state.user {
            Some(user) => tracing::info!("Signed in as {}", user.uid),
            None => tracing::info!("No identity"),
        }

        self.listeners.notify(&state);

        let current_path = self.navigator.current_path();
        if let Some(intent) = self.policy.redirect_for(state.user.as_ref(), &current_path) {
            tracing::info!("Redirecting from {} to {}", current_path, intent.path);
            self.navigator.navigate(intent);
        }
    }

    /// Register `callback` and invoke it once with the current state.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        let callback = Arc::new(callback);
        let registered = Arc::clone(&callback);
        let subscription = self.listeners.add(move |state| registered(state));

        let current = self.state();
        callback(&current);

        subscription
    }

    /// Create an account. Provider errors are returned unchanged.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<User, AuthError> {
        let mut user = self.provider.sign_up(email, password)?;

        if let Some(name) = display_name.filter(|n| !n.trim().is_empty()) {
            user = self.provider.update_display_name(name)?;
            let mut state = lock(&self.state);
            if state.user.as_ref().map(|u| &u.uid) == Some(&user.uid) {
                state.user = Some(user.clone());
            }
        }

        Ok(user)
    }

    /// Sign in. Provider errors are returned unchanged.
    pub fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.provider.sign_in(email, password)
    }

    /// Sign out and go to the login page. Failures are logged, never returned.
    pub fn logout(&self) {
        match self.provider.sign_out() {
            Ok(()) => self.navigator.navigate(NavigationIntent::new(
                self.policy.login_path.clone(),
                NavigationReason::SignedOut,
            )),
            Err(e) => tracing::error!("Error signing out: {}", e),
        }
    }

    pub fn state(&self) -> AuthState {
        lock(&self.state).clone()
    }

    pub fn current_user(&self) -> Option<User> {
        lock(&self.state).user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        lock(&self.state).user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.state).loading
    }

    pub fn policy(&self) -> &RedirectPolicy {
        &self.policy
    }
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        if let Some(mut subscription) = lock(&self.provider_subscription).take() {
            subscription.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            uid: "u1".to_string(),
            email: "ana@example.com".to_string(),
            display_name: None,
        }
    }

    #[test]
    fn test_anonymous_on_protected_path_goes_to_login() {
        let policy = RedirectPolicy::default();
        let intent = policy.redirect_for(None, "/workout").unwrap();
        assert_eq!(intent.path, "/login");
        assert_eq!(intent.reason, NavigationReason::AuthRequired);
    }

    #[test]
    fn test_signed_in_on_public_path_goes_home() {
        let policy = RedirectPolicy::default();
        let intent = policy.redirect_for(Some(&user()), "/register").unwrap();
        assert_eq!(intent.path, "/");
    }

    #[test]
    fn test_no_redirect_when_already_in_place() {
        let policy = RedirectPolicy::default();
        assert!(policy.redirect_for(None, "/login").is_none());
        assert!(policy.redirect_for(Some(&user()), "/progress").is_none());
    }
}

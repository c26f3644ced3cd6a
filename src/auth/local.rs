//! Identity provider backed by the local database.
//!
//! Accounts live in the `users` table with Argon2id password hashes in PHC
//! string format. One identity is signed in at a time.

use super::provider::{IdentityListener, IdentityProvider};
use super::types::{AuthError, User};
use crate::observer::{lock, ListenerRegistry, Subscription};
use crate::storage::{Database, DatabaseError, UserRow};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Minimum password length accepted by default.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

pub struct LocalIdentityProvider {
    db: Arc<Database>,
    min_password_length: usize,
    current: Mutex<Option<User>>,
    listeners: ListenerRegistry<Option<User>>,
}

impl LocalIdentityProvider {
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_min_password_length(db, DEFAULT_MIN_PASSWORD_LENGTH)
    }

    pub fn with_min_password_length(db: Arc<Database>, min_password_length: usize) -> Self {
        Self {
            db,
            min_password_length,
            current: Mutex::new(None),
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn current_user(&self) -> Option<User> {
        lock(&self.current).clone()
    }

    fn set_current(&self, user: Option<User>) {
        *lock(&self.current) = user.clone();
        self.listeners.notify(&user);
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn on_identity_change(&self, listener: IdentityListener) -> Subscription {
        let registered = Arc::clone(&listener);
        let subscription = self.listeners.add(move |user| registered(user.clone()));
        listener(self.current_user());
        subscription
    }

    fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email);
        validate_email(&email)?;
        if password.chars().count() < self.min_password_length {
            return Err(AuthError::WeakPassword(self.min_password_length));
        }

        if self.db.find_user_by_email(&email).map_err(provider_error)?.is_some() {
            return Err(AuthError::EmailAlreadyInUse(email));
        }

        let row = UserRow {
            id: Uuid::new_v4().to_string(),
            email: email.clone(),
            display_name: None,
            password_hash: hash_password(password)?,
        };
        self.db.insert_user(&row).map_err(|e| match e {
            DatabaseError::ConstraintViolation(_) => AuthError::EmailAlreadyInUse(email.clone()),
            other => provider_error(other),
        })?;

        tracing::info!("Created account {}", row.id);
        let user = to_user(row);
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email);
        validate_email(&email)?;

        let row = self
            .db
            .find_user_by_email(&email)
            .map_err(provider_error)?
            .ok_or(AuthError::InvalidCredential)?;

        if !verify_password(password, &row.password_hash)? {
            tracing::warn!("Rejected sign-in for {}", row.id);
            return Err(AuthError::InvalidCredential);
        }

        let user = to_user(row);
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        self.set_current(None);
        Ok(())
    }

    fn update_display_name(&self, display_name: &str) -> Result<User, AuthError> {
        let mut user = self.current_user().ok_or(AuthError::NotSignedIn)?;

        self.db
            .update_user_display_name(&user.uid, display_name)
            .map_err(provider_error)?;
        user.display_name = Some(display_name.to_string());

        // Profile edits are not identity transitions: no notification.
        let mut current = lock(&self.current);
        if current.as_ref().map(|u| &u.uid) == Some(&user.uid) {
            *current = Some(user.clone());
        }
        Ok(user)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AuthError::InvalidEmail(email.to_string()))
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Provider(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Provider(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Provider(e.to_string())),
    }
}

fn to_user(row: UserRow) -> User {
    User {
        uid: row.id,
        email: row.email,
        display_name: row.display_name,
    }
}

fn provider_error(e: DatabaseError) -> AuthError {
    AuthError::Provider(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> LocalIdentityProvider {
        LocalIdentityProvider::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    #[test]
    fn test_sign_up_then_sign_in() {
        let provider = provider();
        let created = provider.sign_up("Ana@Example.com", "secret1").unwrap();
        assert_eq!(created.email, "ana@example.com");
        assert_eq!(provider.current_user(), Some(created.clone()));

        provider.sign_out().unwrap();
        assert!(provider.current_user().is_none());

        let signed_in = provider.sign_in("ana@example.com", "secret1").unwrap();
        assert_eq!(signed_in.uid, created.uid);
    }

    #[test]
    fn test_sign_up_errors() {
        let provider = provider();
        assert_eq!(
            provider.sign_up("not-an-email", "secret1"),
            Err(AuthError::InvalidEmail("not-an-email".to_string()))
        );
        assert_eq!(
            provider.sign_up("ana@example.com", "12345"),
            Err(AuthError::WeakPassword(6))
        );

        provider.sign_up("ana@example.com", "secret1").unwrap();
        let err = provider.sign_up("ana@example.com", "secret2").unwrap_err();
        assert_eq!(err.code(), "auth/email-already-in-use");
    }

    #[test]
    fn test_wrong_password_rejected() {
        let provider = provider();
        provider.sign_up("ana@example.com", "secret1").unwrap();
        provider.sign_out().unwrap();

        assert_eq!(
            provider.sign_in("ana@example.com", "wrong-one"),
            Err(AuthError::InvalidCredential)
        );
        assert_eq!(
            provider.sign_in("bob@example.com", "secret1"),
            Err(AuthError::InvalidCredential)
        );
        assert!(provider.current_user().is_none());
    }

    #[test]
    fn test_listener_fires_immediately_and_on_change() {
        let provider = provider();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let _sub = provider.on_identity_change(Arc::new(move |user: Option<User>| {
            sink.lock().unwrap().push(user.map(|u| u.email));
        }));

        provider.sign_up("ana@example.com", "secret1").unwrap();
        provider.sign_out().unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![None, Some("ana@example.com".to_string()), None]
        );
    }

    #[test]
    fn test_update_display_name_requires_user() {
        let provider = provider();
        assert_eq!(provider.update_display_name("Ana"), Err(AuthError::NotSignedIn));

        provider.sign_up("ana@example.com", "secret1").unwrap();
        let user = provider.update_display_name("Ana").unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Ana"));
        assert_eq!(provider.current_user().unwrap().display_name.as_deref(), Some("Ana"));
    }
}

//! Application root.
//!
//! Owns the single instance of each service: the database, the identity
//! provider, the router, the auth session and the data store. The store
//! follows the session; every sign-in also seeds and publishes that
//! identity's settings.

use crate::auth::{AuthError, AuthSession, IdentityProvider, LocalIdentityProvider, User};
use crate::metrics::progress;
use crate::observer::{lock, Subscription};
use crate::repository::{DataTransfer, RepositoryError, SettingsRepository, WorkoutRepository};
use crate::router::{HashRouter, Navigator};
use crate::storage::{AppConfig, Database, DatabaseError, SettingDefaults};
use crate::store::{CollectionSource, DataStore};
use chrono::{Local, NaiveDate};
use std::sync::{Arc, Mutex, Weak};
use thiserror::Error;

/// Routes of the application shell.
pub const ROUTES: &[&str] = &[
    "/",
    "/login",
    "/register",
    "/log",
    "/workout",
    "/workout/:id",
    "/routines",
    "/progress",
    "/library",
    "/profile",
];

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Repository(#[from] RepositoryError),
}

/// At-a-glance numbers for the signed-in identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub workouts: usize,
    pub workouts_last_7_days: usize,
    pub streak_days: u32,
    pub average_duration: u32,
    pub total_volume: f64,
    pub routines: usize,
    pub personal_records: usize,
    pub latest_weight: Option<f64>,
    pub top_exercises: Vec<(String, f64)>,
}

pub struct App {
    config: AppConfig,
    db: Arc<Database>,
    router: Arc<HashRouter>,
    auth: Arc<AuthSession>,
    store: Arc<DataStore>,
    settings_subscription: Mutex<Option<Subscription>>,
}

impl App {
    /// Open the database named by `config` and wire the services.
    pub fn open(config: AppConfig) -> Result<Self, AppError> {
        let db = Database::open(&config.database_path())?;
        Ok(Self::with_database(config, Arc::new(db)))
    }

    pub fn with_database(config: AppConfig, db: Arc<Database>) -> Self {
        let router = Arc::new(HashRouter::new());
        for route in ROUTES {
            router.on(*route);
        }

        let provider: Arc<dyn IdentityProvider> = Arc::new(
            LocalIdentityProvider::with_min_password_length(
                Arc::clone(&db),
                config.auth.min_password_length,
            ),
        );
        let navigator: Arc<dyn Navigator> = router.clone();
        let auth = AuthSession::with_policy(provider, navigator, config.auth.redirect_policy());

        let source: Arc<dyn CollectionSource> = db.clone();
        let store = DataStore::connect(source, &auth);

        install_route_guard(&router, Arc::downgrade(&auth));

        let app = Self {
            config,
            db,
            router,
            auth,
            store,
            settings_subscription: Mutex::new(None),
        };
        app.follow_settings();
        app
    }

    // Registered after the store, so the store already serves the identity
    // when its settings are published.
    fn follow_settings(&self) {
        let db = Arc::clone(&self.db);
        let store = Arc::downgrade(&self.store);
        let defaults = self.config.defaults.clone();

        let subscription = self.auth.subscribe(move |state| {
            if let (Some(user), Some(store)) = (&state.user, store.upgrade()) {
                publish_settings(&db, &store, &user.uid, &defaults);
            }
        });
        *lock(&self.settings_subscription) = Some(subscription);
    }

    pub fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<User, AppError> {
        Ok(self.auth.register(email, password, display_name)?)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        Ok(self.auth.login(email, password)?)
    }

    pub fn logout(&self) {
        self.auth.logout();
    }

    /// The signed-in identity, or `NotSignedIn`.
    pub fn require_user(&self) -> Result<User, AppError> {
        self.auth
            .current_user()
            .ok_or(AppError::Auth(AuthError::NotSignedIn))
    }

    /// Change a setting of the signed-in identity and republish the map.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        let user = self.require_user()?;
        let settings = SettingsRepository::new(&self.db, &user.uid);
        settings.set(key, value)?;
        self.store.set_settings(&user.uid, settings.all()?);
        Ok(())
    }

    pub fn summary(&self) -> Result<Summary, AppError> {
        self.summary_on(Local::now().date_naive())
    }

    /// Summary as seen on `today`, from the store's mirror plus the
    /// exercises of every workout.
    pub fn summary_on(&self, today: NaiveDate) -> Result<Summary, AppError> {
        let user = self.require_user()?;
        let state = self.store.state();
        let exercises = WorkoutRepository::new(&self.db, &user.uid).all_exercises()?;

        Ok(Summary {
            workouts: state.workouts.len(),
            workouts_last_7_days: progress::workout_frequency(&state.workouts, 7, today),
            streak_days: progress::current_streak(&state.workouts, today),
            average_duration: progress::average_duration(&state.workouts),
            total_volume: progress::total_volume(&exercises),
            routines: state.routines.len(),
            personal_records: state.personal_records.len(),
            latest_weight: state.body_metrics.first().map(|m| m.weight),
            top_exercises: progress::top_exercises_by_volume(&exercises, 5),
        })
    }

    pub fn export_json(&self) -> Result<String, AppError> {
        let user = self.require_user()?;
        Ok(DataTransfer::new(&self.db, &user.uid).export_json()?)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn auth(&self) -> &Arc<AuthSession> {
        &self.auth
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    pub fn router(&self) -> &Arc<HashRouter> {
        &self.router
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(mut subscription) = lock(&self.settings_subscription).take() {
            subscription.unsubscribe();
        }
    }
}

/// Veto protected routes while nobody is signed in.
fn install_route_guard(router: &HashRouter, auth: Weak<AuthSession>) {
    router.before_each(move |to, _from| match auth.upgrade() {
        Some(auth) => auth.is_authenticated() || auth.policy().is_public(to),
        None => true,
    });
}

fn publish_settings(db: &Database, store: &DataStore, owner: &str, defaults: &SettingDefaults) {
    let settings = SettingsRepository::new(db, owner);
    let result = settings
        .seed_defaults(defaults)
        .and_then(|_| settings.all());

    match result {
        Ok(all) => store.set_settings(owner, all),
        Err(e) => tracing::error!("Error loading settings: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::NavigationReason;

    fn app() -> App {
        App::with_database(
            AppConfig::default(),
            Arc::new(Database::open_in_memory().unwrap()),
        )
    }

    #[test]
    fn test_starts_anonymous_on_login_page() {
        let app = app();
        assert!(!app.auth().is_loading());
        assert!(!app.auth().is_authenticated());
        assert_eq!(app.router().current_path(), "/login");

        let intents = app.router().take_intents();
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].reason, NavigationReason::AuthRequired);
    }

    #[test]
    fn test_register_initializes_store_with_default_settings() {
        let app = app();
        let user = app.register("ana@example.com", "secret1", Some("Ana")).unwrap();

        assert_eq!(app.store().owner().as_deref(), Some(user.uid.as_str()));
        assert!(app.store().is_initialized());
        assert_eq!(app.store().get_setting("theme").as_deref(), Some("dark"));
        assert_eq!(app.store().get_setting("distanceUnit").as_deref(), Some("km"));
        assert_eq!(app.router().current_path(), "/");
        assert_eq!(app.auth().current_user().unwrap().display_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_logout_resets_store() {
        let app = app();
        app.register("ana@example.com", "secret1", None).unwrap();
        app.logout();

        assert!(!app.store().is_initialized());
        assert!(app.store().get_settings().is_empty());
        assert_eq!(app.router().current_path(), "/login");
        assert!(matches!(app.summary(), Err(AppError::Auth(AuthError::NotSignedIn))));
    }

    #[test]
    fn test_guard_blocks_protected_routes_when_anonymous() {
        let app = app();
        app.router()
            .navigate(crate::router::NavigationIntent::user("/progress"));
        assert_eq!(app.router().current_path(), "/login");
    }

    #[test]
    fn test_set_setting_republishes() {
        let app = app();
        app.register("ana@example.com", "secret1", None).unwrap();
        app.set_setting("theme", "light").unwrap();
        assert_eq!(app.store().get_setting("theme").as_deref(), Some("light"));
    }
}

//! Avance - Self-hosted Fitness Log
//!
//! The data core of a personal fitness tracker: an auth session that
//! tracks the signed-in identity, a reactive store that mirrors that
//! identity's collections through live queries, and repositories for
//! workouts, routines, body metrics, photos, personal records and
//! settings on an embedded SQLite database.

pub mod app;
pub mod auth;
pub mod metrics;
pub mod models;
pub mod observer;
pub mod repository;
pub mod router;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use app::{App, AppError, Summary};
pub use auth::{AuthSession, LocalIdentityProvider, User};
pub use repository::{PersonalRecordRepository, SettingsRepository, WorkoutRepository};
pub use router::HashRouter;
pub use storage::{AppConfig, Database};
pub use store::{DataState, DataStore};

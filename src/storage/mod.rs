//! Storage module for database and configuration.

pub mod config;
pub mod database;
pub mod schema;

pub use config::{AppConfig, AuthSettings, ConfigError, SettingDefaults, Theme, Units};
pub use database::{Database, DatabaseError, UserRow};

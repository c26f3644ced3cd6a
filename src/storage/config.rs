//! Application configuration and per-identity setting defaults.

use crate::auth::RedirectPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Unit system preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Metric units (kg, km)
    #[default]
    Metric,
    /// Imperial units (lbs, miles)
    Imperial,
}

impl Units {
    /// Name stored in the settings table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn weight_unit(&self) -> &'static str {
        match self {
            Units::Metric => "kg",
            Units::Imperial => "lbs",
        }
    }

    pub fn distance_unit(&self) -> &'static str {
        match self {
            Units::Metric => "km",
            Units::Imperial => "mi",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Units::Metric => write!(f, "Metric"),
            Units::Imperial => write!(f, "Imperial"),
        }
    }
}

/// UI theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark theme (default)
    #[default]
    Dark,
    /// Light theme
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Dark => write!(f, "Dark"),
            Theme::Light => write!(f, "Light"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Database file name, relative to the data directory
    pub database_file: String,
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Sign-in settings
    pub auth: AuthSettings,
    /// Settings seeded for every new identity
    pub defaults: SettingDefaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            database_file: "avance.db".to_string(),
            log_level: "info".to_string(),
            auth: AuthSettings::default(),
            defaults: SettingDefaults::default(),
        }
    }
}

impl AppConfig {
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }
}

/// Sign-in related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Shortest accepted password
    pub min_password_length: usize,
    /// Routes reachable without signing in
    pub public_paths: Vec<String>,
    pub home_path: String,
    pub login_path: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        let policy = RedirectPolicy::default();
        Self {
            min_password_length: 6,
            public_paths: policy.public_paths,
            home_path: policy.home_path,
            login_path: policy.login_path,
        }
    }
}

impl AuthSettings {
    pub fn redirect_policy(&self) -> RedirectPolicy {
        RedirectPolicy {
            public_paths: self.public_paths.clone(),
            login_path: self.login_path.clone(),
            home_path: self.home_path.clone(),
        }
    }
}

/// Default values for the per-identity settings keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingDefaults {
    pub theme: Theme,
    pub units: Units,
    pub weight_unit: String,
    pub distance_unit: String,
}

impl Default for SettingDefaults {
    fn default() -> Self {
        let units = Units::default();
        Self {
            theme: Theme::default(),
            units,
            weight_unit: units.weight_unit().to_string(),
            distance_unit: units.distance_unit().to_string(),
        }
    }
}

impl SettingDefaults {
    /// Settings keys and their default values.
    pub fn entries(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("theme".to_string(), self.theme.as_str().to_string()),
            ("units".to_string(), self.units.as_str().to_string()),
            ("weightUnit".to_string(), self.weight_unit.clone()),
            ("distanceUnit".to_string(), self.distance_unit.clone()),
        ])
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "avance", "Avance")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from file.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = get_config_path();

    if !path.exists() {
        let config = AppConfig {
            data_dir: get_data_dir(),
            ..Default::default()
        };
        return Ok(config);
    }

    let content =
        std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config = parse_config(&content)?;
    config.data_dir = get_data_dir();

    Ok(config)
}

/// Parse configuration text. Missing fields take their defaults.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_setting_entries() {
        let entries = SettingDefaults::default().entries();
        assert_eq!(entries["theme"], "dark");
        assert_eq!(entries["units"], "metric");
        assert_eq!(entries["weightUnit"], "kg");
        assert_eq!(entries["distanceUnit"], "km");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = parse_config(
            r#"
            log_level = "debug"

            [auth]
            min_password_length = 10

            [defaults]
            theme = "light"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.auth.min_password_length, 10);
        assert_eq!(config.auth.login_path, "/login");
        assert_eq!(config.defaults.theme, Theme::Light);
        assert_eq!(config.defaults.weight_unit, "kg");
        assert_eq!(config.database_file, "avance.db");
    }

    #[test]
    fn test_config_roundtrips_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back = parse_config(&text).unwrap();
        assert_eq!(back.defaults, config.defaults);
        assert_eq!(back.auth.public_paths, config.auth.public_paths);
    }

    #[test]
    fn test_unit_labels() {
        assert_eq!(Units::Imperial.weight_unit(), "lbs");
        assert_eq!(Units::Imperial.distance_unit(), "mi");
    }
}

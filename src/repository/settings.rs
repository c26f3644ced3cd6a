//! Per-identity key/value settings.

use super::RepositoryError;
use crate::storage::{Database, SettingDefaults};
use std::collections::BTreeMap;

pub struct SettingsRepository<'a> {
    db: &'a Database,
    owner: &'a str,
}

impl<'a> SettingsRepository<'a> {
    pub fn new(db: &'a Database, owner: &'a str) -> Self {
        Self { db, owner }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        Ok(self.db.get_setting(self.owner, key)?)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        Ok(self.db.set_setting(self.owner, key, value)?)
    }

    pub fn all(&self) -> Result<BTreeMap<String, String>, RepositoryError> {
        Ok(self.db.all_settings(self.owner)?)
    }

    /// Write the defaults for keys that have no value yet. Existing values
    /// are never overwritten. Returns the keys that were seeded.
    pub fn seed_defaults(&self, defaults: &SettingDefaults) -> Result<Vec<String>, RepositoryError> {
        let existing = self.all()?;
        let mut seeded = Vec::new();

        for (key, value) in defaults.entries() {
            if !existing.contains_key(&key) {
                self.set(&key, &value)?;
                seeded.push(key);
            }
        }

        if !seeded.is_empty() {
            tracing::info!("Seeded default settings: {}", seeded.join(", "));
        }
        Ok(seeded)
    }
}

//! Routine templates.

use super::{fetch, fetch_all, insert, remove, replace, RepositoryError};
use crate::models::Routine;
use crate::storage::Database;
use crate::store::OrderSpec;

pub struct RoutineRepository<'a> {
    db: &'a Database,
    owner: &'a str,
}

impl<'a> RoutineRepository<'a> {
    pub fn new(db: &'a Database, owner: &'a str) -> Self {
        Self { db, owner }
    }

    pub fn create(&self, routine: &mut Routine) -> Result<String, RepositoryError> {
        routine.validate()?;
        insert(self.db, self.owner, routine)
    }

    pub fn get(&self, id: &str) -> Result<Option<Routine>, RepositoryError> {
        fetch(self.db, self.owner, id)
    }

    /// All routines by name.
    pub fn list(&self) -> Result<Vec<Routine>, RepositoryError> {
        fetch_all(self.db, self.owner, Some(&OrderSpec::asc("name")))
    }

    pub fn update(&self, routine: &Routine) -> Result<(), RepositoryError> {
        routine.validate()?;
        replace(self.db, self.owner, routine)
    }

    pub fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        remove::<Routine>(self.db, self.owner, id)
    }
}

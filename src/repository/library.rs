//! Exercise library: the built-in catalog merged with custom exercises.

use super::catalog::{self, CATALOG};
use super::{fetch, fetch_all, insert, remove, replace, RepositoryError};
use crate::models::{CustomExercise, ExerciseCategory, LibraryExercise, ValidationErrors};
use crate::storage::Database;

pub struct ExerciseLibrary<'a> {
    db: &'a Database,
    owner: &'a str,
}

impl<'a> ExerciseLibrary<'a> {
    pub fn new(db: &'a Database, owner: &'a str) -> Self {
        Self { db, owner }
    }

    /// Built-in entries followed by the owner's custom ones.
    pub fn all(&self) -> Result<Vec<LibraryExercise>, RepositoryError> {
        let custom: Vec<CustomExercise> = fetch_all(self.db, self.owner, None)?;
        Ok(CATALOG
            .iter()
            .map(catalog::CatalogEntry::to_library)
            .chain(custom.into_iter().map(LibraryExercise::from))
            .collect())
    }

    pub fn get(&self, id: &str) -> Result<Option<LibraryExercise>, RepositoryError> {
        if let Some(entry) = catalog::find(id) {
            return Ok(Some(entry.to_library()));
        }
        Ok(fetch::<CustomExercise>(self.db, self.owner, id)?.map(LibraryExercise::from))
    }

    pub fn by_category(
        &self,
        category: ExerciseCategory,
    ) -> Result<Vec<LibraryExercise>, RepositoryError> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|e| e.category == category)
            .collect())
    }

    /// Case-insensitive search over name, description and muscles.
    pub fn search(&self, query: &str) -> Result<Vec<LibraryExercise>, RepositoryError> {
        Ok(self.all()?.into_iter().filter(|e| e.matches(query)).collect())
    }

    pub fn add_custom(&self, exercise: &mut CustomExercise) -> Result<String, RepositoryError> {
        if exercise.name.trim().is_empty() {
            let mut errors = ValidationErrors::default();
            errors.push("Exercise name is required");
            return Err(errors.into());
        }
        insert(self.db, self.owner, exercise)
    }

    pub fn update_custom(&self, exercise: &CustomExercise) -> Result<(), RepositoryError> {
        if catalog::find(&exercise.id).is_some() {
            return Err(RepositoryError::ReadOnly(exercise.id.clone()));
        }
        replace(self.db, self.owner, exercise)
    }

    /// Delete a custom exercise. Built-in entries are read-only.
    pub fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        if catalog::find(id).is_some() {
            return Err(RepositoryError::ReadOnly(id.to_string()));
        }
        remove::<CustomExercise>(self.db, self.owner, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_entries_follow_catalog() {
        let db = Database::open_in_memory().unwrap();
        let library = ExerciseLibrary::new(&db, "u1");

        let mut custom = CustomExercise::new("Sled Push", ExerciseCategory::Functional)
            .with_muscles(&["Quadriceps"], &["Calves"]);
        let id = library.add_custom(&mut custom).unwrap();

        let all = library.all().unwrap();
        assert_eq!(all.len(), CATALOG.len() + 1);
        let last = all.last().unwrap();
        assert_eq!(last.id, id);
        assert!(last.is_custom);

        assert!(library.get(&id).unwrap().unwrap().is_custom);
        assert!(!library.get("builtin-plank").unwrap().unwrap().is_custom);
    }

    #[test]
    fn test_search_matches_muscles() {
        let db = Database::open_in_memory().unwrap();
        let library = ExerciseLibrary::new(&db, "u1");

        let hits = library.search("HAMSTRING").unwrap();
        assert!(hits.iter().any(|e| e.name == "Romanian Deadlift"));
        assert!(hits.iter().all(|e| e.matches("hamstring")));
    }

    #[test]
    fn test_by_category() {
        let db = Database::open_in_memory().unwrap();
        let library = ExerciseLibrary::new(&db, "u1");
        let cardio = library.by_category(ExerciseCategory::Cardio).unwrap();
        assert!(!cardio.is_empty());
        assert!(cardio.iter().all(|e| e.category == ExerciseCategory::Cardio));
    }

    #[test]
    fn test_builtins_are_read_only() {
        let db = Database::open_in_memory().unwrap();
        let library = ExerciseLibrary::new(&db, "u1");

        assert!(matches!(
            library.delete("builtin-push-up"),
            Err(RepositoryError::ReadOnly(_))
        ));

        let mut disguised = CustomExercise::new("Push-up", ExerciseCategory::Chest);
        disguised.id = "builtin-push-up".to_string();
        assert!(matches!(
            library.update_custom(&disguised),
            Err(RepositoryError::ReadOnly(_))
        ));
    }

    #[test]
    fn test_delete_custom() {
        let db = Database::open_in_memory().unwrap();
        let library = ExerciseLibrary::new(&db, "u1");

        let mut custom = CustomExercise::new("Farmer Carry", ExerciseCategory::Functional);
        let id = library.add_custom(&mut custom).unwrap();
        library.delete(&id).unwrap();
        assert!(library.get(&id).unwrap().is_none());
        assert!(matches!(library.delete(&id), Err(RepositoryError::NotFound(_))));
    }
}

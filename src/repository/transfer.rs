//! Export and import of everything an identity owns.

use super::{fetch_all, RepositoryError};
use crate::models::{
    BodyMetric, CustomExercise, Exercise, PersonalRecord, Photo, Record, Routine, Workout,
};
use crate::storage::Database;
use crate::store::{Collection, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Exported data. Missing sections import as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportBundle {
    pub workouts: Vec<Workout>,
    pub exercises: Vec<Exercise>,
    pub routines: Vec<Routine>,
    pub body_metrics: Vec<BodyMetric>,
    pub photos: Vec<Photo>,
    pub personal_records: Vec<PersonalRecord>,
    pub custom_exercises: Vec<CustomExercise>,
    pub settings: BTreeMap<String, String>,
    pub export_date: Option<DateTime<Utc>>,
}

impl ExportBundle {
    pub fn document_count(&self) -> usize {
        self.workouts.len()
            + self.exercises.len()
            + self.routines.len()
            + self.body_metrics.len()
            + self.photos.len()
            + self.personal_records.len()
            + self.custom_exercises.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub documents: usize,
    pub settings: usize,
}

pub struct DataTransfer<'a> {
    db: &'a Database,
    owner: &'a str,
}

impl<'a> DataTransfer<'a> {
    pub fn new(db: &'a Database, owner: &'a str) -> Self {
        Self { db, owner }
    }

    pub fn export_bundle(&self) -> Result<ExportBundle, RepositoryError> {
        Ok(ExportBundle {
            workouts: fetch_all(self.db, self.owner, None)?,
            exercises: fetch_all(self.db, self.owner, None)?,
            routines: fetch_all(self.db, self.owner, None)?,
            body_metrics: fetch_all(self.db, self.owner, None)?,
            photos: fetch_all(self.db, self.owner, None)?,
            personal_records: fetch_all(self.db, self.owner, None)?,
            custom_exercises: fetch_all(self.db, self.owner, None)?,
            settings: self.db.all_settings(self.owner)?,
            export_date: Some(Utc::now()),
        })
    }

    /// Pretty-printed JSON export.
    pub fn export_json(&self) -> Result<String, RepositoryError> {
        let bundle = self.export_bundle()?;
        tracing::info!("Exporting {} documents", bundle.document_count());
        Ok(serde_json::to_string_pretty(&bundle)?)
    }

    /// Replace all of the owner's data with the contents of `json`.
    ///
    /// The text is parsed before anything is cleared, so malformed input
    /// leaves the existing data untouched. Ids are preserved so exercises
    /// keep pointing at their workouts.
    pub fn import_json(&self, json: &str) -> Result<ImportSummary, RepositoryError> {
        let bundle: ExportBundle = serde_json::from_str(json)?;
        self.import_bundle(&bundle)
    }

    /// Replace all of the owner's data with `bundle` in one transaction.
    pub fn import_bundle(&self, bundle: &ExportBundle) -> Result<ImportSummary, RepositoryError> {
        let mut documents = Vec::with_capacity(bundle.document_count());
        collect(&mut documents, &bundle.workouts)?;
        collect(&mut documents, &bundle.exercises)?;
        collect(&mut documents, &bundle.routines)?;
        collect(&mut documents, &bundle.body_metrics)?;
        collect(&mut documents, &bundle.photos)?;
        collect(&mut documents, &bundle.personal_records)?;
        collect(&mut documents, &bundle.custom_exercises)?;

        self.db
            .replace_owner_data(self.owner, &documents, &bundle.settings)?;

        let summary = ImportSummary {
            documents: documents.len(),
            settings: bundle.settings.len(),
        };
        tracing::info!(
            "Imported {} documents and {} settings",
            summary.documents,
            summary.settings
        );
        Ok(summary)
    }
}

fn collect<T: Record>(
    documents: &mut Vec<(Collection, Document)>,
    records: &[T],
) -> Result<(), RepositoryError> {
    for record in records {
        documents.push((T::COLLECTION, Document::from_record(record)?));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StrengthSet;
    use crate::repository::{SettingsRepository, WorkoutRepository};
    use crate::storage::SettingDefaults;
    use crate::store::CollectionSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_export_then_import_into_other_identity() {
        let db = Database::open_in_memory().unwrap();
        let saved = WorkoutRepository::new(&db, "u1")
            .save_with_exercises(
                Workout::new("Strength"),
                vec![Exercise::strength("", "Squat", vec![StrengthSet::new(5, 100.0)])],
            )
            .unwrap();
        SettingsRepository::new(&db, "u1")
            .seed_defaults(&SettingDefaults::default())
            .unwrap();

        let json = DataTransfer::new(&db, "u1").export_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("exportDate").is_some());
        assert!(value.get("personalRecords").is_some());

        let summary = DataTransfer::new(&db, "u2").import_json(&json).unwrap();
        assert_eq!(summary.documents, 4);
        assert_eq!(summary.settings, 4);

        let repo = WorkoutRepository::new(&db, "u2");
        let exercises = repo.exercises_for(&saved.workout.id).unwrap();
        assert_eq!(exercises, saved.exercises);
    }

    #[test]
    fn test_import_replaces_existing_data() {
        let db = Database::open_in_memory().unwrap();
        let repo = WorkoutRepository::new(&db, "u1");
        repo.create(&mut Workout::new("Old")).unwrap();

        DataTransfer::new(&db, "u1").import_json(r#"{"workouts": []}"#).unwrap();
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_import_keeps_data() {
        let db = Database::open_in_memory().unwrap();
        let repo = WorkoutRepository::new(&db, "u1");
        repo.create(&mut Workout::new("Keep")).unwrap();

        let result = DataTransfer::new(&db, "u1").import_json("{not json");
        assert!(matches!(result, Err(RepositoryError::Serialization(_))));
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn test_import_refreshes_live_queries_once() {
        let db = Database::open_in_memory().unwrap();
        let bundle = ExportBundle {
            workouts: (0..50).map(|_| Workout::new("Cardio")).collect(),
            routines: vec![Routine::new("Push", Vec::new())],
            ..Default::default()
        };

        let workout_calls = Arc::new(AtomicUsize::new(0));
        let calls = Arc::clone(&workout_calls);
        let mut sub = db.subscribe(
            "u1",
            Collection::Workouts,
            None,
            Arc::new(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let summary = DataTransfer::new(&db, "u1").import_bundle(&bundle).unwrap();
        sub.unsubscribe();

        assert_eq!(summary.documents, 51);
        // Initial snapshot plus one refresh after the commit.
        assert_eq!(workout_calls.load(Ordering::SeqCst), 2);
        assert_eq!(WorkoutRepository::new(&db, "u1").list().unwrap().len(), 50);
    }
}

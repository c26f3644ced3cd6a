//! In-memory mirror of the tracked collections.

use super::collections::Collection;
use super::source::{Snapshot, SnapshotMetadata, SourceError};
use crate::models::{BodyMetric, CustomExercise, PersonalRecord, Photo, Routine, Workout};
use std::collections::BTreeMap;

/// Last-known contents of every tracked collection.
#[derive(Debug, Clone, PartialEq)]
pub struct DataState {
    /// Newest date first
    pub workouts: Vec<Workout>,
    /// Name ascending
    pub routines: Vec<Routine>,
    /// Newest date first
    pub body_metrics: Vec<BodyMetric>,
    /// Snapshot order
    pub personal_records: Vec<PersonalRecord>,
    /// Newest date first
    pub photos: Vec<Photo>,
    /// Snapshot order
    pub custom_exercises: Vec<CustomExercise>,
    /// Identity settings (key -> value)
    pub settings: BTreeMap<String, String>,
    /// Metadata of the latest snapshot per collection
    pub metadata: BTreeMap<Collection, SnapshotMetadata>,
    pub loading: bool,
    pub initialized: bool,
}

impl Default for DataState {
    fn default() -> Self {
        Self {
            workouts: Vec::new(),
            routines: Vec::new(),
            body_metrics: Vec::new(),
            personal_records: Vec::new(),
            photos: Vec::new(),
            custom_exercises: Vec::new(),
            settings: BTreeMap::new(),
            metadata: BTreeMap::new(),
            loading: true,
            initialized: false,
        }
    }
}

impl DataState {
    /// Replace one collection wholesale with a decoded snapshot.
    ///
    /// On a decode failure the previous contents are kept.
    pub fn apply(&mut self, collection: Collection, snapshot: &Snapshot) -> Result<(), SourceError> {
        let malformed = |e: serde_json::Error| SourceError::Malformed {
            collection,
            message: e.to_string(),
        };

        match collection {
            Collection::Workouts => {
                let mut workouts: Vec<Workout> = snapshot.decode_all().map_err(malformed)?;
                workouts.sort_by(|a, b| b.date.cmp(&a.date));
                self.workouts = workouts;
            }
            Collection::Routines => {
                let mut routines: Vec<Routine> = snapshot.decode_all().map_err(malformed)?;
                routines.sort_by(|a, b| a.name.cmp(&b.name));
                self.routines = routines;
            }
            Collection::BodyMetrics => {
                let mut metrics: Vec<BodyMetric> = snapshot.decode_all().map_err(malformed)?;
                metrics.sort_by(|a, b| b.date.cmp(&a.date));
                self.body_metrics = metrics;
            }
            Collection::PersonalRecords => {
                self.personal_records = snapshot.decode_all().map_err(malformed)?;
            }
            Collection::Photos => {
                let mut photos: Vec<Photo> = snapshot.decode_all().map_err(malformed)?;
                photos.sort_by(|a, b| b.date.cmp(&a.date));
                self.photos = photos;
            }
            Collection::CustomExercises => {
                self.custom_exercises = snapshot.decode_all().map_err(malformed)?;
            }
            Collection::Exercises => {
                return Err(SourceError::ListenerFailed {
                    collection,
                    message: "collection is not mirrored".to_string(),
                })
            }
        }

        self.metadata.insert(collection, snapshot.metadata);
        Ok(())
    }

    /// Number of records held for a tracked collection.
    pub fn count(&self, collection: Collection) -> usize {
        match collection {
            Collection::Workouts => self.workouts.len(),
            Collection::Routines => self.routines.len(),
            Collection::BodyMetrics => self.body_metrics.len(),
            Collection::PersonalRecords => self.personal_records.len(),
            Collection::Photos => self.photos.len(),
            Collection::CustomExercises => self.custom_exercises.len(),
            Collection::Exercises => 0,
        }
    }

    /// Whether every collection and the settings are empty.
    pub fn is_empty(&self) -> bool {
        Collection::TRACKED.iter().all(|c| self.count(*c) == 0) && self.settings.is_empty()
    }
}

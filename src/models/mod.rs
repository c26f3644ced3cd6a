//! Fitness log records.
//!
//! Every record is a plain serde struct stored as one document in an
//! owner-scoped collection. Field names use camelCase on the wire so exported
//! data matches what the document store holds.

pub mod body;
pub mod library;
pub mod records;
pub mod routine;
pub mod workout;

pub use body::{BodyMetric, Measurements, Photo};
pub use library::{CustomExercise, Difficulty, ExerciseCategory, LibraryExercise, MusclesWorked};
pub use records::{PersonalRecord, RecordType};
pub use routine::{ExerciseTemplate, Routine, TemplateTarget};
pub use workout::{CardioStats, Exercise, ExerciseDetail, ExerciseKind, StrengthSet, Workout};

use crate::store::collections::Collection;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A record type that lives in one document collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection the record is stored in.
    const COLLECTION: Collection;

    /// Document id (empty until stored).
    fn id(&self) -> &str;

    /// Assign the document id after insertion.
    fn set_id(&mut self, id: String);
}

macro_rules! impl_record {
    ($ty:ty, $collection:expr) => {
        impl Record for $ty {
            const COLLECTION: Collection = $collection;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}

impl_record!(Workout, Collection::Workouts);
impl_record!(Exercise, Collection::Exercises);
impl_record!(Routine, Collection::Routines);
impl_record!(BodyMetric, Collection::BodyMetrics);
impl_record!(Photo, Collection::Photos);
impl_record!(PersonalRecord, Collection::PersonalRecords);
impl_record!(CustomExercise, Collection::CustomExercises);

/// Form validation failures, one message per problem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<String>,
}

impl ValidationErrors {
    pub fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.errors.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

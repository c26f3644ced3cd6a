//! Owner-scoped write path over the document database.
//!
//! Each repository borrows the database and the identity it acts for, the
//! way a manager borrows a connection. Writes land in the database, which
//! pushes fresh snapshots to the data store's live queries.

pub mod body;
pub mod catalog;
pub mod library;
pub mod records;
pub mod routines;
pub mod settings;
pub mod transfer;
pub mod workouts;

pub use body::{BodyMetricRepository, PhotoRepository};
pub use library::ExerciseLibrary;
pub use records::{PersonalRecordRepository, PrCandidate, PrOutcome};
pub use routines::RoutineRepository;
pub use settings::SettingsRepository;
pub use transfer::{DataTransfer, ExportBundle, ImportSummary};
pub use workouts::{SavedWorkout, WorkoutRepository};

use crate::models::{Record, ValidationErrors};
use crate::storage::{Database, DatabaseError};
use crate::store::{Document, OrderSpec};
use thiserror::Error;

/// Errors from the repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Built-in exercise {0} cannot be modified")]
    ReadOnly(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Store `record` as a new document and assign its id.
pub(crate) fn insert<T: Record>(
    db: &Database,
    owner: &str,
    record: &mut T,
) -> Result<String, RepositoryError> {
    let doc = Document::from_record(record)?;
    let id = db.add_document(owner, T::COLLECTION, &doc)?;
    record.set_id(id.clone());
    Ok(id)
}

pub(crate) fn fetch<T: Record>(
    db: &Database,
    owner: &str,
    id: &str,
) -> Result<Option<T>, RepositoryError> {
    db.get_document(owner, T::COLLECTION, id)?
        .map(|doc| doc.decode::<T>())
        .transpose()
        .map_err(RepositoryError::from)
}

pub(crate) fn fetch_all<T: Record>(
    db: &Database,
    owner: &str,
    order: Option<&OrderSpec>,
) -> Result<Vec<T>, RepositoryError> {
    decode_all(db.list_documents(owner, T::COLLECTION, order)?)
}

pub(crate) fn fetch_where<T: Record>(
    db: &Database,
    owner: &str,
    field: &str,
    value: &str,
) -> Result<Vec<T>, RepositoryError> {
    decode_all(db.find_by_field(owner, T::COLLECTION, field, value)?)
}

/// Replace a stored record. Fails with `NotFound` when it does not exist.
pub(crate) fn replace<T: Record>(db: &Database, owner: &str, record: &T) -> Result<(), RepositoryError> {
    let doc = Document::from_record(record)?;
    db.update_document(owner, T::COLLECTION, &doc)
        .map_err(|e| match e {
            DatabaseError::NotFound(what) => RepositoryError::NotFound(what),
            other => RepositoryError::Database(other),
        })
}

pub(crate) fn remove<T: Record>(db: &Database, owner: &str, id: &str) -> Result<(), RepositoryError> {
    if db.delete_document(owner, T::COLLECTION, id)? {
        Ok(())
    } else {
        Err(RepositoryError::NotFound(format!("{} {}", T::COLLECTION, id)))
    }
}

fn decode_all<T: Record>(docs: Vec<Document>) -> Result<Vec<T>, RepositoryError> {
    docs.iter()
        .map(|doc| doc.decode::<T>().map_err(RepositoryError::from))
        .collect()
}

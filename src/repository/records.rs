//! Personal records: append-only history per (exercise name, record type).
//!
//! A new entry is written only when a value beats every earlier entry for
//! the same key, so each key's history is strictly increasing and the
//! current record is its maximum.

use super::{fetch_all, fetch_where, insert, remove, RepositoryError};
use crate::models::{Exercise, ExerciseDetail, PersonalRecord, RecordType};
use crate::storage::Database;
use chrono::NaiveDate;

/// Result of checking one observed value.
#[derive(Debug, Clone, PartialEq)]
pub struct PrOutcome {
    pub is_new_pr: bool,
    /// Gain over the previous best; the value itself for a first record
    pub improvement: Option<f64>,
    /// The entry written, when one was
    pub record: Option<PersonalRecord>,
}

impl PrOutcome {
    fn unchanged() -> Self {
        Self {
            is_new_pr: false,
            improvement: None,
            record: None,
        }
    }
}

/// A value worth checking against the record history.
#[derive(Debug, Clone, PartialEq)]
pub struct PrCandidate {
    pub exercise_name: String,
    pub record_type: RecordType,
    pub value: f64,
}

/// Values of a saved workout that may be records: heaviest weight and most
/// reps for each strength exercise, distance and speed for each cardio one.
/// Zero values are skipped.
pub fn detect_candidates(exercises: &[Exercise]) -> Vec<PrCandidate> {
    let mut candidates = Vec::new();
    let mut push = |name: &str, record_type, value: f64| {
        if value > 0.0 {
            candidates.push(PrCandidate {
                exercise_name: name.to_string(),
                record_type,
                value,
            });
        }
    };

    for exercise in exercises {
        match &exercise.detail {
            ExerciseDetail::Strength { sets } if !sets.is_empty() => {
                push(&exercise.name, RecordType::Weight, exercise.max_weight());
                push(&exercise.name, RecordType::Reps, f64::from(exercise.max_reps()));
            }
            ExerciseDetail::Strength { .. } => {}
            ExerciseDetail::Cardio(stats) => {
                push(&exercise.name, RecordType::Distance, stats.distance);
                push(&exercise.name, RecordType::Speed, stats.speed);
            }
        }
    }

    candidates
}

pub struct PersonalRecordRepository<'a> {
    db: &'a Database,
    owner: &'a str,
}

impl<'a> PersonalRecordRepository<'a> {
    pub fn new(db: &'a Database, owner: &'a str) -> Self {
        Self { db, owner }
    }

    /// Append an entry unconditionally.
    pub fn add(&self, record: &mut PersonalRecord) -> Result<String, RepositoryError> {
        insert(self.db, self.owner, record)
    }

    pub fn list(&self) -> Result<Vec<PersonalRecord>, RepositoryError> {
        fetch_all(self.db, self.owner, None)
    }

    /// Every entry for `exercise_name`, all record types.
    pub fn by_exercise(&self, exercise_name: &str) -> Result<Vec<PersonalRecord>, RepositoryError> {
        fetch_where(self.db, self.owner, "exerciseName", exercise_name)
    }

    pub fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        remove::<PersonalRecord>(self.db, self.owner, id)
    }

    /// Highest value recorded for the key, if any.
    pub fn current_best(
        &self,
        exercise_name: &str,
        record_type: RecordType,
    ) -> Result<Option<f64>, RepositoryError> {
        let best = self
            .by_exercise(exercise_name)?
            .into_iter()
            .filter(|pr| pr.record_type == record_type)
            .map(|pr| pr.value)
            .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))));
        Ok(best)
    }

    /// Record `value` if it is the first for the key or beats the best so far.
    pub fn check_and_record(
        &self,
        exercise_name: &str,
        record_type: RecordType,
        value: f64,
        date: NaiveDate,
    ) -> Result<PrOutcome, RepositoryError> {
        let improvement = match self.current_best(exercise_name, record_type)? {
            None => value,
            Some(best) if value > best => value - best,
            Some(_) => return Ok(PrOutcome::unchanged()),
        };

        let mut record = PersonalRecord::new(exercise_name, record_type, value).on(date);
        self.add(&mut record)?;
        tracing::info!(
            "New {} record for {}: {} (+{})",
            record_type,
            exercise_name,
            value,
            improvement
        );

        Ok(PrOutcome {
            is_new_pr: true,
            improvement: Some(improvement),
            record: Some(record),
        })
    }

    /// Check every candidate of a saved workout; returns the new records.
    pub fn check_workout(
        &self,
        exercises: &[Exercise],
        date: NaiveDate,
    ) -> Result<Vec<PersonalRecord>, RepositoryError> {
        let mut new_records = Vec::new();
        for candidate in detect_candidates(exercises) {
            let outcome = self.check_and_record(
                &candidate.exercise_name,
                candidate.record_type,
                candidate.value,
                date,
            )?;
            new_records.extend(outcome.record);
        }
        Ok(new_records)
    }
}

//! Workouts and their exercises.

use super::records::PersonalRecordRepository;
use super::routines::RoutineRepository;
use super::{fetch, fetch_all, fetch_where, insert, remove, replace, RepositoryError};
use crate::models::{Exercise, PersonalRecord, Workout};
use crate::storage::Database;
use crate::store::{Collection, OrderSpec};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// A workout together with the exercises written for it.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedWorkout {
    pub workout: Workout,
    pub exercises: Vec<Exercise>,
    /// Personal records set by this workout
    pub new_records: Vec<PersonalRecord>,
}

/// Workout operations for one identity.
pub struct WorkoutRepository<'a> {
    db: &'a Database,
    owner: &'a str,
}

impl<'a> WorkoutRepository<'a> {
    pub fn new(db: &'a Database, owner: &'a str) -> Self {
        Self { db, owner }
    }

    /// Store a new workout. Returns its id.
    pub fn create(&self, workout: &mut Workout) -> Result<String, RepositoryError> {
        workout.validate()?;
        insert(self.db, self.owner, workout)
    }

    pub fn get(&self, id: &str) -> Result<Option<Workout>, RepositoryError> {
        fetch(self.db, self.owner, id)
    }

    /// All workouts, newest first (date, then time of day).
    pub fn list(&self) -> Result<Vec<Workout>, RepositoryError> {
        let mut workouts: Vec<Workout> =
            fetch_all(self.db, self.owner, Some(&OrderSpec::desc("date")))?;
        workouts.sort_by(|a, b| (b.date, b.time).cmp(&(a.date, a.time)));
        Ok(workouts)
    }

    /// Workouts dated within `start..=end`, newest first.
    pub fn by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Workout>, RepositoryError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|w| w.date >= start && w.date <= end)
            .collect())
    }

    pub fn by_type(&self, workout_type: &str) -> Result<Vec<Workout>, RepositoryError> {
        fetch_where(self.db, self.owner, "type", workout_type)
    }

    pub fn update(&self, workout: &Workout) -> Result<(), RepositoryError> {
        workout.validate()?;
        replace(self.db, self.owner, workout)
    }

    /// Delete a workout and every exercise that belongs to it, in one
    /// transaction. Returns the number of exercises removed.
    pub fn delete(&self, id: &str) -> Result<usize, RepositoryError> {
        if self.get(id)?.is_none() {
            return Err(RepositoryError::NotFound(format!("workout {}", id)));
        }

        let mut targets: Vec<(Collection, String)> = self
            .exercises_for(id)?
            .into_iter()
            .map(|exercise| (Collection::Exercises, exercise.id))
            .collect();
        let exercise_count = targets.len();
        targets.push((Collection::Workouts, id.to_string()));

        self.db.delete_batch(self.owner, &targets)?;
        tracing::info!("Deleted workout {} with {} exercises", id, exercise_count);
        Ok(exercise_count)
    }

    // ========== Exercises ==========

    /// Store an exercise under an existing workout.
    pub fn add_exercise(&self, exercise: &mut Exercise) -> Result<String, RepositoryError> {
        exercise.validate()?;
        if self.get(&exercise.workout_id)?.is_none() {
            return Err(RepositoryError::NotFound(format!(
                "workout {}",
                exercise.workout_id
            )));
        }
        insert(self.db, self.owner, exercise)
    }

    /// Exercises of one workout, in the order they were added.
    pub fn exercises_for(&self, workout_id: &str) -> Result<Vec<Exercise>, RepositoryError> {
        fetch_where(self.db, self.owner, "workoutId", workout_id)
    }

    pub fn update_exercise(&self, exercise: &Exercise) -> Result<(), RepositoryError> {
        exercise.validate()?;
        replace(self.db, self.owner, exercise)
    }

    pub fn delete_exercise(&self, id: &str) -> Result<(), RepositoryError> {
        remove::<Exercise>(self.db, self.owner, id)
    }

    /// Every distinct exercise name ever logged, sorted.
    pub fn exercise_names(&self) -> Result<Vec<String>, RepositoryError> {
        let exercises: Vec<Exercise> = fetch_all(self.db, self.owner, None)?;
        let names: BTreeSet<String> = exercises.into_iter().map(|e| e.name).collect();
        Ok(names.into_iter().collect())
    }

    /// Every exercise of every workout.
    pub fn all_exercises(&self) -> Result<Vec<Exercise>, RepositoryError> {
        fetch_all(self.db, self.owner, None)
    }

    // ========== Composite writes ==========

    /// Save a workout with its exercises, then check them for new personal
    /// records. Everything is validated before anything is written.
    pub fn save_with_exercises(
        &self,
        mut workout: Workout,
        mut exercises: Vec<Exercise>,
    ) -> Result<SavedWorkout, RepositoryError> {
        workout.validate()?;
        for exercise in &exercises {
            exercise.validate()?;
        }

        let workout_id = insert(self.db, self.owner, &mut workout)?;
        for exercise in &mut exercises {
            exercise.workout_id = workout_id.clone();
            insert(self.db, self.owner, exercise)?;
        }

        let new_records =
            PersonalRecordRepository::new(self.db, self.owner).check_workout(&exercises, workout.date)?;

        tracing::info!(
            "Saved workout {} with {} exercises ({} new records)",
            workout_id,
            exercises.len(),
            new_records.len()
        );

        Ok(SavedWorkout {
            workout,
            exercises,
            new_records,
        })
    }

    /// Create a workout from a routine: one exercise per template, dated now.
    pub fn start_from_routine(&self, routine_id: &str) -> Result<SavedWorkout, RepositoryError> {
        let routine = RoutineRepository::new(self.db, self.owner)
            .get(routine_id)?
            .ok_or_else(|| RepositoryError::NotFound(format!("routine {}", routine_id)))?;

        let mut workout = Workout::new(format!("Routine: {}", routine.name))
            .with_duration(0)
            .with_notes(format!("Started from routine: {}", routine.name));
        let workout_id = insert(self.db, self.owner, &mut workout)?;

        let mut exercises = Vec::with_capacity(routine.exercises.len());
        for template in &routine.exercises {
            let mut exercise = template.materialize(&workout_id);
            insert(self.db, self.owner, &mut exercise)?;
            exercises.push(exercise);
        }

        tracing::info!("Started workout {} from routine {}", workout_id, routine.name);
        Ok(SavedWorkout {
            workout,
            exercises,
            new_records: Vec::new(),
        })
    }
}

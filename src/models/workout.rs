//! Workout and exercise records.

use super::ValidationErrors;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// A logged training session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    /// Document id
    #[serde(default)]
    pub id: String,
    /// Day the session took place
    pub date: NaiveDate,
    /// Start time of day
    pub time: NaiveTime,
    /// Free-form session type ("Strength", "Cardio", "HIIT", ...)
    #[serde(rename = "type")]
    pub workout_type: String,
    /// Duration in minutes
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Workout {
    /// New workout dated now (local date, minute precision).
    pub fn new(workout_type: impl Into<String>) -> Self {
        let now = Local::now();
        Self {
            id: String::new(),
            date: now.date_naive(),
            time: now
                .time()
                .with_second(0)
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or_else(|| now.time()),
            workout_type: workout_type.into(),
            duration: 0,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn at(mut self, time: NaiveTime) -> Self {
        self.time = time;
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration = minutes;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Check the fields a log form must provide.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.workout_type.trim().is_empty() {
            errors.push("Workout type is required");
        }
        errors.into_result()
    }
}

/// Strength or cardio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    Strength,
    Cardio,
}

impl std::fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExerciseKind::Strength => write!(f, "strength"),
            ExerciseKind::Cardio => write!(f, "cardio"),
        }
    }
}

/// One strength set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StrengthSet {
    #[serde(default)]
    pub reps: u32,
    /// Load in the user's weight unit
    #[serde(default)]
    pub weight: f64,
}

impl StrengthSet {
    pub fn new(reps: u32, weight: f64) -> Self {
        Self { reps, weight }
    }

    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }
}

/// Cardio measurements.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CardioStats {
    /// Minutes
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub incline: f64,
    #[serde(default)]
    pub distance: f64,
}

/// Kind-specific exercise payload, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExerciseDetail {
    Strength {
        #[serde(default)]
        sets: Vec<StrengthSet>,
    },
    Cardio(CardioStats),
}

impl ExerciseDetail {
    pub fn kind(&self) -> ExerciseKind {
        match self {
            ExerciseDetail::Strength { .. } => ExerciseKind::Strength,
            ExerciseDetail::Cardio(_) => ExerciseKind::Cardio,
        }
    }
}

/// An exercise performed within a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    #[serde(default)]
    pub id: String,
    /// Owning workout
    pub workout_id: String,
    pub name: String,
    #[serde(flatten)]
    pub detail: ExerciseDetail,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    pub fn strength(workout_id: impl Into<String>, name: impl Into<String>, sets: Vec<StrengthSet>) -> Self {
        Self::with_detail(workout_id, name, ExerciseDetail::Strength { sets })
    }

    pub fn cardio(workout_id: impl Into<String>, name: impl Into<String>, stats: CardioStats) -> Self {
        Self::with_detail(workout_id, name, ExerciseDetail::Cardio(stats))
    }

    pub fn with_detail(
        workout_id: impl Into<String>,
        name: impl Into<String>,
        detail: ExerciseDetail,
    ) -> Self {
        Self {
            id: String::new(),
            workout_id: workout_id.into(),
            name: name.into(),
            detail,
            created_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> ExerciseKind {
        self.detail.kind()
    }

    /// Strength sets, empty for cardio.
    pub fn sets(&self) -> &[StrengthSet] {
        match &self.detail {
            ExerciseDetail::Strength { sets } => sets,
            ExerciseDetail::Cardio(_) => &[],
        }
    }

    pub fn cardio_stats(&self) -> Option<&CardioStats> {
        match &self.detail {
            ExerciseDetail::Cardio(stats) => Some(stats),
            ExerciseDetail::Strength { .. } => None,
        }
    }

    /// Sum of weight x reps over all sets.
    pub fn volume(&self) -> f64 {
        self.sets().iter().map(StrengthSet::volume).sum()
    }

    pub fn max_weight(&self) -> f64 {
        self.sets().iter().map(|s| s.weight).fold(0.0, f64::max)
    }

    pub fn max_reps(&self) -> u32 {
        self.sets().iter().map(|s| s.reps).max().unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.name.trim().is_empty() {
            errors.push("Exercise name is required");
        }
        if let ExerciseDetail::Strength { sets } = &self.detail {
            if sets.is_empty() {
                errors.push("Add at least one set");
            }
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exercise_wire_shape() {
        let exercise = Exercise::strength("w1", "Bench Press", vec![StrengthSet::new(8, 60.0)]);
        let value = serde_json::to_value(&exercise).unwrap();

        assert_eq!(value["type"], "strength");
        assert_eq!(value["workoutId"], "w1");
        assert_eq!(value["sets"][0]["reps"], 8);
    }

    #[test]
    fn test_cardio_exercise_from_document() {
        let exercise: Exercise = serde_json::from_value(json!({
            "id": "e1",
            "workoutId": "w1",
            "name": "Treadmill",
            "type": "cardio",
            "duration": 30.0,
            "speed": 9.5,
            "distance": 4.7,
            "createdAt": "2024-01-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(exercise.kind(), ExerciseKind::Cardio);
        let stats = exercise.cardio_stats().unwrap();
        assert_eq!(stats.incline, 0.0);
        assert_eq!(stats.distance, 4.7);
    }

    #[test]
    fn test_strength_maxima_and_volume() {
        let exercise = Exercise::strength(
            "w1",
            "Squat",
            vec![StrengthSet::new(5, 100.0), StrengthSet::new(8, 80.0)],
        );
        assert_eq!(exercise.max_weight(), 100.0);
        assert_eq!(exercise.max_reps(), 8);
        assert_eq!(exercise.volume(), 1140.0);
    }

    #[test]
    fn test_validation() {
        assert!(Workout::new("  ").validate().is_err());
        assert!(Workout::new("Strength").validate().is_ok());

        let empty = Exercise::strength("w1", "", vec![]);
        let errors = empty.validate().unwrap_err();
        assert_eq!(errors.errors.len(), 2);
    }

    #[test]
    fn test_workout_time_accepts_minutes_only() {
        let workout: Workout = serde_json::from_value(json!({
            "date": "2024-01-03",
            "time": "18:30",
            "type": "HIIT",
            "createdAt": "2024-01-03T18:31:00Z"
        }))
        .unwrap();
        assert_eq!(workout.time, NaiveTime::from_hms_opt(18, 30, 0).unwrap());
        assert_eq!(workout.duration, 0);
    }
}

//! Personal record history.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Metric a personal record is tracked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// Heaviest set load
    Weight,
    /// Most reps in a set
    Reps,
    /// Longest cardio distance
    Distance,
    /// Longest cardio duration
    Time,
    /// Fastest cardio speed
    Speed,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Weight => "weight",
            RecordType::Reps => "reps",
            RecordType::Distance => "distance",
            RecordType::Time => "time",
            RecordType::Speed => "speed",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the append-only PR history.
///
/// The current record for an (exercise, type) pair is the maximum `value`
/// over every entry sharing that key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecord {
    #[serde(default)]
    pub id: String,
    pub exercise_name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub value: f64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl PersonalRecord {
    pub fn new(exercise_name: impl Into<String>, record_type: RecordType, value: f64) -> Self {
        Self {
            id: String::new(),
            exercise_name: exercise_name.into(),
            record_type,
            value,
            date: Local::now().date_naive(),
            created_at: Utc::now(),
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }
}

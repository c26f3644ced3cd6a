//! Reusable routine templates.

use super::workout::{CardioStats, Exercise, ExerciseDetail, ExerciseKind, StrengthSet};
use super::ValidationErrors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Target prescribed by a routine entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TemplateTarget {
    Strength {
        #[serde(default)]
        sets: u32,
        #[serde(default)]
        reps: u32,
        #[serde(default)]
        weight: f64,
    },
    Cardio(CardioStats),
}

/// One exercise in a routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseTemplate {
    pub name: String,
    #[serde(flatten)]
    pub target: TemplateTarget,
}

impl ExerciseTemplate {
    pub fn strength(name: impl Into<String>, sets: u32, reps: u32, weight: f64) -> Self {
        Self {
            name: name.into(),
            target: TemplateTarget::Strength { sets, reps, weight },
        }
    }

    pub fn cardio(name: impl Into<String>, stats: CardioStats) -> Self {
        Self {
            name: name.into(),
            target: TemplateTarget::Cardio(stats),
        }
    }

    pub fn kind(&self) -> ExerciseKind {
        match self.target {
            TemplateTarget::Strength { .. } => ExerciseKind::Strength,
            TemplateTarget::Cardio(_) => ExerciseKind::Cardio,
        }
    }

    /// Build the exercise this entry prescribes for `workout_id`.
    ///
    /// A strength target of N sets becomes N identical sets.
    pub fn materialize(&self, workout_id: &str) -> Exercise {
        let detail = match &self.target {
            TemplateTarget::Strength { sets, reps, weight } => ExerciseDetail::Strength {
                sets: (0..*sets).map(|_| StrengthSet::new(*reps, *weight)).collect(),
            },
            TemplateTarget::Cardio(stats) => ExerciseDetail::Cardio(*stats),
        };
        Exercise::with_detail(workout_id, self.name.clone(), detail)
    }
}

/// A named, ordered list of exercise templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exercises: Vec<ExerciseTemplate>,
    pub created_at: DateTime<Utc>,
}

impl Routine {
    pub fn new(name: impl Into<String>, exercises: Vec<ExerciseTemplate>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description: String::new(),
            exercises,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.name.trim().is_empty() {
            errors.push("Routine name is required");
        }
        if self.exercises.is_empty() {
            errors.push("Add at least one exercise");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_materialize_strength_template() {
        let template = ExerciseTemplate::strength("Deadlift", 3, 5, 120.0);
        let exercise = template.materialize("w9");

        assert_eq!(exercise.workout_id, "w9");
        assert_eq!(exercise.sets().len(), 3);
        assert!(exercise.sets().iter().all(|s| s.reps == 5 && s.weight == 120.0));
    }

    #[test]
    fn test_routine_round_trips_through_json() {
        let routine = Routine::new(
            "Push day",
            vec![
                ExerciseTemplate::strength("Bench Press", 4, 8, 70.0),
                ExerciseTemplate::cardio(
                    "Bike",
                    CardioStats {
                        duration: 10.0,
                        ..Default::default()
                    },
                ),
            ],
        );
        let json = serde_json::to_string(&routine).unwrap();
        let back: Routine = serde_json::from_str(&json).unwrap();
        assert_eq!(back, routine);
        assert_eq!(back.exercises[1].kind(), ExerciseKind::Cardio);
    }

    #[test]
    fn test_routine_requires_exercises() {
        let errors = Routine::new("Empty", vec![]).validate().unwrap_err();
        assert_eq!(errors.errors, vec!["Add at least one exercise".to_string()]);
    }
}

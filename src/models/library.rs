//! Exercise library: a static catalog plus user-authored entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Muscle group an exercise belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseCategory {
    Chest,
    Back,
    Legs,
    Shoulders,
    Arms,
    Core,
    Cardio,
    Functional,
}

impl ExerciseCategory {
    pub const ALL: [ExerciseCategory; 8] = [
        ExerciseCategory::Chest,
        ExerciseCategory::Back,
        ExerciseCategory::Legs,
        ExerciseCategory::Shoulders,
        ExerciseCategory::Arms,
        ExerciseCategory::Core,
        ExerciseCategory::Cardio,
        ExerciseCategory::Functional,
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            ExerciseCategory::Chest => "Chest",
            ExerciseCategory::Back => "Back",
            ExerciseCategory::Legs => "Legs",
            ExerciseCategory::Shoulders => "Shoulders",
            ExerciseCategory::Arms => "Arms",
            ExerciseCategory::Core => "Core",
            ExerciseCategory::Cardio => "Cardio",
            ExerciseCategory::Functional => "Functional",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MusclesWorked {
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
}

/// A user-authored library entry, stored per identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomExercise {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub category: ExerciseCategory,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub muscles_worked: MusclesWorked,
    pub created_at: DateTime<Utc>,
}

impl CustomExercise {
    pub fn new(name: impl Into<String>, category: ExerciseCategory) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            category,
            difficulty: Difficulty::default(),
            equipment: Vec::new(),
            description: String::new(),
            instructions: Vec::new(),
            muscles_worked: MusclesWorked::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_muscles(mut self, primary: &[&str], secondary: &[&str]) -> Self {
        self.muscles_worked = MusclesWorked {
            primary: primary.iter().map(|m| m.to_string()).collect(),
            secondary: secondary.iter().map(|m| m.to_string()).collect(),
        };
        self
    }
}

/// A library entry as seen by readers: built-in or custom.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryExercise {
    pub id: String,
    pub name: String,
    pub category: ExerciseCategory,
    pub difficulty: Difficulty,
    pub equipment: Vec<String>,
    pub description: String,
    pub instructions: Vec<String>,
    pub muscles_worked: MusclesWorked,
    /// Only custom entries may be edited or deleted
    pub is_custom: bool,
}

impl LibraryExercise {
    /// Case-insensitive match on name, description or any muscle.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        let hit = |s: &str| s.to_lowercase().contains(&query);

        hit(&self.name)
            || hit(&self.description)
            || self.muscles_worked.primary.iter().any(|m| hit(m))
            || self.muscles_worked.secondary.iter().any(|m| hit(m))
    }
}

impl From<CustomExercise> for LibraryExercise {
    fn from(custom: CustomExercise) -> Self {
        Self {
            id: custom.id,
            name: custom.name,
            category: custom.category,
            difficulty: custom.difficulty,
            equipment: custom.equipment,
            description: custom.description,
            instructions: custom.instructions,
            muscles_worked: custom.muscles_worked,
            is_custom: true,
        }
    }
}

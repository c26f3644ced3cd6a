//! Built-in exercise catalog.

use crate::models::{Difficulty, ExerciseCategory, LibraryExercise, MusclesWorked};

/// A read-only catalog entry.
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub category: ExerciseCategory,
    pub difficulty: Difficulty,
    pub equipment: &'static [&'static str],
    pub description: &'static str,
    pub instructions: &'static [&'static str],
    pub primary: &'static [&'static str],
    pub secondary: &'static [&'static str],
}

impl CatalogEntry {
    pub fn to_library(&self) -> LibraryExercise {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        LibraryExercise {
            id: self.id.to_string(),
            name: self.name.to_string(),
            category: self.category,
            difficulty: self.difficulty,
            equipment: owned(self.equipment),
            description: self.description.to_string(),
            instructions: owned(self.instructions),
            muscles_worked: MusclesWorked {
                primary: owned(self.primary),
                secondary: owned(self.secondary),
            },
            is_custom: false,
        }
    }
}

use Difficulty::{Advanced, Beginner, Intermediate};
use ExerciseCategory::{Arms, Back, Cardio, Chest, Core, Functional, Legs, Shoulders};

pub const CATALOG: &[CatalogEntry] = &[
    // Chest
    CatalogEntry {
        id: "builtin-flat-bench-press",
        name: "Flat Bench Press",
        category: Chest,
        difficulty: Intermediate,
        equipment: &["barbell", "bench"],
        description: "Foundational chest press performed lying on a flat bench.",
        instructions: &[
            "Lie on the bench with feet planted",
            "Grip the bar slightly wider than shoulder width",
            "Lower the bar under control to the chest",
            "Press up until the arms are fully extended",
        ],
        primary: &["Pectoralis major"],
        secondary: &["Triceps", "Anterior deltoid"],
    },
    CatalogEntry {
        id: "builtin-incline-bench-press",
        name: "Incline Bench Press",
        category: Chest,
        difficulty: Intermediate,
        equipment: &["barbell", "incline bench"],
        description: "Bench press variant that emphasizes the upper chest.",
        instructions: &["Set the bench to 30-45 degrees", "Lower to the upper chest", "Press up"],
        primary: &["Upper pectoralis"],
        secondary: &["Anterior deltoid", "Triceps"],
    },
    CatalogEntry {
        id: "builtin-push-up",
        name: "Push-up",
        category: Chest,
        difficulty: Beginner,
        equipment: &[],
        description: "Bodyweight press for chest, shoulders and triceps.",
        instructions: &["Start in a plank, hands under shoulders", "Lower until the chest nearly touches the floor", "Push back up"],
        primary: &["Pectoralis"],
        secondary: &["Triceps", "Deltoids", "Core"],
    },
    CatalogEntry {
        id: "builtin-dumbbell-fly",
        name: "Dumbbell Fly",
        category: Chest,
        difficulty: Intermediate,
        equipment: &["dumbbells", "bench"],
        description: "Isolation movement that stretches and works the chest.",
        instructions: &["Lie on the bench with dumbbells overhead", "Open the arms in an arc", "Bring the weights back together"],
        primary: &["Pectoralis"],
        secondary: &["Anterior deltoid"],
    },
    CatalogEntry {
        id: "builtin-parallel-bar-dip",
        name: "Parallel Bar Dip",
        category: Chest,
        difficulty: Intermediate,
        equipment: &["parallel bars"],
        description: "Compound bodyweight movement for chest and triceps.",
        instructions: &["Support yourself on the bars", "Lean the torso forward", "Lower by bending the elbows", "Press back up"],
        primary: &["Lower pectoralis", "Triceps"],
        secondary: &["Deltoids"],
    },
    // Back
    CatalogEntry {
        id: "builtin-pull-up",
        name: "Pull-up",
        category: Back,
        difficulty: Advanced,
        equipment: &["pull-up bar"],
        description: "Lifts the full bodyweight; the benchmark back exercise.",
        instructions: &["Hang with an overhand grip", "Pull until the chin clears the bar", "Lower under control"],
        primary: &["Latissimus dorsi"],
        secondary: &["Biceps", "Rhomboids"],
    },
    CatalogEntry {
        id: "builtin-barbell-row",
        name: "Barbell Row",
        category: Back,
        difficulty: Intermediate,
        equipment: &["barbell"],
        description: "Bent-over row for back thickness.",
        instructions: &["Hinge at the hips with a flat back", "Row the bar to the lower chest", "Lower under control"],
        primary: &["Latissimus dorsi", "Rhomboids"],
        secondary: &["Biceps", "Rear deltoid"],
    },
    CatalogEntry {
        id: "builtin-deadlift",
        name: "Deadlift",
        category: Back,
        difficulty: Advanced,
        equipment: &["barbell"],
        description: "Full posterior chain lift from the floor.",
        instructions: &["Stand with the bar over mid-foot", "Brace and drive through the floor", "Lock out hips and knees together"],
        primary: &["Erector spinae", "Glutes", "Hamstrings"],
        secondary: &["Trapezius", "Forearms"],
    },
    CatalogEntry {
        id: "builtin-lat-pulldown",
        name: "Lat Pulldown",
        category: Back,
        difficulty: Beginner,
        equipment: &["cable machine"],
        description: "Vertical pull on a cable station.",
        instructions: &["Grip the bar wide", "Pull to the upper chest", "Return slowly"],
        primary: &["Latissimus dorsi"],
        secondary: &["Biceps"],
    },
    CatalogEntry {
        id: "builtin-dumbbell-row",
        name: "Dumbbell Row",
        category: Back,
        difficulty: Beginner,
        equipment: &["dumbbell", "bench"],
        description: "Single-arm row supported on a bench.",
        instructions: &["Brace one hand and knee on the bench", "Row the dumbbell to the hip", "Lower under control"],
        primary: &["Latissimus dorsi"],
        secondary: &["Rhomboids", "Biceps"],
    },
    // Legs
    CatalogEntry {
        id: "builtin-back-squat",
        name: "Back Squat",
        category: Legs,
        difficulty: Intermediate,
        equipment: &["barbell", "rack"],
        description: "Barbell squat with the bar on the upper back.",
        instructions: &["Set the bar on the upper back", "Sit down until thighs are parallel", "Drive back up"],
        primary: &["Quadriceps", "Glutes"],
        secondary: &["Hamstrings", "Core"],
    },
    CatalogEntry {
        id: "builtin-leg-press",
        name: "Leg Press",
        category: Legs,
        difficulty: Beginner,
        equipment: &["leg press machine"],
        description: "Machine press for the whole leg.",
        instructions: &["Place feet shoulder width on the platform", "Lower until knees reach 90 degrees", "Press back up"],
        primary: &["Quadriceps"],
        secondary: &["Glutes", "Hamstrings"],
    },
    CatalogEntry {
        id: "builtin-lunge",
        name: "Lunge",
        category: Legs,
        difficulty: Beginner,
        equipment: &[],
        description: "Unilateral leg exercise for strength and balance.",
        instructions: &["Step forward", "Lower the back knee toward the floor", "Push back to standing"],
        primary: &["Quadriceps", "Glutes"],
        secondary: &["Hamstrings"],
    },
    CatalogEntry {
        id: "builtin-romanian-deadlift",
        name: "Romanian Deadlift",
        category: Legs,
        difficulty: Intermediate,
        equipment: &["barbell"],
        description: "Hip hinge that targets the hamstrings.",
        instructions: &["Hold the bar at the hips", "Push the hips back with soft knees", "Return to standing"],
        primary: &["Hamstrings"],
        secondary: &["Glutes", "Erector spinae"],
    },
    CatalogEntry {
        id: "builtin-leg-curl",
        name: "Leg Curl",
        category: Legs,
        difficulty: Beginner,
        equipment: &["leg curl machine"],
        description: "Machine isolation for the hamstrings.",
        instructions: &["Set the pad above the heels", "Curl the weight up", "Lower slowly"],
        primary: &["Hamstrings"],
        secondary: &["Calves"],
    },
    // Shoulders
    CatalogEntry {
        id: "builtin-overhead-press",
        name: "Overhead Press",
        category: Shoulders,
        difficulty: Intermediate,
        equipment: &["barbell"],
        description: "Standing barbell press overhead.",
        instructions: &["Start with the bar at the collarbones", "Press overhead", "Lower under control"],
        primary: &["Deltoids"],
        secondary: &["Triceps", "Upper trapezius"],
    },
    CatalogEntry {
        id: "builtin-lateral-raise",
        name: "Lateral Raise",
        category: Shoulders,
        difficulty: Beginner,
        equipment: &["dumbbells"],
        description: "Isolation for the side deltoids.",
        instructions: &["Raise the dumbbells out to the sides", "Stop at shoulder height", "Lower slowly"],
        primary: &["Lateral deltoid"],
        secondary: &["Trapezius"],
    },
    CatalogEntry {
        id: "builtin-front-raise",
        name: "Front Raise",
        category: Shoulders,
        difficulty: Beginner,
        equipment: &["dumbbells"],
        description: "Isolation for the front deltoids.",
        instructions: &["Raise the dumbbells in front", "Stop at shoulder height", "Lower slowly"],
        primary: &["Anterior deltoid"],
        secondary: &["Upper pectoralis"],
    },
    CatalogEntry {
        id: "builtin-face-pull",
        name: "Face Pull",
        category: Shoulders,
        difficulty: Beginner,
        equipment: &["cable machine", "rope"],
        description: "Cable pull toward the face for the rear deltoids.",
        instructions: &["Set the rope at face height", "Pull toward the face, elbows high", "Return slowly"],
        primary: &["Rear deltoid"],
        secondary: &["Rhomboids", "Trapezius"],
    },
    // Arms
    CatalogEntry {
        id: "builtin-barbell-curl",
        name: "Barbell Curl",
        category: Arms,
        difficulty: Beginner,
        equipment: &["barbell"],
        description: "Standing curl for the biceps.",
        instructions: &["Hold the bar with an underhand grip", "Curl without swinging", "Lower slowly"],
        primary: &["Biceps"],
        secondary: &["Forearms"],
    },
    CatalogEntry {
        id: "builtin-dumbbell-curl",
        name: "Dumbbell Curl",
        category: Arms,
        difficulty: Beginner,
        equipment: &["dumbbells"],
        description: "Alternating or simultaneous dumbbell curl.",
        instructions: &["Curl the dumbbells, rotating the palms up", "Lower slowly"],
        primary: &["Biceps"],
        secondary: &["Brachialis"],
    },
    CatalogEntry {
        id: "builtin-triceps-pushdown",
        name: "Triceps Pushdown",
        category: Arms,
        difficulty: Beginner,
        equipment: &["cable machine"],
        description: "Cable extension for the triceps.",
        instructions: &["Keep the elbows at the sides", "Push the handle down to full extension", "Return slowly"],
        primary: &["Triceps"],
        secondary: &[],
    },
    CatalogEntry {
        id: "builtin-skull-crusher",
        name: "Skull Crusher",
        category: Arms,
        difficulty: Intermediate,
        equipment: &["EZ bar", "bench"],
        description: "Lying triceps extension.",
        instructions: &["Lie on the bench with the bar overhead", "Bend the elbows to lower the bar toward the forehead", "Extend back up"],
        primary: &["Triceps"],
        secondary: &[],
    },
    // Core
    CatalogEntry {
        id: "builtin-plank",
        name: "Plank",
        category: Core,
        difficulty: Beginner,
        equipment: &[],
        description: "Isometric hold for the whole core.",
        instructions: &["Support yourself on forearms and toes", "Keep a straight line from head to heels", "Hold"],
        primary: &["Rectus abdominis", "Transverse abdominis"],
        secondary: &["Shoulders", "Glutes"],
    },
    CatalogEntry {
        id: "builtin-crunch",
        name: "Crunch",
        category: Core,
        difficulty: Beginner,
        equipment: &[],
        description: "Classic abdominal flexion.",
        instructions: &["Lie with knees bent", "Curl the shoulders off the floor", "Lower slowly"],
        primary: &["Rectus abdominis"],
        secondary: &[],
    },
    CatalogEntry {
        id: "builtin-russian-twist",
        name: "Russian Twist",
        category: Core,
        difficulty: Intermediate,
        equipment: &[],
        description: "Seated rotation for the obliques.",
        instructions: &["Sit leaning back with feet raised", "Rotate the torso side to side"],
        primary: &["Obliques"],
        secondary: &["Rectus abdominis"],
    },
    CatalogEntry {
        id: "builtin-leg-raise",
        name: "Leg Raise",
        category: Core,
        difficulty: Intermediate,
        equipment: &[],
        description: "Lying or hanging raise for the lower abdominals.",
        instructions: &["Keep the legs straight", "Raise them to vertical", "Lower without touching the floor"],
        primary: &["Lower abdominals"],
        secondary: &["Hip flexors"],
    },
    // Cardio
    CatalogEntry {
        id: "builtin-running",
        name: "Running",
        category: Cardio,
        difficulty: Beginner,
        equipment: &[],
        description: "Outdoor or treadmill running.",
        instructions: &["Warm up", "Hold a steady pace", "Cool down"],
        primary: &["Quadriceps", "Calves"],
        secondary: &["Hamstrings", "Glutes"],
    },
    CatalogEntry {
        id: "builtin-cycling",
        name: "Cycling",
        category: Cardio,
        difficulty: Beginner,
        equipment: &["bike"],
        description: "Road or stationary cycling.",
        instructions: &["Set the saddle height", "Hold a steady cadence"],
        primary: &["Quadriceps"],
        secondary: &["Calves", "Glutes"],
    },
    CatalogEntry {
        id: "builtin-rowing-machine",
        name: "Rowing Machine",
        category: Cardio,
        difficulty: Intermediate,
        equipment: &["rowing machine"],
        description: "Full-body conditioning on an ergometer.",
        instructions: &["Drive with the legs", "Lean back slightly", "Finish with the arms"],
        primary: &["Back", "Legs"],
        secondary: &["Arms", "Core"],
    },
    // Functional
    CatalogEntry {
        id: "builtin-burpee",
        name: "Burpee",
        category: Functional,
        difficulty: Intermediate,
        equipment: &[],
        description: "Squat, plank, push-up and jump in one movement.",
        instructions: &["Squat and place the hands down", "Jump the feet back", "Return and jump up"],
        primary: &["Full body"],
        secondary: &[],
    },
    CatalogEntry {
        id: "builtin-box-jump",
        name: "Box Jump",
        category: Functional,
        difficulty: Intermediate,
        equipment: &["plyo box"],
        description: "Explosive jump onto a box.",
        instructions: &["Stand in front of the box", "Swing the arms and jump", "Land softly and step down"],
        primary: &["Quadriceps", "Glutes"],
        secondary: &["Calves"],
    },
    CatalogEntry {
        id: "builtin-kettlebell-swing",
        name: "Kettlebell Swing",
        category: Functional,
        difficulty: Intermediate,
        equipment: &["kettlebell"],
        description: "Ballistic hip hinge.",
        instructions: &["Hike the kettlebell back", "Snap the hips forward", "Let it float to chest height"],
        primary: &["Glutes", "Hamstrings"],
        secondary: &["Core", "Shoulders"],
    },
];

/// Catalog entry by id.
pub fn find(id: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.id == id)
}

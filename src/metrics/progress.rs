//! Progress statistics over workouts, exercises and body metrics.
//!
//! Everything here is a pure function of its inputs. Functions that look
//! back from the current day take `today` explicitly.

use crate::models::{BodyMetric, Exercise, ExerciseKind, StrengthSet, Workout};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One strength exercise occurrence, dated by its workout.
#[derive(Debug, Clone, PartialEq)]
pub struct ExercisePerformance {
    pub date: NaiveDate,
    pub max_weight: f64,
    pub total_volume: f64,
    pub sets: Vec<StrengthSet>,
}

/// Direction of a change between two measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Body weight change between the oldest and newest entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightChange {
    /// Absolute change, one decimal
    pub change: f64,
    /// Absolute change relative to the oldest weight, one decimal
    pub percentage: f64,
    pub direction: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

/// Workouts logged on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: usize,
}

impl TrendPoint {
    /// Short `day/month` label.
    pub fn label(&self) -> String {
        format!("{}/{}", self.date.day(), self.date.month())
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Total weight x reps over all strength sets.
pub fn total_volume(exercises: &[Exercise]) -> f64 {
    exercises.iter().map(Exercise::volume).sum()
}

/// Workouts dated within the last `days` days (inclusive of the cutoff).
pub fn workout_frequency(workouts: &[Workout], days: i64, today: NaiveDate) -> usize {
    let cutoff = today - Duration::days(days);
    workouts.iter().filter(|w| w.date >= cutoff).count()
}

/// Consecutive training days ending today, or yesterday when nothing has
/// been logged today yet.
pub fn current_streak(workouts: &[Workout], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = workouts.iter().map(|w| w.date).collect();

    let mut day = if days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while days.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

/// Number of workouts per type.
pub fn distribution_by_type(workouts: &[Workout]) -> BTreeMap<String, usize> {
    let mut distribution = BTreeMap::new();
    for workout in workouts {
        *distribution.entry(workout.workout_type.clone()).or_insert(0) += 1;
    }
    distribution
}

/// Mean duration in whole minutes; 0 without workouts.
pub fn average_duration(workouts: &[Workout]) -> u32 {
    if workouts.is_empty() {
        return 0;
    }
    let total: u64 = workouts.iter().map(|w| u64::from(w.duration)).sum();
    (total as f64 / workouts.len() as f64).round() as u32
}

/// History of one strength exercise, oldest first.
///
/// Exercises whose workout is unknown are dated `today`.
pub fn exercise_performance(
    exercise_name: &str,
    exercises: &[Exercise],
    workouts: &[Workout],
    today: NaiveDate,
) -> Vec<ExercisePerformance> {
    let dates: HashMap<&str, NaiveDate> = workouts.iter().map(|w| (w.id.as_str(), w.date)).collect();

    let mut history: Vec<ExercisePerformance> = exercises
        .iter()
        .filter(|e| e.name == exercise_name && e.kind() == ExerciseKind::Strength)
        .map(|e| ExercisePerformance {
            date: dates.get(e.workout_id.as_str()).copied().unwrap_or(today),
            max_weight: e.max_weight(),
            total_volume: e.volume(),
            sets: e.sets().to_vec(),
        })
        .collect();

    history.sort_by_key(|p| p.date);
    history
}

/// Estimated one-rep max (Epley), rounded to a whole number.
pub fn one_rep_max(weight: f64, reps: u32) -> f64 {
    if reps == 1 {
        return weight;
    }
    (weight * (1.0 + f64::from(reps) / 30.0)).round()
}

/// Body mass index from kilograms and centimeters, one decimal.
/// Returns 0 when either input is missing.
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return 0.0;
    }
    let meters = height_cm / 100.0;
    round1(weight_kg / (meters * meters))
}

pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Change between the oldest and newest entries of `metrics`, which must be
/// ordered newest first.
pub fn weight_change(metrics: &[BodyMetric]) -> WeightChange {
    let (latest, oldest) = match (metrics.first(), metrics.last()) {
        (Some(latest), Some(oldest)) if metrics.len() >= 2 => (latest.weight, oldest.weight),
        _ => {
            return WeightChange {
                change: 0.0,
                percentage: 0.0,
                direction: Trend::Flat,
            }
        }
    };

    let change = latest - oldest;
    let percentage = if oldest > 0.0 { change / oldest * 100.0 } else { 0.0 };
    let direction = if change > 0.0 {
        Trend::Up
    } else if change < 0.0 {
        Trend::Down
    } else {
        Trend::Flat
    };

    WeightChange {
        change: round1(change.abs()),
        percentage: round1(percentage.abs()),
        direction,
    }
}

/// Strength exercises with the most accumulated volume, highest first.
pub fn top_exercises_by_volume(exercises: &[Exercise], limit: usize) -> Vec<(String, f64)> {
    let mut volumes: BTreeMap<&str, f64> = BTreeMap::new();
    for exercise in exercises.iter().filter(|e| e.kind() == ExerciseKind::Strength) {
        *volumes.entry(exercise.name.as_str()).or_insert(0.0) += exercise.volume();
    }

    let mut ranked: Vec<(String, f64)> = volumes
        .into_iter()
        .map(|(name, volume)| (name.to_string(), volume))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

/// Sorted names of every strength exercise logged.
pub fn unique_strength_exercise_names(exercises: &[Exercise]) -> Vec<String> {
    let names: BTreeSet<&str> = exercises
        .iter()
        .filter(|e| e.kind() == ExerciseKind::Strength && !e.name.is_empty())
        .map(|e| e.name.as_str())
        .collect();
    names.into_iter().map(str::to_string).collect()
}

/// Workouts per day for the `days` days ending today, oldest first.
pub fn workout_trend(workouts: &[Workout], days: u32, today: NaiveDate) -> Vec<TrendPoint> {
    (0..i64::from(days))
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            TrendPoint {
                date,
                count: workouts.iter().filter(|w| w.date == date).count(),
            }
        })
        .collect()
}

//! Metrics module for progress calculations.

pub mod progress;

pub use progress::{
    BmiCategory, ExercisePerformance, Trend, TrendPoint, WeightChange, bmi_category,
    calculate_bmi, current_streak, one_rep_max,
};

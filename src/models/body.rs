//! Body measurements and progress photos.

use crate::metrics::progress::calculate_bmi;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Circumference measurements in the user's length unit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurements {
    #[serde(default)]
    pub chest: f64,
    #[serde(default)]
    pub waist: f64,
    #[serde(default)]
    pub arms: f64,
    #[serde(default)]
    pub legs: f64,
}

/// A dated body-composition entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyMetric {
    #[serde(default)]
    pub id: String,
    pub date: NaiveDate,
    /// Body weight in kilograms
    #[serde(default)]
    pub weight: f64,
    /// Derived from weight and height, 0 when height is unknown
    #[serde(default)]
    pub bmi: f64,
    /// Body fat percentage
    #[serde(default)]
    pub body_fat: f64,
    #[serde(default)]
    pub measurements: Measurements,
    pub created_at: DateTime<Utc>,
}

impl BodyMetric {
    /// New entry for today.
    pub fn new(weight: f64) -> Self {
        Self {
            id: String::new(),
            date: Local::now().date_naive(),
            weight,
            bmi: 0.0,
            body_fat: 0.0,
            measurements: Measurements::default(),
            created_at: Utc::now(),
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Derive BMI from a height in centimeters.
    pub fn with_height(mut self, height_cm: f64) -> Self {
        self.bmi = calculate_bmi(self.weight, height_cm);
        self
    }

    pub fn with_body_fat(mut self, body_fat: f64) -> Self {
        self.body_fat = body_fat;
        self
    }

    pub fn with_measurements(mut self, measurements: Measurements) -> Self {
        self.measurements = measurements;
        self
    }
}

/// A progress photo. The image itself lives in external storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    #[serde(default)]
    pub id: String,
    pub date: NaiveDate,
    /// Where the stored image can be fetched from
    pub image_url: String,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Photo {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            date: Local::now().date_naive(),
            image_url: image_url.into(),
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}
